//! Enumeration types used throughout the simulation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::PlayerId;

/// Round state as seen by the core. The outer match state machine drives the
/// transitions through `BeginRound` / `EndRound`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Carts may be created in the holding area; nothing is live.
    #[default]
    Intermission,
    /// Containment removed, carts being released and drivers seated.
    Starting,
    /// Round in progress.
    InProgress,
    /// Round over; all carts torn down.
    Ended,
}

impl RoundPhase {
    /// Whether anti-stall defeats may fire. `Starting` is not live: the
    /// engine is still seating drivers.
    pub fn is_live(self) -> bool {
        self == RoundPhase::InProgress
    }
}

/// Why a player was knocked out of the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DefeatCause {
    NeverEnteredCart,
    AbandonedCart,
    RammedBy { attacker: PlayerId },
}

impl fmt::Display for DefeatCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefeatCause::NeverEnteredCart => f.write_str("never entered cart"),
            DefeatCause::AbandonedCart => f.write_str("abandoned cart"),
            DefeatCause::RammedBy { attacker } => write!(f, "rammed by {attacker}"),
        }
    }
}

/// Anti-stall detector state, one per cart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StallState {
    /// Waiting for the driver to take the seat, or for the initial deadline.
    #[default]
    ArmedInitial,
    /// Initial deadline passed before the round went live with the seat
    /// empty; re-checked when it does.
    AwaitingRound,
    /// Driver seen in the seat; waiting for them to leave it.
    WatchingForExit,
    /// Seat vacated; grace timer running.
    ExitGrace,
    /// Detector finished, either by defeat or by the terminal short-circuit.
    Resolved,
}

/// Perk sub-models that can be welded onto a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Accessory {
    Booster,
    Bumper,
}

/// Driver-facing visual cues replicated to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisualCue {
    /// Flash shown just before the cart is released at round start.
    RoundRelease,
}
