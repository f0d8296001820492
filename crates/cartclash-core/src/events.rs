//! Events emitted by the simulation for replication and UI feedback.
//!
//! Delivery downstream is best-effort; the core never waits on an ack.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::enums::{DefeatCause, VisualCue};
use crate::types::{CartId, PlayerId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    /// Cart built and handed to its driver.
    CartSpawned {
        cart: CartId,
        player: PlayerId,
        spawn_slot: usize,
    },
    /// Cart record removed; parts are disposed after a delay.
    CartDestroyed { cart: CartId, player: Option<PlayerId> },
    /// Bumper finished arming and the ram probe is live.
    BumperArmed { cart: CartId },
    /// Bumper removed (worn out, replaced or detached on request).
    BumperDetached { cart: CartId },
    /// Booster ran dry and was released.
    BoosterDepleted { cart: CartId },
    /// Hit feedback for the victim's client.
    Hit {
        victim: PlayerId,
        attacker: PlayerId,
        attacker_velocity: Vec3,
        /// Victim-local hit direction, scaled by the per-axis weights.
        direction: Vec3,
        bonus_damage: f64,
    },
    /// Damage applied to the victim's avatar.
    Damaged {
        victim: PlayerId,
        attacker: PlayerId,
        amount: f64,
        health: f64,
    },
    /// Player knocked out of the round.
    Defeated { player: PlayerId, cause: DefeatCause },
    /// Driver-facing cue.
    VisualCue { player: PlayerId, cue: VisualCue },
    /// Players taking part in the round that is starting.
    RoundRoster { players: Vec<PlayerId> },
    /// Settle period over; round is live.
    RoundStarted,
    RoundEnded,
}
