//! Per-cart state blocks.
//!
//! Plain data; the sim crate's systems own every mutation.

use serde::{Deserialize, Serialize};

use crate::types::{FrameHandle, PartId, PlayerId, TimerId};

/// Booster perk: a consumable speed-boost resource. No combat behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoosterState {
    pub fuel_remaining: f64,
    pub strength: f64,
    /// Welded booster model parts.
    pub parts: Vec<PartId>,
}

/// Bumper arming state. The frame handle only exists once armed, so
/// "active" and "callback registered" cannot disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BumperPhase {
    /// Attached, waiting out the arming delay.
    Arming,
    /// Combat check registered with the frame scheduler.
    Active(FrameHandle),
}

/// Bumper perk: enables the ram probe and grants bonus damage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BumperState {
    pub uses_remaining: u32,
    pub damage_per_hit: f64,
    pub phase: BumperPhase,
    /// Tick the bumper was attached; guards stale arming timers.
    pub attached_tick: u64,
    /// Welded bumper model parts.
    pub parts: Vec<PartId>,
}

impl BumperState {
    pub fn is_active(&self) -> bool {
        matches!(self.phase, BumperPhase::Active(_))
    }

    pub fn frame_handle(&self) -> Option<FrameHandle> {
        match self.phase {
            BumperPhase::Active(handle) => Some(handle),
            BumperPhase::Arming => None,
        }
    }
}

/// Hit bookkeeping on the victim side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatState {
    /// Post-hit stun: nobody can score on this cart while set.
    pub lost_control: bool,
    /// Last attacker, held for the tag immunity window.
    pub tagged_by: Option<PlayerId>,
    /// Timer that will clear `tagged_by`.
    pub tag_expiry: Option<TimerId>,
}
