//! Fundamental identity, geometric and simulation types.

use std::fmt;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// A connected player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

/// A cart entity. Allocated by the engine, never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CartId(pub u64);

/// A physical part owned by the host world (hull, seat, accessory piece).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartId(pub u64);

/// Subscription handle for a per-frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FrameHandle(pub u64);

/// Handle of a pending deferred timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {}", self.0)
    }
}

impl fmt::Display for CartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cart {}", self.0)
    }
}

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "part {}", self.0)
    }
}

/// Local forward axis of every cart model (y is up).
pub const CART_FORWARD: Vec3 = Vec3::NEG_Z;

/// Rigid pose in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Pose at `position` facing the fixed cart forward axis.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// World-space forward direction.
    pub fn forward(&self) -> Vec3 {
        self.rotation * CART_FORWARD
    }

    /// Compose a local offset onto this pose (rotation is inherited).
    pub fn offset(&self, local: Vec3) -> Self {
        Self {
            position: self.position + self.rotation * local,
            rotation: self.rotation,
        }
    }

    /// Express a world-space direction in this pose's local frame.
    pub fn to_local_direction(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * world
    }
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Seconds per tick at the fixed tick rate.
    pub fn dt(&self) -> f64 {
        crate::constants::DT
    }

    /// Advance by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.elapsed_secs = self.tick as f64 * self.dt();
    }
}

/// Convert a duration in seconds to whole ticks at the fixed tick rate.
pub fn secs_to_ticks(secs: f64) -> u64 {
    (secs.max(0.0) * crate::constants::TICK_RATE as f64).round() as u64
}
