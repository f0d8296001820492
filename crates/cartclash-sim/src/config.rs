//! Engine configuration: spawn layout plus tuning overrides.
//!
//! Every field falls back to the constants in `cartclash_core::constants`, so
//! a config file only needs to name what it changes.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use cartclash_core::constants::*;
use cartclash_core::types::{secs_to_ticks, Transform};

use crate::error::SimError;

/// Configuration for starting a new simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Holding-area spawn positions, in slot order (slot 1 first).
    pub spawn_points: Vec<Vec3>,
    pub tuning: Tuning,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            spawn_points: default_spawn_points(),
            tuning: Tuning::default(),
        }
    }
}

impl SimConfig {
    pub fn from_json_str(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Spawn poses; every cart faces the fixed forward axis.
    pub fn spawn_transforms(&self) -> Vec<Transform> {
        self.spawn_points.iter().copied().map(Transform::at).collect()
    }
}

/// Two rows of eight bays, 12 studs apart.
fn default_spawn_points() -> Vec<Vec3> {
    (0..16)
        .map(|i| {
            let column = (i % 8) as f32;
            let row = (i / 8) as f32;
            Vec3::new(column * 12.0 - 42.0, 0.0, row * 16.0)
        })
        .collect()
}

/// Timing, probe and damage parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub anti_stall_initial_secs: f64,
    pub anti_stall_grace_secs: f64,
    pub cart_dispose_delay_secs: f64,
    pub accessory_dispose_delay_secs: f64,
    pub bumper_arming_secs: f64,
    pub tag_immunity_secs: f64,
    pub stun_secs: f64,
    pub round_unanchor_delay_secs: f64,
    pub round_seat_delay_secs: f64,
    pub round_settle_secs: f64,
    pub probe_count: usize,
    pub probe_cone_half_angle_deg: f32,
    pub probe_length: f32,
    pub ram_base_damage: f64,
    pub ram_bonus_multiplier: f64,
    pub hit_direction_weights: [f32; 3],
    pub booster_offset: Vec3,
    pub bumper_offset: Vec3,
    pub driver_head_collision_group: String,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            anti_stall_initial_secs: ANTI_STALL_INITIAL_SECS,
            anti_stall_grace_secs: ANTI_STALL_GRACE_SECS,
            cart_dispose_delay_secs: CART_DISPOSE_DELAY_SECS,
            accessory_dispose_delay_secs: ACCESSORY_DISPOSE_DELAY_SECS,
            bumper_arming_secs: BUMPER_ARMING_SECS,
            tag_immunity_secs: TAG_IMMUNITY_SECS,
            stun_secs: STUN_SECS,
            round_unanchor_delay_secs: ROUND_UNANCHOR_DELAY_SECS,
            round_seat_delay_secs: ROUND_SEAT_DELAY_SECS,
            round_settle_secs: ROUND_SETTLE_SECS,
            probe_count: PROBE_COUNT,
            probe_cone_half_angle_deg: PROBE_CONE_HALF_ANGLE_DEG,
            probe_length: PROBE_LENGTH,
            ram_base_damage: RAM_BASE_DAMAGE,
            ram_bonus_multiplier: RAM_BONUS_MULTIPLIER,
            hit_direction_weights: HIT_DIRECTION_WEIGHTS,
            booster_offset: Vec3::from_array(BOOSTER_OFFSET),
            bumper_offset: Vec3::from_array(BUMPER_OFFSET),
            driver_head_collision_group: DRIVER_HEAD_COLLISION_GROUP.to_string(),
        }
    }
}

impl Tuning {
    /// Damage dealt by one ram from a bumper with the given bonus.
    pub fn ram_damage(&self, damage_per_hit: f64) -> f64 {
        self.ram_base_damage + damage_per_hit * self.ram_bonus_multiplier
    }

    pub fn ticks(&self, secs: f64) -> u64 {
        secs_to_ticks(secs)
    }
}
