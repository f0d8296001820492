//! Simulation constants and tuning parameters.
//!
//! These are the defaults behind `Tuning` in the sim crate's config; a JSON
//! config may override any of them.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- Lifecycle ---

/// Delay from cart creation to the first anti-stall check.
pub const ANTI_STALL_INITIAL_SECS: f64 = 12.0;

/// Grace period between a driver leaving the seat and the abandon defeat.
pub const ANTI_STALL_GRACE_SECS: f64 = 1.5;

/// Delay between joint severance and full disposal of a destroyed cart.
pub const CART_DISPOSE_DELAY_SECS: f64 = 3.0;

/// Delay between detaching an accessory and disposing its parts.
pub const ACCESSORY_DISPOSE_DELAY_SECS: f64 = 3.0;

// --- Perks ---

/// Time between bumper attachment and its combat check going live.
pub const BUMPER_ARMING_SECS: f64 = 5.0;

/// Booster mount point relative to the cart root pose (behind the seat).
pub const BOOSTER_OFFSET: [f32; 3] = [0.0, 0.6, 2.2];

/// Bumper mount point relative to the cart root pose (front).
pub const BUMPER_OFFSET: [f32; 3] = [0.0, 0.0, -2.6];

// --- Combat ---

/// Number of directional probes cast per attacker per frame.
pub const PROBE_COUNT: usize = 5;

/// Half-angle of the probe fan around the forward axis (degrees).
pub const PROBE_CONE_HALF_ANGLE_DEG: f32 = 17.5;

/// Length of each probe (studs).
pub const PROBE_LENGTH: f32 = 20.0;

/// Flat damage dealt by every ram.
pub const RAM_BASE_DAMAGE: f64 = 4.0;

/// Multiplier applied to the bumper's bonus damage.
pub const RAM_BONUS_MULTIPLIER: f64 = 3.0;

/// Per-axis weights applied to the victim-local hit direction (x, y, z).
pub const HIT_DIRECTION_WEIGHTS: [f32; 3] = [1.2, 0.5, 0.3];

/// Re-hit immunity window for the same attacker/victim pair.
pub const TAG_IMMUNITY_SECS: f64 = 3.0;

/// Post-hit stun window during which no attacker can score on the victim.
pub const STUN_SECS: f64 = 2.0;

// --- Round transition ---

/// Cue to unanchor.
pub const ROUND_UNANCHOR_DELAY_SECS: f64 = 1.0;

/// Unanchor to seating the driver.
pub const ROUND_SEAT_DELAY_SECS: f64 = 0.5;

/// Total settle time before the round is live.
pub const ROUND_SETTLE_SECS: f64 = 3.0;

/// Collision group applied to a seated driver's head.
pub const DRIVER_HEAD_COLLISION_GROUP: &str = "CartDriverHead";
