//! Simulation core for CARTCLASH.
//!
//! Owns every cart record for the duration of a round, runs the anti-stall
//! detectors and perk timers, resolves rams each tick and produces
//! `SimSnapshot`s for the outer round state machine.

pub mod config;
pub mod engine;
pub mod error;
pub mod headless;
pub mod host;
pub mod registry;
pub mod scheduler;
pub mod spawn;
pub mod stall_fsm;
pub mod systems;

pub use cartclash_core as core;
pub use config::{SimConfig, Tuning};
pub use engine::SimulationEngine;
pub use error::{HostError, SimError};
pub use headless::HeadlessHost;
