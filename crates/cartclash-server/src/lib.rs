//! CARTCLASH headless server.
//!
//! Runs the simulation engine on its own thread and feeds it commands from
//! whatever front-end sits on top (stdin JSON lines for the binary).

pub mod game_loop;
pub mod logging;
pub mod state;

pub use cartclash_core as core;
