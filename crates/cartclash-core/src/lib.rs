//! Core types and definitions for the cartclash simulation.
//!
//! This crate defines the vocabulary shared across the other crates:
//! identities, per-cart state blocks, commands, events, snapshots and
//! tuning constants. It carries no engine logic.

pub mod commands;
pub mod components;
pub mod constants;
pub mod enums;
pub mod events;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;
