//! Error types for the simulation and its host services.

use thiserror::Error;

use cartclash_core::enums::RoundPhase;
use cartclash_core::types::{CartId, PartId, PlayerId};

/// Failures raised by a host service implementation.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("unknown cart kind `{0}`")]
    UnknownCartKind(String),

    #[error("{0} does not exist in the host world")]
    UnknownCart(CartId),

    #[error("{0} does not exist in the host world")]
    MissingPart(PartId),
}

/// Errors surfaced by the engine's public operations.
///
/// Missing-entity and stale-timer conditions are never errors; they are
/// absorbed where they occur.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("spawn slot {slot} requested but only {available} spawn points are configured")]
    SpawnSlotsExhausted { slot: usize, available: usize },

    #[error("{player} already owns {cart}")]
    PlayerAlreadyHasCart { player: PlayerId, cart: CartId },

    #[error("cannot begin a round while {0:?}")]
    RoundNotIdle(RoundPhase),

    #[error("host: {0}")]
    Host(#[from] HostError),

    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
}
