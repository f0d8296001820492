//! Snapshot system: builds a `SimSnapshot` from the registry.
//!
//! This system is read-only; it never modifies the registry.

use cartclash_core::enums::RoundPhase;
use cartclash_core::events::SimEvent;
use cartclash_core::state::{CartView, SimSnapshot};
use cartclash_core::types::SimTime;

use crate::registry::Registry;

/// Build a complete snapshot of every live cart, in cart order.
pub fn build_snapshot(
    registry: &Registry,
    time: &SimTime,
    phase: RoundPhase,
    events: Vec<SimEvent>,
) -> SimSnapshot {
    SimSnapshot {
        time: *time,
        phase,
        carts: build_carts(registry),
        events,
    }
}

fn build_carts(registry: &Registry) -> Vec<CartView> {
    registry
        .all()
        .map(|(cart, record)| record.view(cart))
        .collect()
}
