//! Simulation snapshot returned after every tick.

use serde::{Deserialize, Serialize};

use crate::enums::{RoundPhase, StallState};
use crate::events::SimEvent;
use crate::types::{CartId, PlayerId, SimTime};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimSnapshot {
    pub time: SimTime,
    pub phase: RoundPhase,
    pub carts: Vec<CartView>,
    /// Events produced since the previous snapshot.
    pub events: Vec<SimEvent>,
}

/// Observer view of one live cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartView {
    pub cart: CartId,
    pub driver: Option<PlayerId>,
    pub stall: StallState,
    pub fuel_remaining: Option<f64>,
    pub bumper_uses: Option<u32>,
    pub bumper_active: bool,
    pub lost_control: bool,
    pub tagged_by: Option<PlayerId>,
}
