//! Commands sent by the outer round state machine to the simulation.
//!
//! Commands are queued and processed at the next tick boundary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::PlayerId;

/// Colour and material for one named part of the cart model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartFinish {
    pub color: [u8; 3],
    pub material: String,
}

/// A player's cosmetic skin: part name to finish. Opaque to the core; it is
/// handed to the host when the cart is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Customization {
    pub parts: BTreeMap<String, PartFinish>,
}

/// Perks a player brought into the round. Zero means "not requested".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerkRequest {
    /// Booster fuel units.
    pub fuel: f64,
    /// Booster thrust strength.
    pub boost_strength: f64,
    /// Number of rams the bumper survives.
    pub shield_uses: u32,
    /// Bonus damage folded into the ram formula.
    pub damage_per_hit: f64,
}

/// All commands the core accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimCommand {
    /// Build a cart for a player in the holding area.
    CreateCart {
        player: PlayerId,
        kind: String,
        #[serde(default)]
        customization: Customization,
    },
    /// Tear down a player's cart without a defeat.
    DestroyCart { player: PlayerId },
    /// Player disconnected.
    PlayerLeft { player: PlayerId },
    /// Weld the requested perks onto the player's cart.
    AttachPerks { player: PlayerId, perks: PerkRequest },
    /// Remove the player's bumper.
    DetachBumper { player: PlayerId },
    /// External boost consumption.
    ConsumeBoost { player: PlayerId, amount: f64 },
    /// Release every cart and start the round.
    BeginRound,
    /// End the round and tear down every cart.
    EndRound,
}
