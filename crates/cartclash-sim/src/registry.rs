//! Entity registry: the single owner of every live cart record.
//!
//! Lookups by player and by part go through derived indices that are rebuilt
//! whenever the set of records or body parts changes. They are never edited
//! by hand.

use std::collections::{BTreeMap, HashMap};

use cartclash_core::components::{BoosterState, BumperState, CombatState};
use cartclash_core::enums::StallState;
use cartclash_core::state::CartView;
use cartclash_core::types::{CartId, PartId, PlayerId};

use crate::error::SimError;
use crate::scheduler::Scheduler;

/// Mutable combat/lifecycle record for one cart.
///
/// Driver and parts are private so they can only change through the
/// registry, which keeps its indices in step.
#[derive(Debug, Clone)]
pub struct CartRecord {
    kind: String,
    driver: Option<PlayerId>,
    root: PartId,
    parts: Vec<PartId>,
    pub spawn_slot: usize,
    pub booster: Option<BoosterState>,
    pub bumper: Option<BumperState>,
    pub combat: CombatState,
    pub stall: StallState,
}

impl CartRecord {
    pub fn new(
        kind: impl Into<String>,
        driver: PlayerId,
        root: PartId,
        parts: Vec<PartId>,
        spawn_slot: usize,
    ) -> Self {
        Self {
            kind: kind.into(),
            driver: Some(driver),
            root,
            parts,
            spawn_slot,
            booster: None,
            bumper: None,
            combat: CombatState::default(),
            stall: StallState::default(),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn driver(&self) -> Option<PlayerId> {
        self.driver
    }

    /// Primary physical part.
    pub fn root(&self) -> PartId {
        self.root
    }

    /// Body parts in load order.
    pub fn parts(&self) -> &[PartId] {
        &self.parts
    }

    /// Body parts plus every attached accessory part.
    pub fn owned_parts(&self) -> Vec<PartId> {
        let mut parts = self.parts.clone();
        if let Some(booster) = &self.booster {
            parts.extend_from_slice(&booster.parts);
        }
        if let Some(bumper) = &self.bumper {
            parts.extend_from_slice(&bumper.parts);
        }
        parts
    }

    pub fn view(&self, cart: CartId) -> CartView {
        CartView {
            cart,
            driver: self.driver,
            stall: self.stall,
            fuel_remaining: self.booster.as_ref().map(|b| b.fuel_remaining),
            bumper_uses: self.bumper.as_ref().map(|b| b.uses_remaining),
            bumper_active: self.bumper.as_ref().is_some_and(|b| b.is_active()),
            lost_control: self.combat.lost_control,
            tagged_by: self.combat.tagged_by,
        }
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    records: BTreeMap<CartId, CartRecord>,
    by_player: HashMap<PlayerId, CartId>,
    by_part: HashMap<PartId, CartId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new record. A player may drive at most one live cart.
    pub fn create(&mut self, cart: CartId, record: CartRecord) -> Result<(), SimError> {
        if let Some(player) = record.driver {
            if let Some(&existing) = self.by_player.get(&player) {
                return Err(SimError::PlayerAlreadyHasCart {
                    player,
                    cart: existing,
                });
            }
        }
        self.records.insert(cart, record);
        self.reindex();
        Ok(())
    }

    pub fn get(&self, cart: CartId) -> Option<&CartRecord> {
        self.records.get(&cart)
    }

    /// Mutable access for perk, combat and stall state.
    pub fn get_mut(&mut self, cart: CartId) -> Option<&mut CartRecord> {
        self.records.get_mut(&cart)
    }

    pub fn contains(&self, cart: CartId) -> bool {
        self.records.contains_key(&cart)
    }

    /// Remove a record, deregistering its frame callback first.
    /// Removing an unknown cart is a no-op.
    pub fn remove(&mut self, cart: CartId, scheduler: &mut Scheduler) -> Option<CartRecord> {
        let record = self.records.remove(&cart)?;
        if let Some(handle) = record.bumper.as_ref().and_then(|b| b.frame_handle()) {
            scheduler.unsubscribe(handle);
        }
        self.reindex();
        Some(record)
    }

    /// All live records in cart order.
    pub fn all(&self) -> impl Iterator<Item = (CartId, &CartRecord)> {
        self.records.iter().map(|(cart, record)| (*cart, record))
    }

    pub fn carts(&self) -> Vec<CartId> {
        self.records.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn cart_of(&self, player: PlayerId) -> Option<CartId> {
        self.by_player.get(&player).copied()
    }

    /// Resolve a body part to its owning cart. Accessory parts are not
    /// indexed; they are never hull targets.
    pub fn owner_of_part(&self, part: PartId) -> Option<CartId> {
        self.by_part.get(&part).copied()
    }

    /// Record a body part that finished loading after creation.
    pub fn add_part(&mut self, cart: CartId, part: PartId) -> bool {
        let Some(record) = self.records.get_mut(&cart) else {
            return false;
        };
        if record.parts.contains(&part) {
            return false;
        }
        record.parts.push(part);
        self.reindex();
        true
    }

    fn reindex(&mut self) {
        self.by_player.clear();
        self.by_part.clear();
        for (cart, record) in &self.records {
            if let Some(player) = record.driver {
                self.by_player.insert(player, *cart);
            }
            for part in &record.parts {
                self.by_part.insert(*part, *cart);
            }
        }
    }
}
