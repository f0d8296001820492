//! Round-robin spawn allocation.
//!
//! Slots are 1-based and handed out in order. Running past the configured
//! spawn points is a configuration error and fails loudly.

use cartclash_core::types::Transform;

use crate::error::SimError;

#[derive(Debug, Clone)]
pub struct SpawnAllocator {
    points: Vec<Transform>,
    next_slot: usize,
}

impl SpawnAllocator {
    pub fn new(points: Vec<Transform>) -> Self {
        Self {
            points,
            next_slot: 1,
        }
    }

    /// Slot and pose the next cart will take, without consuming it.
    pub fn peek(&self) -> Result<(usize, Transform), SimError> {
        let slot = self.next_slot;
        self.points
            .get(slot - 1)
            .map(|pose| (slot, *pose))
            .ok_or(SimError::SpawnSlotsExhausted {
                slot,
                available: self.capacity(),
            })
    }

    /// Consume the current slot.
    pub fn advance(&mut self) {
        self.next_slot += 1;
    }

    /// Take the current slot and advance.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<(usize, Transform), SimError> {
        let taken = self.peek()?;
        self.advance();
        Ok(taken)
    }

    /// Start handing out slots from 1 again.
    pub fn reset(&mut self) {
        self.next_slot = 1;
    }

    pub fn next_slot(&self) -> usize {
        self.next_slot
    }

    pub fn capacity(&self) -> usize {
        self.points.len()
    }
}
