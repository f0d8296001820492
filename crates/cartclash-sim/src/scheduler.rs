//! Cooperative scheduling: deferred timers, one-shot watchers and per-frame
//! subscriptions.
//!
//! Scheduled work is data, not closures. Each `Task` names its target by id
//! and carries whatever state it expects to find, so the handler can check
//! the registry before acting and skip if the world has moved on.

use std::collections::BTreeMap;

use cartclash_core::types::{CartId, FrameHandle, PartId, PlayerId, TimerId};

use crate::stall_fsm::StallSignal;

/// Deferred work items.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    /// Feed a signal to a cart's anti-stall detector.
    StallCheck { cart: CartId, signal: StallSignal },
    /// End tag immunity, if `attacker` still holds the tag.
    ClearTag { victim: CartId, attacker: PlayerId },
    /// End the post-hit stun.
    ClearStun { victim: CartId },
    /// Finish arming the bumper attached at `attached_tick`.
    ArmBumper { cart: CartId, attached_tick: u64 },
    /// Final disposal of a destroyed cart's parts.
    DisposeCart { cart: CartId, parts: Vec<PartId> },
    /// Final disposal of a released accessory.
    DisposeParts { parts: Vec<PartId> },
    /// Round start: unanchor the cart.
    ReleaseCart { cart: CartId },
    /// Round start: put the driver in the seat.
    SeatDriver { cart: CartId },
    /// Round start: settle period over for round number `round`.
    RoundLive { round: u32 },
}

/// Values a watcher can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Observable {
    SeatOccupied(CartId),
}

#[derive(Debug, Clone)]
struct Watcher {
    baseline: bool,
    task: Task,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now: u64,
    next_timer: u64,
    next_frame: u64,
    /// Keyed by (due tick, id): equal due ticks fire in scheduling order.
    timers: BTreeMap<(u64, TimerId), Task>,
    watchers: BTreeMap<Observable, Watcher>,
    frames: BTreeMap<FrameHandle, CartId>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn set_now(&mut self, tick: u64) {
        self.now = tick;
    }

    // --- Deferred timers ---

    /// Schedule `task` to run `delay_ticks` from now.
    pub fn after(&mut self, delay_ticks: u64, task: Task) -> TimerId {
        let id = TimerId(self.next_timer);
        self.next_timer += 1;
        self.timers.insert((self.now + delay_ticks, id), task);
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let key = self.timers.keys().find(|(_, timer)| *timer == id).copied();
        key.is_some_and(|key| self.timers.remove(&key).is_some())
    }

    /// Pop the earliest timer that is due at the current tick.
    pub fn pop_due(&mut self) -> Option<(TimerId, Task)> {
        let (&(due, id), _) = self.timers.first_key_value()?;
        if due > self.now {
            return None;
        }
        self.timers.remove(&(due, id)).map(|task| (id, task))
    }

    // --- One-shot watchers ---

    /// Fire `task` once when `observable` differs from `baseline`. Re-arming
    /// an observable replaces its watcher.
    pub fn watch(&mut self, observable: Observable, baseline: bool, task: Task) {
        self.watchers.insert(observable, Watcher { baseline, task });
    }

    pub fn unwatch(&mut self, observable: Observable) -> bool {
        self.watchers.remove(&observable).is_some()
    }

    pub fn is_watching(&self, observable: Observable) -> bool {
        self.watchers.contains_key(&observable)
    }

    /// Remove and return the tasks of every watcher whose value changed.
    pub fn take_changed(&mut self, mut read: impl FnMut(Observable) -> bool) -> Vec<Task> {
        let changed: Vec<Observable> = self
            .watchers
            .iter()
            .filter(|(observable, watcher)| read(**observable) != watcher.baseline)
            .map(|(observable, _)| *observable)
            .collect();
        changed
            .into_iter()
            .filter_map(|observable| self.watchers.remove(&observable))
            .map(|watcher| watcher.task)
            .collect()
    }

    // --- Frame subscriptions ---

    pub fn subscribe(&mut self, cart: CartId) -> FrameHandle {
        let handle = FrameHandle(self.next_frame);
        self.next_frame += 1;
        self.frames.insert(handle, cart);
        handle
    }

    pub fn unsubscribe(&mut self, handle: FrameHandle) -> bool {
        self.frames.remove(&handle).is_some()
    }

    pub fn is_subscribed(&self, handle: FrameHandle) -> bool {
        self.frames.contains_key(&handle)
    }

    /// Current subscribers in registration order.
    pub fn subscribers(&self) -> Vec<(FrameHandle, CartId)> {
        self.frames.iter().map(|(h, c)| (*h, *c)).collect()
    }
}
