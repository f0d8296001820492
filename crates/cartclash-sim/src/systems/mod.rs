//! Systems that act on the registry, scheduler and host.
//!
//! Systems are free functions over a borrowed `Ctx`. They do not own state;
//! everything lives in the registry, the scheduler or the host world.

pub mod anti_stall;
pub mod combat;
pub mod lifecycle;
pub mod perks;
pub mod round;
pub mod snapshot;

use cartclash_core::enums::RoundPhase;
use cartclash_core::events::SimEvent;
use cartclash_core::types::TimerId;

use crate::config::Tuning;
use crate::host::Host;
use crate::registry::Registry;
use crate::scheduler::{Observable, Scheduler, Task};
use crate::spawn::SpawnAllocator;

/// Mutable view over the engine state a system may touch.
pub struct Ctx<'a, H: Host> {
    pub phase: &'a mut RoundPhase,
    /// Number of the most recent round started.
    pub round: &'a mut u32,
    pub registry: &'a mut Registry,
    pub scheduler: &'a mut Scheduler,
    pub spawns: &'a mut SpawnAllocator,
    pub host: &'a mut H,
    pub events: &'a mut Vec<SimEvent>,
    pub tuning: &'a Tuning,
    pub next_cart_id: &'a mut u64,
}

impl<H: Host> Ctx<'_, H> {
    /// Schedule `task` after `secs` of simulated time.
    pub fn after_secs(&mut self, secs: f64, task: Task) -> TimerId {
        let delay = self.tuning.ticks(secs);
        self.scheduler.after(delay, task)
    }
}

/// Run every deferred timer due at the current tick.
pub fn fire_due_timers<H: Host>(ctx: &mut Ctx<'_, H>) {
    while let Some((_id, task)) = ctx.scheduler.pop_due() {
        dispatch(ctx, task);
    }
}

/// Fire the one-shot watchers whose observed value changed.
pub fn fire_watchers<H: Host>(ctx: &mut Ctx<'_, H>) {
    let host = &*ctx.host;
    let tasks = ctx.scheduler.take_changed(|observable| match observable {
        Observable::SeatOccupied(cart) => host.seat_occupant(cart).is_some(),
    });
    for task in tasks {
        dispatch(ctx, task);
    }
}

/// Route a scheduled task to its handler. Handlers validate the task against
/// current state and skip it if the world has moved on.
pub fn dispatch<H: Host>(ctx: &mut Ctx<'_, H>, task: Task) {
    match task {
        Task::StallCheck { cart, signal } => anti_stall::advance(ctx, cart, signal),
        Task::ClearTag { victim, attacker } => combat::clear_tag(ctx, victim, attacker),
        Task::ClearStun { victim } => combat::clear_stun(ctx, victim),
        Task::ArmBumper {
            cart,
            attached_tick,
        } => perks::arm_bumper(ctx, cart, attached_tick),
        Task::DisposeCart { cart, parts } => lifecycle::dispose_cart(ctx, cart, &parts),
        Task::DisposeParts { parts } => ctx.host.dispose(&parts),
        Task::ReleaseCart { cart } => round::release_cart(ctx, cart),
        Task::SeatDriver { cart } => round::seat_driver(ctx, cart),
        Task::RoundLive { round } => round::round_live(ctx, round),
    }
}
