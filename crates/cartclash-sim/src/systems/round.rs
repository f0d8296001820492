//! Round transitions: releasing the holding area and tearing everything down.
//!
//! Starting a round is staged over several ticks. Each cart is unanchored,
//! then its driver is seated, and the round goes live once the settle period
//! is over. The caller is never blocked; it watches for `RoundStarted`.

use cartclash_core::enums::{RoundPhase, VisualCue};
use cartclash_core::events::SimEvent;
use cartclash_core::types::{CartId, PlayerId};

use crate::error::SimError;
use crate::host::Host;
use crate::scheduler::Task;
use crate::stall_fsm::StallSignal;

use super::{anti_stall, lifecycle, Ctx};

/// Open the arena and stage the release of every live cart.
pub fn begin_round<H: Host>(ctx: &mut Ctx<'_, H>) -> Result<(), SimError> {
    if !matches!(*ctx.phase, RoundPhase::Intermission | RoundPhase::Ended) {
        return Err(SimError::RoundNotIdle(*ctx.phase));
    }

    ctx.host.set_containment(false);
    let roster: Vec<(CartId, PlayerId)> = ctx
        .registry
        .all()
        .filter_map(|(cart, record)| record.driver().map(|player| (cart, player)))
        .collect();
    ctx.events.push(SimEvent::RoundRoster {
        players: roster.iter().map(|(_, player)| *player).collect(),
    });

    *ctx.phase = RoundPhase::Starting;
    *ctx.round += 1;

    let release = ctx.tuning.ticks(ctx.tuning.round_unanchor_delay_secs);
    let seat = release + ctx.tuning.ticks(ctx.tuning.round_seat_delay_secs);
    for (cart, player) in &roster {
        ctx.events.push(SimEvent::VisualCue {
            player: *player,
            cue: VisualCue::RoundRelease,
        });
        ctx.scheduler.after(release, Task::ReleaseCart { cart: *cart });
        ctx.scheduler.after(seat, Task::SeatDriver { cart: *cart });
    }
    let settle = ctx.tuning.round_settle_secs;
    let round = *ctx.round;
    ctx.after_secs(settle, Task::RoundLive { round });

    log::info!("round {round} starting with {} carts", roster.len());
    Ok(())
}

/// Enable physics on every part of the cart.
pub fn release_cart<H: Host>(ctx: &mut Ctx<'_, H>, cart: CartId) {
    let Some(record) = ctx.registry.get(cart) else {
        log::debug!("release of {cart} skipped: cart gone");
        return;
    };
    ctx.host.set_anchored(&record.owned_parts(), false);
}

/// Put the driver in the seat and lock down their avatar.
pub fn seat_driver<H: Host>(ctx: &mut Ctx<'_, H>, cart: CartId) {
    let Some(player) = ctx.registry.get(cart).and_then(|record| record.driver()) else {
        log::debug!("seating for {cart} skipped: cart gone");
        return;
    };
    if !ctx.host.avatar_exists(player) {
        log::debug!("seating for {cart} skipped: {player} has no avatar");
        return;
    }
    ctx.host.evict_from_seat(player);
    ctx.host.seat_in(player, cart);
    ctx.host.set_jump_enabled(player, false);
    ctx.host
        .set_head_collision_group(player, &ctx.tuning.driver_head_collision_group);
}

/// Settle period over: the round is live, and detectors whose deadline
/// passed during the wait get their verdict now.
pub fn round_live<H: Host>(ctx: &mut Ctx<'_, H>, round: u32) {
    if *ctx.phase != RoundPhase::Starting || *ctx.round != round {
        log::debug!("round {round} settle timer is stale");
        return;
    }
    *ctx.phase = RoundPhase::InProgress;
    ctx.events.push(SimEvent::RoundStarted);
    log::info!("round {round} in progress");

    for cart in ctx.registry.carts() {
        anti_stall::advance(ctx, cart, StallSignal::RoundLive);
    }
}

/// Close the round: every cart is torn down without a defeat and the
/// holding area is restored for the next round.
pub fn end_round<H: Host>(ctx: &mut Ctx<'_, H>) {
    *ctx.phase = RoundPhase::Ended;
    for cart in ctx.registry.carts() {
        lifecycle::teardown(ctx, cart);
    }
    ctx.spawns.reset();
    ctx.host.set_containment(true);
    ctx.events.push(SimEvent::RoundEnded);
    log::info!("round {} ended", *ctx.round);
}
