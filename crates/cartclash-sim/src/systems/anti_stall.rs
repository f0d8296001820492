//! Anti-stall glue: feeds scheduler signals into the per-cart FSM and applies
//! the resulting action.

use cartclash_core::enums::StallState;
use cartclash_core::types::CartId;

use crate::host::Host;
use crate::scheduler::{Observable, Task};
use crate::stall_fsm::{self, StallAction, StallContext, StallSignal};

use super::{lifecycle, Ctx};

/// Arm a freshly created cart: the initial deadline plus a seat watcher
/// against the current occupancy.
pub fn arm<H: Host>(ctx: &mut Ctx<'_, H>, cart: CartId) {
    let deadline = ctx.tuning.anti_stall_initial_secs;
    ctx.after_secs(
        deadline,
        Task::StallCheck {
            cart,
            signal: StallSignal::InitialDeadline,
        },
    );
    let occupied = ctx.host.seat_occupant(cart).is_some();
    watch_seat(ctx, cart, occupied);
}

/// Process one signal for `cart`.
pub fn advance<H: Host>(ctx: &mut Ctx<'_, H>, cart: CartId, signal: StallSignal) {
    let state = ctx.registry.get(cart).map(|record| record.stall);
    let update = stall_fsm::evaluate(&StallContext {
        state: state.unwrap_or(StallState::Resolved),
        signal,
        seat_occupied: ctx.host.seat_occupant(cart).is_some(),
        round: *ctx.phase,
        record_exists: state.is_some(),
    });

    let Some(record) = ctx.registry.get_mut(cart) else {
        log::debug!("stall check {signal:?} for {cart} skipped: cart gone");
        return;
    };
    if record.stall != update.new_state {
        log::debug!("{cart} stall {:?} -> {:?}", record.stall, update.new_state);
    }
    record.stall = update.new_state;
    let driver = record.driver();

    match update.action {
        StallAction::None => {}
        StallAction::WatchSeat { baseline } => watch_seat(ctx, cart, baseline),
        StallAction::StartGrace => {
            let grace = ctx.tuning.anti_stall_grace_secs;
            ctx.after_secs(
                grace,
                Task::StallCheck {
                    cart,
                    signal: StallSignal::GraceElapsed,
                },
            );
        }
        StallAction::Defeat(cause) => {
            if let Some(player) = driver {
                lifecycle::defeat(ctx, player, cause);
            }
        }
    }

    if update.new_state == StallState::Resolved {
        ctx.scheduler.unwatch(Observable::SeatOccupied(cart));
    }
}

fn watch_seat<H: Host>(ctx: &mut Ctx<'_, H>, cart: CartId, baseline: bool) {
    ctx.scheduler.watch(
        Observable::SeatOccupied(cart),
        baseline,
        Task::StallCheck {
            cart,
            signal: StallSignal::SeatChanged,
        },
    );
}
