//! Anti-stall finite state machine.
//!
//! Pure transition function for the per-cart detector that knocks out
//! players who never get into their cart, or who climb out of it mid-round.
//! No registry or host dependency; the anti-stall system feeds it
//! observations and applies the returned action.

use cartclash_core::enums::{DefeatCause, RoundPhase, StallState};

/// What woke the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StallSignal {
    /// The initial deadline after creation elapsed.
    InitialDeadline,
    /// The seat watcher fired.
    SeatChanged,
    /// The exit grace timer elapsed.
    GraceElapsed,
    /// The round went live after its settle period.
    RoundLive,
}

/// Observations at the moment a signal is processed.
#[derive(Debug, Clone, Copy)]
pub struct StallContext {
    pub state: StallState,
    pub signal: StallSignal,
    pub seat_occupied: bool,
    pub round: RoundPhase,
    pub record_exists: bool,
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StallAction {
    None,
    /// Arm the seat watcher against the given baseline occupancy.
    WatchSeat { baseline: bool },
    /// Start the exit grace timer.
    StartGrace,
    Defeat(DefeatCause),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StallUpdate {
    pub new_state: StallState,
    pub action: StallAction,
}

impl StallUpdate {
    fn stay(state: StallState) -> Self {
        Self {
            new_state: state,
            action: StallAction::None,
        }
    }

    fn to(new_state: StallState, action: StallAction) -> Self {
        Self { new_state, action }
    }
}

/// Evaluate one signal.
pub fn evaluate(ctx: &StallContext) -> StallUpdate {
    // Terminal short-circuit: a finished round or a removed record voids
    // everything, whatever state the detector was in.
    if !ctx.record_exists || ctx.round == RoundPhase::Ended {
        return StallUpdate::stay(StallState::Resolved);
    }

    match ctx.state {
        StallState::ArmedInitial => evaluate_armed(ctx),
        StallState::AwaitingRound => evaluate_awaiting(ctx),
        StallState::WatchingForExit => evaluate_watching(ctx),
        StallState::ExitGrace => evaluate_grace(ctx),
        StallState::Resolved => StallUpdate::stay(StallState::Resolved),
    }
}

fn start_watching() -> StallUpdate {
    StallUpdate::to(
        StallState::WatchingForExit,
        StallAction::WatchSeat { baseline: true },
    )
}

fn evaluate_armed(ctx: &StallContext) -> StallUpdate {
    match (ctx.signal, ctx.seat_occupied) {
        (StallSignal::InitialDeadline | StallSignal::SeatChanged, true) => start_watching(),
        (StallSignal::InitialDeadline, false) if ctx.round.is_live() => StallUpdate::to(
            StallState::Resolved,
            StallAction::Defeat(DefeatCause::NeverEnteredCart),
        ),
        // Drivers are still being seated; judge once the round is live.
        (StallSignal::InitialDeadline, false) => StallUpdate::stay(StallState::AwaitingRound),
        // Watcher fired but the seat is empty again: keep waiting for entry.
        (StallSignal::SeatChanged, false) => StallUpdate::to(
            StallState::ArmedInitial,
            StallAction::WatchSeat { baseline: false },
        ),
        (StallSignal::GraceElapsed | StallSignal::RoundLive, _) => {
            StallUpdate::stay(StallState::ArmedInitial)
        }
    }
}

fn evaluate_awaiting(ctx: &StallContext) -> StallUpdate {
    match (ctx.signal, ctx.seat_occupied) {
        (StallSignal::SeatChanged | StallSignal::RoundLive, true) => start_watching(),
        (StallSignal::SeatChanged, false) => StallUpdate::to(
            StallState::AwaitingRound,
            StallAction::WatchSeat { baseline: false },
        ),
        (StallSignal::RoundLive, false) if ctx.round.is_live() => StallUpdate::to(
            StallState::Resolved,
            StallAction::Defeat(DefeatCause::NeverEnteredCart),
        ),
        _ => StallUpdate::stay(StallState::AwaitingRound),
    }
}

fn evaluate_watching(ctx: &StallContext) -> StallUpdate {
    match (ctx.signal, ctx.seat_occupied) {
        (StallSignal::SeatChanged, false) => {
            StallUpdate::to(StallState::ExitGrace, StallAction::StartGrace)
        }
        (StallSignal::SeatChanged, true) => start_watching(),
        _ => StallUpdate::stay(StallState::WatchingForExit),
    }
}

/// The seat is not re-checked on a live expiry. Outside a live round the
/// exit does not count and the detector re-arms against the current seat.
fn evaluate_grace(ctx: &StallContext) -> StallUpdate {
    match (ctx.signal, ctx.seat_occupied) {
        (StallSignal::GraceElapsed, _) if ctx.round.is_live() => StallUpdate::to(
            StallState::Resolved,
            StallAction::Defeat(DefeatCause::AbandonedCart),
        ),
        (StallSignal::GraceElapsed, true) => start_watching(),
        (StallSignal::GraceElapsed, false) => StallUpdate::to(
            StallState::AwaitingRound,
            StallAction::WatchSeat { baseline: false },
        ),
        _ => StallUpdate::stay(StallState::ExitGrace),
    }
}
