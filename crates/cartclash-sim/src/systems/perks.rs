//! Perk attachment: booster fuel and the arming bumper.

use cartclash_core::commands::PerkRequest;
use cartclash_core::components::{BoosterState, BumperPhase, BumperState};
use cartclash_core::enums::Accessory;
use cartclash_core::events::SimEvent;
use cartclash_core::types::{CartId, PlayerId};

use crate::error::{HostError, SimError};
use crate::host::Host;
use crate::scheduler::Task;

use super::Ctx;

/// Weld the requested perks onto `player`'s cart.
///
/// Zero fuel or zero shield uses skips that branch. A new bumper replaces any
/// existing one and starts its own arming delay.
pub fn attach_perks<H: Host>(
    ctx: &mut Ctx<'_, H>,
    player: PlayerId,
    perks: &PerkRequest,
) -> Result<(), SimError> {
    let Some(cart) = ctx.registry.cart_of(player) else {
        log::debug!("perks for {player} ignored: no live cart");
        return Ok(());
    };
    let Some(root) = ctx.registry.get(cart).map(|record| record.root()) else {
        return Ok(());
    };
    let root_pose = ctx.host.pose(root).ok_or(HostError::MissingPart(root))?;

    if perks.fuel > 0.0 {
        release_booster(ctx, cart);
        let at = root_pose.offset(ctx.tuning.booster_offset);
        let parts = ctx.host.attach_accessory(cart, Accessory::Booster, at)?;
        if let Some(record) = ctx.registry.get_mut(cart) {
            record.booster = Some(BoosterState {
                fuel_remaining: perks.fuel,
                strength: perks.boost_strength,
                parts,
            });
        }
        log::info!("{cart} booster attached ({} fuel)", perks.fuel);
    }

    if perks.shield_uses > 0 {
        detach_bumper_of(ctx, cart);
        let at = root_pose.offset(ctx.tuning.bumper_offset);
        let parts = ctx.host.attach_accessory(cart, Accessory::Bumper, at)?;
        let attached_tick = ctx.scheduler.now();
        if let Some(record) = ctx.registry.get_mut(cart) {
            record.bumper = Some(BumperState {
                uses_remaining: perks.shield_uses,
                damage_per_hit: perks.damage_per_hit,
                phase: BumperPhase::Arming,
                attached_tick,
                parts,
            });
        }
        let arming = ctx.tuning.bumper_arming_secs;
        ctx.after_secs(
            arming,
            Task::ArmBumper {
                cart,
                attached_tick,
            },
        );
        log::info!("{cart} bumper attached ({} uses)", perks.shield_uses);
    }

    Ok(())
}

/// Finish arming: register the combat check with the frame scheduler.
pub fn arm_bumper<H: Host>(ctx: &mut Ctx<'_, H>, cart: CartId, attached_tick: u64) {
    let Some(bumper) = ctx
        .registry
        .get_mut(cart)
        .and_then(|record| record.bumper.as_mut())
    else {
        log::debug!("arming for {cart} skipped: no bumper");
        return;
    };
    if bumper.attached_tick != attached_tick || bumper.is_active() {
        log::debug!("arming for {cart} skipped: stale timer");
        return;
    }
    let handle = ctx.scheduler.subscribe(cart);
    bumper.phase = BumperPhase::Active(handle);
    ctx.events.push(SimEvent::BumperArmed { cart });
    log::info!("{cart} bumper armed");
}

/// Remove `player`'s bumper. Idempotent.
pub fn detach_bumper<H: Host>(ctx: &mut Ctx<'_, H>, player: PlayerId) -> bool {
    match ctx.registry.cart_of(player) {
        Some(cart) => detach_bumper_of(ctx, cart),
        None => false,
    }
}

/// Disable collision, sever joints, deregister the combat check and
/// schedule disposal of the bumper parts.
pub fn detach_bumper_of<H: Host>(ctx: &mut Ctx<'_, H>, cart: CartId) -> bool {
    let Some(bumper) = ctx
        .registry
        .get_mut(cart)
        .and_then(|record| record.bumper.take())
    else {
        return false;
    };
    ctx.host.set_can_collide(&bumper.parts, false);
    ctx.host.break_joints(&bumper.parts);
    if let Some(handle) = bumper.frame_handle() {
        ctx.scheduler.unsubscribe(handle);
    }
    let delay = ctx.tuning.accessory_dispose_delay_secs;
    ctx.after_secs(delay, Task::DisposeParts { parts: bumper.parts });
    ctx.events.push(SimEvent::BumperDetached { cart });
    log::info!("{cart} bumper detached");
    true
}

/// Burn booster fuel. Running dry releases the booster.
pub fn consume_boost<H: Host>(ctx: &mut Ctx<'_, H>, player: PlayerId, amount: f64) {
    let Some(cart) = ctx.registry.cart_of(player) else {
        log::debug!("boost for {player} ignored: no live cart");
        return;
    };
    let Some(booster) = ctx
        .registry
        .get_mut(cart)
        .and_then(|record| record.booster.as_mut())
    else {
        log::debug!("boost for {cart} ignored: no booster");
        return;
    };
    booster.fuel_remaining = (booster.fuel_remaining - amount.max(0.0)).max(0.0);
    if booster.fuel_remaining > 0.0 {
        return;
    }
    if release_booster(ctx, cart) {
        ctx.events.push(SimEvent::BoosterDepleted { cart });
        log::info!("{cart} booster depleted");
    }
}

/// Physically release the booster and schedule its disposal.
fn release_booster<H: Host>(ctx: &mut Ctx<'_, H>, cart: CartId) -> bool {
    let Some(booster) = ctx
        .registry
        .get_mut(cart)
        .and_then(|record| record.booster.take())
    else {
        return false;
    };
    ctx.host.break_joints(&booster.parts);
    let delay = ctx.tuning.accessory_dispose_delay_secs;
    ctx.after_secs(delay, Task::DisposeParts { parts: booster.parts });
    true
}
