//! Cart lifecycle: creation in the holding area, teardown and defeat.

use cartclash_core::commands::Customization;
use cartclash_core::enums::DefeatCause;
use cartclash_core::events::SimEvent;
use cartclash_core::types::{CartId, PartId, PlayerId};

use crate::error::SimError;
use crate::host::Host;
use crate::registry::CartRecord;
use crate::scheduler::{Observable, Task};

use super::{anti_stall, Ctx};

/// Build a cart for `player` at the next spawn slot.
///
/// Spawn exhaustion is a configuration error and is returned without
/// touching any state. On success the cart is registered, its anti-stall
/// detector is armed and physics ownership goes to the driver.
pub fn create_cart<H: Host>(
    ctx: &mut Ctx<'_, H>,
    player: PlayerId,
    kind: &str,
    customization: &Customization,
) -> Result<CartId, SimError> {
    if let Some(cart) = ctx.registry.cart_of(player) {
        return Err(SimError::PlayerAlreadyHasCart { player, cart });
    }

    let (slot, pose) = ctx.spawns.peek()?;
    let cart = CartId(*ctx.next_cart_id);
    let spawned = ctx.host.spawn_cart(cart, kind, pose)?;
    *ctx.next_cart_id += 1;

    let record = CartRecord::new(kind, player, spawned.root, spawned.parts, slot);
    ctx.registry.create(cart, record)?;

    anti_stall::arm(ctx, cart);

    ctx.host.apply_customization(cart, customization);
    ctx.host.set_network_owner(cart, player);

    ctx.spawns.advance();
    ctx.events.push(SimEvent::CartSpawned {
        cart,
        player,
        spawn_slot: slot,
    });
    log::info!("{cart} ({kind}) spawned for {player} at slot {slot}");
    Ok(cart)
}

/// Record a body part that finished streaming in after creation.
pub fn add_part<H: Host>(ctx: &mut Ctx<'_, H>, cart: CartId, part: PartId) -> bool {
    ctx.registry.add_part(cart, part)
}

/// Tear down `player`'s cart without a defeat. No-op if they have none.
pub fn destroy_cart<H: Host>(ctx: &mut Ctx<'_, H>, player: PlayerId) -> bool {
    let Some(cart) = ctx.registry.cart_of(player) else {
        log::debug!("destroy for {player} ignored: no live cart");
        return false;
    };
    teardown(ctx, cart)
}

/// Knock `player` out of the round and tear down their cart.
///
/// Idempotent: a player with no live cart has already been handled.
pub fn defeat<H: Host>(ctx: &mut Ctx<'_, H>, player: PlayerId, cause: DefeatCause) {
    let Some(cart) = ctx.registry.cart_of(player) else {
        log::debug!("defeat of {player} ({cause}) ignored: no live cart");
        return;
    };
    log::info!("{player} defeated: {cause}");
    ctx.host.notify_defeat(player, cause);
    ctx.events.push(SimEvent::Defeated { player, cause });
    teardown(ctx, cart);
}

/// Remove the record, then sever joints and schedule disposal.
///
/// The record goes first so that no combat frame after this call can resolve
/// a hit against the cart while its parts are still in the world.
pub fn teardown<H: Host>(ctx: &mut Ctx<'_, H>, cart: CartId) -> bool {
    let Some(record) = ctx.registry.remove(cart, ctx.scheduler) else {
        return false;
    };
    ctx.scheduler.unwatch(Observable::SeatOccupied(cart));

    let parts = record.owned_parts();
    ctx.host.break_joints(&parts);
    let delay = ctx.tuning.cart_dispose_delay_secs;
    ctx.after_secs(delay, Task::DisposeCart { cart, parts });

    ctx.events.push(SimEvent::CartDestroyed {
        cart,
        player: record.driver(),
    });
    log::info!("{cart} torn down");
    true
}

/// Final disposal after the teardown delay.
pub fn dispose_cart<H: Host>(ctx: &mut Ctx<'_, H>, cart: CartId, parts: &[PartId]) {
    ctx.host.dispose(parts);
    log::debug!("{cart} disposed ({} parts)", parts.len());
}
