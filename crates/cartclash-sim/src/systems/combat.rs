//! Combat resolution: the per-frame ram probe fan for every armed bumper.
//!
//! Each attacker casts a fan of forward probes. The first hull each probe
//! meets is resolved back to its cart record. A hit lands unless the victim
//! is stunned or already tagged by this attacker. Landed hits stun and tag
//! the victim, damage the driver and cost the attacker one bumper use.
//! Lethal hits are collected and applied once the attacker's fan is done.

use glam::{Quat, Vec3};

use cartclash_core::enums::DefeatCause;
use cartclash_core::events::SimEvent;
use cartclash_core::types::{CartId, PlayerId, CART_FORWARD};

use crate::config::Tuning;
use crate::host::{Host, RayHit};
use crate::scheduler::Task;

use super::{lifecycle, perks, Ctx};

/// Probe yaw offsets in radians, left to right.
pub fn probe_angles(tuning: &Tuning) -> Vec<f32> {
    let half = tuning.probe_cone_half_angle_deg.to_radians();
    match tuning.probe_count {
        0 => Vec::new(),
        1 => vec![0.0],
        n => {
            let step = 2.0 * half / (n - 1) as f32;
            (0..n).map(|i| half - step * i as f32).collect()
        }
    }
}

/// Run one combat frame over every subscribed attacker, in subscription order.
pub fn run<H: Host>(ctx: &mut Ctx<'_, H>) {
    let angles = probe_angles(ctx.tuning);
    for (handle, cart) in ctx.scheduler.subscribers() {
        // An earlier attacker this frame may have ended this one.
        if !ctx.scheduler.is_subscribed(handle) {
            continue;
        }
        resolve_attacker(ctx, cart, &angles);
    }
}

/// What the attacker knows about itself at the start of its fan.
#[derive(Debug, Clone, Copy)]
struct Attacker {
    cart: CartId,
    player: PlayerId,
    position: Vec3,
    velocity: Vec3,
    damage_per_hit: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum HitOutcome {
    Ignored,
    Landed,
    Lethal(PlayerId),
}

fn resolve_attacker<H: Host>(ctx: &mut Ctx<'_, H>, cart: CartId, angles: &[f32]) {
    let Some(record) = ctx.registry.get(cart) else {
        return;
    };
    let Some(player) = record.driver() else {
        return;
    };
    let Some(damage_per_hit) = record
        .bumper
        .as_ref()
        .filter(|bumper| bumper.is_active())
        .map(|bumper| bumper.damage_per_hit)
    else {
        return;
    };
    let root = record.root();
    let exclude = record.owned_parts();

    let Some(pose) = ctx.host.pose(root) else {
        log::debug!("{cart} has no root pose; skipping its combat frame");
        return;
    };
    let attacker = Attacker {
        cart,
        player,
        position: pose.position,
        velocity: ctx.host.velocity(root).unwrap_or(Vec3::ZERO),
        damage_per_hit,
    };

    let mut lethal = Vec::new();
    let mut worn_out = false;
    for angle in angles {
        let direction =
            pose.rotation * Quat::from_rotation_y(*angle) * CART_FORWARD * ctx.tuning.probe_length;
        let Some(hit) = ctx.host.raycast(attacker.position, direction, &exclude) else {
            continue;
        };
        let Some(victim) = ctx.registry.owner_of_part(hit.part) else {
            continue;
        };

        match land_hit(ctx, &attacker, victim, hit) {
            HitOutcome::Ignored => continue,
            HitOutcome::Landed => {}
            HitOutcome::Lethal(player) => lethal.push(player),
        }

        if spend_bumper_use(ctx, cart) {
            worn_out = true;
            break;
        }
    }

    if worn_out {
        perks::detach_bumper_of(ctx, cart);
    }
    for victim in lethal {
        lifecycle::defeat(
            ctx,
            victim,
            DefeatCause::RammedBy {
                attacker: attacker.player,
            },
        );
    }
}

fn land_hit<H: Host>(
    ctx: &mut Ctx<'_, H>,
    attacker: &Attacker,
    victim_cart: CartId,
    hit: RayHit,
) -> HitOutcome {
    if victim_cart == attacker.cart {
        return HitOutcome::Ignored;
    }
    let Some(record) = ctx.registry.get_mut(victim_cart) else {
        return HitOutcome::Ignored;
    };
    let Some(victim) = record.driver() else {
        return HitOutcome::Ignored;
    };
    let combat = &mut record.combat;
    if combat.lost_control || combat.tagged_by == Some(attacker.player) {
        return HitOutcome::Ignored;
    }

    combat.lost_control = true;
    combat.tagged_by = Some(attacker.player);
    if let Some(previous) = combat.tag_expiry.take() {
        ctx.scheduler.cancel(previous);
    }
    let immunity = ctx.tuning.ticks(ctx.tuning.tag_immunity_secs);
    combat.tag_expiry = Some(ctx.scheduler.after(
        immunity,
        Task::ClearTag {
            victim: victim_cart,
            attacker: attacker.player,
        },
    ));
    let victim_root = record.root();

    let world_direction = (hit.point - attacker.position).normalize_or_zero();
    let local_direction = ctx
        .host
        .pose(victim_root)
        .map_or(world_direction, |pose| pose.to_local_direction(world_direction));
    ctx.events.push(SimEvent::Hit {
        victim,
        attacker: attacker.player,
        attacker_velocity: attacker.velocity,
        direction: local_direction * Vec3::from_array(ctx.tuning.hit_direction_weights),
        bonus_damage: attacker.damage_per_hit,
    });

    let amount = ctx.tuning.ram_damage(attacker.damage_per_hit);
    let health = ctx.host.apply_damage(victim, amount);
    log::debug!(
        "{} rammed {victim} for {amount} (health {health:?})",
        attacker.player
    );
    if let Some(health) = health {
        ctx.events.push(SimEvent::Damaged {
            victim,
            attacker: attacker.player,
            amount,
            health,
        });
        if health <= 0.0 {
            return HitOutcome::Lethal(victim);
        }
    }

    let stun = ctx.tuning.stun_secs;
    ctx.after_secs(
        stun,
        Task::ClearStun {
            victim: victim_cart,
        },
    );
    HitOutcome::Landed
}

/// Consume one bumper use. Returns true once the bumper is worn out.
fn spend_bumper_use<H: Host>(ctx: &mut Ctx<'_, H>, cart: CartId) -> bool {
    let Some(bumper) = ctx
        .registry
        .get_mut(cart)
        .and_then(|record| record.bumper.as_mut())
    else {
        return false;
    };
    bumper.uses_remaining = bumper.uses_remaining.saturating_sub(1);
    bumper.uses_remaining == 0
}

/// End tag immunity if `attacker` still holds the tag.
pub fn clear_tag<H: Host>(ctx: &mut Ctx<'_, H>, victim: CartId, attacker: PlayerId) {
    let Some(record) = ctx.registry.get_mut(victim) else {
        return;
    };
    if record.combat.tagged_by != Some(attacker) {
        log::debug!("tag clear on {victim} skipped: retagged since");
        return;
    }
    record.combat.tagged_by = None;
    record.combat.tag_expiry = None;
}

/// End the post-hit stun if the victim is still around.
pub fn clear_stun<H: Host>(ctx: &mut Ctx<'_, H>, victim: CartId) {
    if let Some(record) = ctx.registry.get_mut(victim) {
        record.combat.lost_control = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_fan_is_symmetric_left_to_right() {
        let angles = probe_angles(&Tuning::default());
        assert_eq!(angles.len(), 5);
        assert!((angles[0] - 17.5_f32.to_radians()).abs() < 1e-6);
        assert!(angles[2].abs() < 1e-6);
        assert!((angles[4] + 17.5_f32.to_radians()).abs() < 1e-6);
        assert!(angles.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_leftmost_probe_points_left_of_forward() {
        let angles = probe_angles(&Tuning::default());
        let left = Quat::from_rotation_y(angles[0]) * CART_FORWARD;
        assert!(left.x < 0.0);
        assert!(left.z < 0.0);
    }

    #[test]
    fn test_degenerate_fans() {
        let mut tuning = Tuning::default();
        tuning.probe_count = 1;
        assert_eq!(probe_angles(&tuning), vec![0.0]);
        tuning.probe_count = 0;
        assert!(probe_angles(&tuning).is_empty());
    }
}
