//! Services the core consumes from its host environment.
//!
//! The engine never touches geometry, avatars or replication directly; it
//! calls through these traits. `HeadlessHost` is the in-process
//! implementation used by tests and the server demo.

use glam::Vec3;

use cartclash_core::commands::Customization;
use cartclash_core::enums::{Accessory, DefeatCause};
use cartclash_core::types::{CartId, PartId, PlayerId, Transform};

use crate::error::HostError;

/// Parts of a freshly instantiated cart model.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnedCart {
    /// Primary part; its pose is the cart's pose.
    pub root: PartId,
    /// All parts, root first.
    pub parts: Vec<PartId>,
}

/// Nearest hit of a ray query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub part: PartId,
    pub point: Vec3,
}

/// Entity instantiation, joints and seat state.
pub trait EntityService {
    /// Clone a cart model of `kind` into the play area, anchored, at `at`.
    /// Returns once the root part is available.
    fn spawn_cart(&mut self, cart: CartId, kind: &str, at: Transform)
        -> Result<SpawnedCart, HostError>;

    /// Clone an accessory model at `at` and weld it to the cart's root.
    fn attach_accessory(
        &mut self,
        cart: CartId,
        accessory: Accessory,
        at: Transform,
    ) -> Result<Vec<PartId>, HostError>;

    fn apply_customization(&mut self, cart: CartId, customization: &Customization);

    /// Hand physics ownership of the cart to the player's client.
    fn set_network_owner(&mut self, cart: CartId, player: PlayerId);

    fn set_anchored(&mut self, parts: &[PartId], anchored: bool);

    fn set_can_collide(&mut self, parts: &[PartId], can_collide: bool);

    /// Sever every joint attached to the given parts.
    fn break_joints(&mut self, parts: &[PartId]);

    /// Destroy the parts. Unknown parts are ignored.
    fn dispose(&mut self, parts: &[PartId]);

    fn seat_occupant(&self, cart: CartId) -> Option<PlayerId>;

    /// Toggle the pre-round containment boundary.
    fn set_containment(&mut self, enabled: bool);
}

/// Read-only physics state and ray queries.
pub trait PhysicsQuery {
    fn pose(&self, part: PartId) -> Option<Transform>;

    fn velocity(&self, part: PartId) -> Option<Vec3>;

    /// Nearest collidable cart hull hit along `direction` (its length is the
    /// ray length), ignoring `exclude`.
    fn raycast(&self, origin: Vec3, direction: Vec3, exclude: &[PartId]) -> Option<RayHit>;
}

/// Player avatars: seating, movement flags, health.
pub trait AvatarService {
    fn avatar_exists(&self, player: PlayerId) -> bool;

    fn evict_from_seat(&mut self, player: PlayerId);

    fn seat_in(&mut self, player: PlayerId, cart: CartId);

    fn set_jump_enabled(&mut self, player: PlayerId, enabled: bool);

    fn set_head_collision_group(&mut self, player: PlayerId, group: &str);

    /// Apply damage and return the remaining health, or `None` if the player
    /// has no avatar.
    fn apply_damage(&mut self, player: PlayerId, amount: f64) -> Option<f64>;

    fn notify_defeat(&mut self, player: PlayerId, cause: DefeatCause);
}

/// Everything the engine needs from its environment.
pub trait Host: EntityService + PhysicsQuery + AvatarService {}

impl<T> Host for T where T: EntityService + PhysicsQuery + AvatarService {}
