//! Deterministic in-process host.
//!
//! Physical parts live in a hecs world; avatars and seats are plain tables.
//! Carts are single-hull models (a sphere for ray purposes) with a seat part.
//! Nothing moves on its own: tests and the demo place carts explicitly.

use std::collections::HashMap;

use glam::Vec3;
use hecs::{Entity, World};

use cartclash_core::commands::Customization;
use cartclash_core::enums::{Accessory, DefeatCause};
use cartclash_core::types::{CartId, PartId, PlayerId, Transform};

use crate::error::HostError;
use crate::host::{AvatarService, EntityService, PhysicsQuery, RayHit, SpawnedCart};

/// Cart models the headless host can build.
pub const DEFAULT_CART_KINDS: &[&str] = &["Classic", "Speedster", "Tank"];

/// Hull sphere radius used for ray queries.
pub const DEFAULT_HULL_RADIUS: f32 = 2.5;

/// Default avatar health.
pub const DEFAULT_HEALTH: f64 = 100.0;

/// Seat offset from the cart root.
const SEAT_OFFSET: Vec3 = Vec3::new(0.0, 0.8, 0.4);

/// Ownership and role of a part.
#[derive(Debug, Clone, Copy)]
struct Part {
    cart: CartId,
    hull: bool,
}

#[derive(Debug, Clone, Copy)]
struct Pose(Transform);

#[derive(Debug, Clone, Copy)]
struct LinearVelocity(Vec3);

#[derive(Debug, Clone, Copy)]
struct Anchored(bool);

#[derive(Debug, Clone, Copy)]
struct CanCollide(bool);

/// Welded to the cart root.
#[derive(Debug, Clone, Copy)]
struct Welded(bool);

/// Player avatar state.
#[derive(Debug, Clone)]
pub struct Avatar {
    pub health: f64,
    pub seated_in: Option<CartId>,
    pub jump_enabled: bool,
    pub head_collision_group: Option<String>,
}

impl Avatar {
    fn new(health: f64) -> Self {
        Self {
            health,
            seated_in: None,
            jump_enabled: true,
            head_collision_group: None,
        }
    }
}

pub struct HeadlessHost {
    world: World,
    kinds: Vec<String>,
    hull_radius: f32,
    roots: HashMap<CartId, Entity>,
    seats: HashMap<CartId, Option<PlayerId>>,
    owners: HashMap<CartId, PlayerId>,
    skins: HashMap<CartId, Customization>,
    avatars: HashMap<PlayerId, Avatar>,
    defeats: Vec<(PlayerId, DefeatCause)>,
    containment: bool,
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            kinds: DEFAULT_CART_KINDS.iter().map(|k| k.to_string()).collect(),
            hull_radius: DEFAULT_HULL_RADIUS,
            roots: HashMap::new(),
            seats: HashMap::new(),
            owners: HashMap::new(),
            skins: HashMap::new(),
            avatars: HashMap::new(),
            defeats: Vec::new(),
            containment: true,
        }
    }

    // --- Test / demo controls ---

    pub fn add_avatar(&mut self, player: PlayerId) {
        self.avatars.insert(player, Avatar::new(DEFAULT_HEALTH));
    }

    pub fn add_avatar_with_health(&mut self, player: PlayerId, health: f64) {
        self.avatars.insert(player, Avatar::new(health));
    }

    pub fn remove_avatar(&mut self, player: PlayerId) {
        self.evict_from_seat(player);
        self.avatars.remove(&player);
    }

    pub fn avatar(&self, player: PlayerId) -> Option<&Avatar> {
        self.avatars.get(&player)
    }

    pub fn health(&self, player: PlayerId) -> Option<f64> {
        self.avatars.get(&player).map(|a| a.health)
    }

    /// Player climbs out of whatever seat they occupy.
    pub fn leave_seat(&mut self, player: PlayerId) {
        self.evict_from_seat(player);
    }

    /// Move a cart (all of its parts keep their offsets from the root).
    pub fn place_cart(&mut self, cart: CartId, pose: Transform) {
        let Some(root_pose) = self.root_pose(cart) else {
            return;
        };
        let delta = pose.rotation * root_pose.rotation.inverse();
        for (_entity, (part, Pose(current))) in self.world.query_mut::<(&Part, &mut Pose)>() {
            if part.cart != cart {
                continue;
            }
            let local = current.position - root_pose.position;
            current.position = pose.position + delta * local;
            current.rotation = delta * current.rotation;
        }
    }

    pub fn set_cart_velocity(&mut self, cart: CartId, velocity: Vec3) {
        if let Some(&root) = self.roots.get(&cart) {
            if let Ok(mut v) = self.world.get::<&mut LinearVelocity>(root) {
                v.0 = velocity;
            }
        }
    }

    pub fn root_pose(&self, cart: CartId) -> Option<Transform> {
        let root = *self.roots.get(&cart)?;
        self.world.get::<&Pose>(root).ok().map(|p| p.0)
    }

    pub fn is_anchored(&self, part: PartId) -> Option<bool> {
        let entity = Entity::from_bits(part.0)?;
        self.world.get::<&Anchored>(entity).ok().map(|a| a.0)
    }

    pub fn is_welded(&self, part: PartId) -> Option<bool> {
        let entity = Entity::from_bits(part.0)?;
        self.world.get::<&Welded>(entity).ok().map(|w| w.0)
    }

    pub fn can_collide(&self, part: PartId) -> Option<bool> {
        let entity = Entity::from_bits(part.0)?;
        self.world.get::<&CanCollide>(entity).ok().map(|c| c.0)
    }

    pub fn part_exists(&self, part: PartId) -> bool {
        Entity::from_bits(part.0).is_some_and(|e| self.world.contains(e))
    }

    /// Number of live parts belonging to `cart`.
    pub fn part_count(&self, cart: CartId) -> usize {
        self.world
            .query::<&Part>()
            .iter()
            .filter(|(_, part)| part.cart == cart)
            .count()
    }

    pub fn network_owner(&self, cart: CartId) -> Option<PlayerId> {
        self.owners.get(&cart).copied()
    }

    pub fn customization(&self, cart: CartId) -> Option<&Customization> {
        self.skins.get(&cart)
    }

    pub fn defeats(&self) -> &[(PlayerId, DefeatCause)] {
        &self.defeats
    }

    pub fn containment(&self) -> bool {
        self.containment
    }

    fn spawn_part(&mut self, cart: CartId, pose: Transform, hull: bool) -> Entity {
        self.world.spawn((
            Part { cart, hull },
            Pose(pose),
            LinearVelocity(Vec3::ZERO),
            Anchored(true),
            CanCollide(true),
            Welded(true),
        ))
    }

    fn entities(parts: &[PartId]) -> impl Iterator<Item = Entity> + '_ {
        parts.iter().filter_map(|p| Entity::from_bits(p.0))
    }
}

fn part_id(entity: Entity) -> PartId {
    PartId(entity.to_bits().get())
}

/// Distance along a unit ray to the first intersection with a sphere, if the
/// ray starts outside it and reaches it within `max_dist`.
fn ray_sphere(origin: Vec3, dir: Vec3, max_dist: f32, center: Vec3, radius: f32) -> Option<f32> {
    let m = origin - center;
    let c = m.length_squared() - radius * radius;
    if c <= 0.0 {
        return None;
    }
    let b = m.dot(dir);
    if b > 0.0 {
        return None;
    }
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    (t <= max_dist).then_some(t)
}

impl EntityService for HeadlessHost {
    fn spawn_cart(
        &mut self,
        cart: CartId,
        kind: &str,
        at: Transform,
    ) -> Result<SpawnedCart, HostError> {
        if !self.kinds.iter().any(|k| k == kind) {
            return Err(HostError::UnknownCartKind(kind.to_string()));
        }
        let root = self.spawn_part(cart, at, true);
        let seat = self.spawn_part(cart, at.offset(SEAT_OFFSET), false);
        self.roots.insert(cart, root);
        self.seats.insert(cart, None);
        Ok(SpawnedCart {
            root: part_id(root),
            parts: vec![part_id(root), part_id(seat)],
        })
    }

    fn attach_accessory(
        &mut self,
        cart: CartId,
        _accessory: Accessory,
        at: Transform,
    ) -> Result<Vec<PartId>, HostError> {
        let root = *self.roots.get(&cart).ok_or(HostError::UnknownCart(cart))?;
        let anchored = self
            .world
            .get::<&Anchored>(root)
            .map(|a| a.0)
            .map_err(|_| HostError::UnknownCart(cart))?;
        let entity = self.spawn_part(cart, at, false);
        if let Ok(mut a) = self.world.get::<&mut Anchored>(entity) {
            a.0 = anchored;
        }
        Ok(vec![part_id(entity)])
    }

    fn apply_customization(&mut self, cart: CartId, customization: &Customization) {
        self.skins.insert(cart, customization.clone());
    }

    fn set_network_owner(&mut self, cart: CartId, player: PlayerId) {
        self.owners.insert(cart, player);
    }

    fn set_anchored(&mut self, parts: &[PartId], anchored: bool) {
        for entity in Self::entities(parts) {
            if let Ok(mut a) = self.world.get::<&mut Anchored>(entity) {
                a.0 = anchored;
            }
        }
    }

    fn set_can_collide(&mut self, parts: &[PartId], can_collide: bool) {
        for entity in Self::entities(parts) {
            if let Ok(mut c) = self.world.get::<&mut CanCollide>(entity) {
                c.0 = can_collide;
            }
        }
    }

    fn break_joints(&mut self, parts: &[PartId]) {
        for entity in Self::entities(parts) {
            if let Ok(mut w) = self.world.get::<&mut Welded>(entity) {
                w.0 = false;
            }
        }
    }

    fn dispose(&mut self, parts: &[PartId]) {
        for entity in Self::entities(parts).collect::<Vec<_>>() {
            let _ = self.world.despawn(entity);
        }
        let gone: Vec<CartId> = self
            .roots
            .iter()
            .filter(|(_, root)| !self.world.contains(**root))
            .map(|(cart, _)| *cart)
            .collect();
        for cart in gone {
            self.roots.remove(&cart);
            if let Some(Some(player)) = self.seats.remove(&cart) {
                if let Some(avatar) = self.avatars.get_mut(&player) {
                    avatar.seated_in = None;
                }
            }
            self.owners.remove(&cart);
            self.skins.remove(&cart);
        }
    }

    fn seat_occupant(&self, cart: CartId) -> Option<PlayerId> {
        self.seats.get(&cart).copied().flatten()
    }

    fn set_containment(&mut self, enabled: bool) {
        self.containment = enabled;
    }
}

impl PhysicsQuery for HeadlessHost {
    fn pose(&self, part: PartId) -> Option<Transform> {
        let entity = Entity::from_bits(part.0)?;
        self.world.get::<&Pose>(entity).ok().map(|p| p.0)
    }

    fn velocity(&self, part: PartId) -> Option<Vec3> {
        let entity = Entity::from_bits(part.0)?;
        self.world.get::<&LinearVelocity>(entity).ok().map(|v| v.0)
    }

    fn raycast(&self, origin: Vec3, direction: Vec3, exclude: &[PartId]) -> Option<RayHit> {
        let max_dist = direction.length();
        let dir = direction.try_normalize()?;
        let mut best: Option<(f32, PartId)> = None;

        let mut query = self.world.query::<(&Part, &Pose, &CanCollide)>();
        for (entity, (part, pose, collide)) in query.iter() {
            let id = part_id(entity);
            if !part.hull || !collide.0 || exclude.contains(&id) {
                continue;
            }
            let Some(t) = ray_sphere(origin, dir, max_dist, pose.0.position, self.hull_radius)
            else {
                continue;
            };
            if best.is_none_or(|(best_t, _)| t < best_t) {
                best = Some((t, id));
            }
        }

        best.map(|(t, part)| RayHit {
            part,
            point: origin + dir * t,
        })
    }
}

impl AvatarService for HeadlessHost {
    fn avatar_exists(&self, player: PlayerId) -> bool {
        self.avatars.contains_key(&player)
    }

    fn evict_from_seat(&mut self, player: PlayerId) {
        let Some(avatar) = self.avatars.get_mut(&player) else {
            return;
        };
        if let Some(cart) = avatar.seated_in.take() {
            if let Some(seat) = self.seats.get_mut(&cart) {
                *seat = None;
            }
        }
    }

    fn seat_in(&mut self, player: PlayerId, cart: CartId) {
        if !self.avatars.contains_key(&player) {
            return;
        }
        let Some(seat) = self.seats.get_mut(&cart) else {
            return;
        };
        if seat.is_some_and(|occupant| occupant != player) {
            return;
        }
        *seat = Some(player);
        if let Some(avatar) = self.avatars.get_mut(&player) {
            avatar.seated_in = Some(cart);
        }
    }

    fn set_jump_enabled(&mut self, player: PlayerId, enabled: bool) {
        if let Some(avatar) = self.avatars.get_mut(&player) {
            avatar.jump_enabled = enabled;
        }
    }

    fn set_head_collision_group(&mut self, player: PlayerId, group: &str) {
        if let Some(avatar) = self.avatars.get_mut(&player) {
            avatar.head_collision_group = Some(group.to_string());
        }
    }

    fn apply_damage(&mut self, player: PlayerId, amount: f64) -> Option<f64> {
        let avatar = self.avatars.get_mut(&player)?;
        avatar.health -= amount;
        Some(avatar.health)
    }

    fn notify_defeat(&mut self, player: PlayerId, cause: DefeatCause) {
        self.defeats.push((player, cause));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host_with_cart(cart: CartId, at: Vec3) -> (HeadlessHost, SpawnedCart) {
        let mut host = HeadlessHost::new();
        let spawned = host.spawn_cart(cart, "Classic", Transform::at(at)).unwrap();
        (host, spawned)
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let mut host = HeadlessHost::new();
        let err = host
            .spawn_cart(CartId(1), "Hovercraft", Transform::IDENTITY)
            .unwrap_err();
        assert!(matches!(err, HostError::UnknownCartKind(k) if k == "Hovercraft"));
    }

    #[test]
    fn test_raycast_hits_nearest_hull() {
        let (mut host, near) = host_with_cart(CartId(1), Vec3::new(0.0, 0.0, -6.0));
        let far = host
            .spawn_cart(CartId(2), "Classic", Transform::at(Vec3::new(0.0, 0.0, -14.0)))
            .unwrap();

        let hit = host
            .raycast(Vec3::ZERO, Vec3::new(0.0, 0.0, -20.0), &[])
            .unwrap();
        assert_eq!(hit.part, near.root);
        assert!((hit.point.z + 3.5).abs() < 1e-4);

        let hit = host
            .raycast(Vec3::ZERO, Vec3::new(0.0, 0.0, -20.0), &[near.root])
            .unwrap();
        assert_eq!(hit.part, far.root);
    }

    #[test]
    fn test_raycast_respects_length_and_collision() {
        let (mut host, cart) = host_with_cart(CartId(1), Vec3::new(0.0, 0.0, -30.0));
        assert!(host
            .raycast(Vec3::ZERO, Vec3::new(0.0, 0.0, -20.0), &[])
            .is_none());

        host.place_cart(CartId(1), Transform::at(Vec3::new(0.0, 0.0, -10.0)));
        assert!(host
            .raycast(Vec3::ZERO, Vec3::new(0.0, 0.0, -20.0), &[])
            .is_some());

        host.set_can_collide(&[cart.root], false);
        assert!(host
            .raycast(Vec3::ZERO, Vec3::new(0.0, 0.0, -20.0), &[])
            .is_none());
    }

    #[test]
    fn test_ray_from_inside_hull_ignores_it() {
        let (host, _) = host_with_cart(CartId(1), Vec3::ZERO);
        assert!(host
            .raycast(Vec3::ZERO, Vec3::new(0.0, 0.0, -20.0), &[])
            .is_none());
    }

    #[test]
    fn test_seating_and_dispose() {
        let (mut host, cart) = host_with_cart(CartId(1), Vec3::ZERO);
        let player = PlayerId(1);
        host.add_avatar(player);
        host.seat_in(player, CartId(1));
        assert_eq!(host.seat_occupant(CartId(1)), Some(player));

        // A second avatar cannot take an occupied seat.
        host.add_avatar(PlayerId(2));
        host.seat_in(PlayerId(2), CartId(1));
        assert_eq!(host.seat_occupant(CartId(1)), Some(player));

        host.dispose(&cart.parts);
        assert_eq!(host.part_count(CartId(1)), 0);
        assert_eq!(host.seat_occupant(CartId(1)), None);
        assert_eq!(host.avatar(player).unwrap().seated_in, None);
    }

    #[test]
    fn test_accessory_inherits_anchoring() {
        let (mut host, cart) = host_with_cart(CartId(1), Vec3::ZERO);
        host.set_anchored(&cart.parts, false);
        let parts = host
            .attach_accessory(CartId(1), Accessory::Bumper, Transform::IDENTITY)
            .unwrap();
        assert_eq!(host.is_anchored(parts[0]), Some(false));
        assert_eq!(host.is_welded(parts[0]), Some(true));
    }

    #[test]
    fn test_place_cart_moves_all_parts() {
        let (mut host, cart) = host_with_cart(CartId(1), Vec3::ZERO);
        let seat_before = host.pose(cart.parts[1]).unwrap().position;
        host.place_cart(CartId(1), Transform::at(Vec3::new(5.0, 0.0, 0.0)));
        let seat_after = host.pose(cart.parts[1]).unwrap().position;
        assert!((seat_after - seat_before - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-5);
    }
}
