#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::collision::{intersects, query_pairs, resolve_elastic, Contact, Hull, Proxy};
use crate::dynamics::{Body, MassPoint, RigidBody};
use crate::error::{PhysicsError, Result};
use crate::forces::{ForceGenerator, Gravity};
use crate::geometry::Aabb;
use crate::math::Vec3;
use crate::soft::SoftBody;

/// Configuration for the physics world
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WorldConfig {
    /// Simulated seconds per call to [`World::simulate`]
    pub time_step: f32,
    /// Whether rigid bodies are tested against each other
    pub detect_collisions: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            time_step: 1.0 / 60.0,
            detect_collisions: true,
        }
    }
}

impl WorldConfig {
    pub fn with_time_step(mut self, time_step: f32) -> Self {
        self.time_step = time_step;
        self
    }

    pub fn with_collisions(mut self, detect_collisions: bool) -> Self {
        self.detect_collisions = detect_collisions;
        self
    }
}

/// Handle to an entity registered in a [`World`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityHandle(u32);

impl EntityHandle {
    /// Returns the index of this handle
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Anything the world can simulate
#[derive(Debug)]
pub enum Entity {
    Rigid(RigidBody),
    Point(MassPoint),
    Soft(SoftBody),
}

impl Entity {
    /// Advances the entity by `dt`
    pub fn update(&mut self, dt: f32) -> Result<()> {
        match self {
            Entity::Rigid(body) => body.update(dt),
            Entity::Point(point) => point.update(dt),
            Entity::Soft(soft) => soft.update(dt),
        }
    }

    /// Visits every mass-bearing body of the entity
    pub fn for_each_body(&mut self, mut f: impl FnMut(&mut Body)) {
        match self {
            Entity::Rigid(body) => f(body.body_mut()),
            Entity::Point(point) => f(point),
            Entity::Soft(soft) => soft.points_mut().iter_mut().for_each(f),
        }
    }

    pub fn kinetic_energy(&self) -> f32 {
        match self {
            Entity::Rigid(body) => body.kinetic_energy(),
            Entity::Point(point) => point.kinetic_energy(),
            Entity::Soft(soft) => soft.kinetic_energy(),
        }
    }

    pub fn as_rigid_body(&self) -> Option<&RigidBody> {
        match self {
            Entity::Rigid(body) => Some(body),
            _ => None,
        }
    }

    pub fn as_mass_point(&self) -> Option<&MassPoint> {
        match self {
            Entity::Point(point) => Some(point),
            _ => None,
        }
    }

    pub fn as_soft_body(&self) -> Option<&SoftBody> {
        match self {
            Entity::Soft(soft) => Some(soft),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Entity::Rigid(_) => "rigid body",
            Entity::Point(_) => "mass point",
            Entity::Soft(_) => "soft body",
        }
    }
}

impl From<RigidBody> for Entity {
    fn from(body: RigidBody) -> Self {
        Entity::Rigid(body)
    }
}

impl From<MassPoint> for Entity {
    fn from(point: MassPoint) -> Self {
        Entity::Point(point)
    }
}

impl From<SoftBody> for Entity {
    fn from(soft: SoftBody) -> Self {
        Entity::Soft(soft)
    }
}

/// A collision detected during the last step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    pub first: EntityHandle,
    pub second: EntityHandle,
    pub contact: Contact,
    /// Whether the bodies were approaching and an impulse was applied
    pub resolved: bool,
}

/// The simulation: registered entities, force generators and the clock
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    entities: Vec<Entity>,
    generators: Vec<Box<dyn ForceGenerator>>,
    collisions: Vec<Collision>,
    /// Current simulation time
    time: f32,
    steps: u64,
}

impl Default for World {
    fn default() -> Self {
        Self::with_valid_config(WorldConfig::default())
    }
}

impl World {
    /// Creates an empty world.
    ///
    /// Fails with [`PhysicsError::InvalidNumber`] unless the time step is
    /// finite and positive.
    pub fn new(config: WorldConfig) -> Result<Self> {
        if !config.time_step.is_finite() || config.time_step <= 0.0 {
            return Err(PhysicsError::invalid("time step", config.time_step));
        }
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: WorldConfig) -> Self {
        Self {
            config,
            entities: Vec::new(),
            generators: Vec::new(),
            collisions: Vec::new(),
            time: 0.0,
            steps: 0,
        }
    }

    /// Adds a uniform gravity generator
    pub fn with_gravity(mut self, acceleration: Vec3) -> Self {
        self.add_force_generator(Gravity::new(acceleration));
        self
    }

    #[inline]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Registers an entity and returns its handle
    pub fn register(&mut self, entity: impl Into<Entity>) -> EntityHandle {
        let entity = entity.into();
        let handle = EntityHandle(self.entities.len() as u32);
        log::debug!("registered {} as {:?}", entity.kind(), handle);
        self.entities.push(entity);
        handle
    }

    /// Registers several entities, returning their handles in order
    pub fn register_all<E: Into<Entity>>(
        &mut self,
        entities: impl IntoIterator<Item = E>,
    ) -> Vec<EntityHandle> {
        entities.into_iter().map(|e| self.register(e)).collect()
    }

    /// Adds a force generator applied to every body after each update
    pub fn add_force_generator(&mut self, generator: impl ForceGenerator + 'static) {
        self.generators.push(Box::new(generator));
    }

    pub fn entity(&self, handle: EntityHandle) -> Option<&Entity> {
        self.entities.get(handle.index())
    }

    pub fn entity_mut(&mut self, handle: EntityHandle) -> Option<&mut Entity> {
        self.entities.get_mut(handle.index())
    }

    pub fn rigid_body(&self, handle: EntityHandle) -> Option<&RigidBody> {
        self.entity(handle)?.as_rigid_body()
    }

    pub fn rigid_body_mut(&mut self, handle: EntityHandle) -> Option<&mut RigidBody> {
        match self.entity_mut(handle)? {
            Entity::Rigid(body) => Some(body),
            _ => None,
        }
    }

    pub fn mass_point(&self, handle: EntityHandle) -> Option<&MassPoint> {
        self.entity(handle)?.as_mass_point()
    }

    pub fn mass_point_mut(&mut self, handle: EntityHandle) -> Option<&mut MassPoint> {
        match self.entity_mut(handle)? {
            Entity::Point(point) => Some(point),
            _ => None,
        }
    }

    pub fn soft_body(&self, handle: EntityHandle) -> Option<&SoftBody> {
        self.entity(handle)?.as_soft_body()
    }

    pub fn soft_body_mut(&mut self, handle: EntityHandle) -> Option<&mut SoftBody> {
        match self.entity_mut(handle)? {
            Entity::Soft(soft) => Some(soft),
            _ => None,
        }
    }

    /// Number of registered entities
    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Simulated seconds elapsed
    #[inline]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Number of completed steps
    #[inline]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Collisions detected during the last step
    #[inline]
    pub fn contacts(&self) -> &[Collision] {
        &self.collisions
    }

    /// Total kinetic energy of every entity
    pub fn kinetic_energy(&self) -> f32 {
        self.entities.iter().map(Entity::kinetic_energy).sum()
    }

    /// Advances the simulation by one time step.
    ///
    /// Every entity is updated in registration order and then receives the
    /// force generators' forces, which act on its next update. Colliding
    /// rigid bodies then receive elastic contact forces the same way.
    pub fn simulate(&mut self) -> Result<()> {
        let dt = self.config.time_step;
        log::trace!("step {} at t = {:.4}s", self.steps, self.time);

        let generators = &self.generators;
        for entity in &mut self.entities {
            entity.update(dt)?;
            entity.for_each_body(|body| {
                for generator in generators {
                    generator.apply(body);
                }
            });
        }
        log::trace!("integrated {} entities", self.entities.len());

        self.collisions.clear();
        if self.config.detect_collisions {
            self.resolve_collisions(dt)?;
        }

        self.time += dt;
        self.steps += 1;
        Ok(())
    }

    fn resolve_collisions(&mut self, dt: f32) -> Result<()> {
        // Entity index of each broad phase proxy
        let mut owners = Vec::new();
        let mut proxies = Vec::new();
        for (index, entity) in self.entities.iter_mut().enumerate() {
            if let Entity::Rigid(body) = entity {
                body.vertices();
                let aabb = body.aabb().unwrap_or(Aabb::EMPTY);
                proxies.push(Proxy::new(aabb, body.is_static()));
                owners.push(index);
            }
        }

        for (i, j) in query_pairs(&proxies) {
            let (first, second) = (owners[i], owners[j]);

            let contact = {
                let (Entity::Rigid(a), Entity::Rigid(b)) =
                    (&self.entities[first], &self.entities[second])
                else {
                    continue;
                };
                let (Some(hull_a), Some(hull_b)) = (Hull::of(a), Hull::of(b)) else {
                    continue;
                };
                if !intersects(&hull_a, &hull_b) {
                    continue;
                }
                Contact::between(&hull_a, &hull_b)
            };
            let Some(contact) = contact else {
                log::debug!(
                    "{:?} and {:?} overlap but neither mesh has faces; no contact",
                    EntityHandle(first as u32),
                    EntityHandle(second as u32)
                );
                continue;
            };

            // `first < second`, so both fit in disjoint halves
            let (head, tail) = self.entities.split_at_mut(second);
            let (Entity::Rigid(a), Entity::Rigid(b)) = (&mut head[first], &mut tail[0]) else {
                continue;
            };
            let resolved = resolve_elastic(a, b, &contact, dt)?;

            let collision = Collision {
                first: EntityHandle(first as u32),
                second: EntityHandle(second as u32),
                contact,
                resolved,
            };
            log::debug!(
                "contact between {:?} and {:?}: depth {:.4}, normal {:?}, resolved {}",
                collision.first,
                collision.second,
                contact.depth,
                contact.normal,
                resolved
            );
            self.collisions.push(collision);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forces::LinearDrag;
    use crate::math::Transform;
    use approx::assert_relative_eq;

    #[test]
    fn test_invalid_time_step() {
        for time_step in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                World::new(WorldConfig::default().with_time_step(time_step)),
                Err(PhysicsError::InvalidNumber { .. })
            ));
        }
    }

    #[test]
    fn test_register_and_access() {
        let mut world = World::default();
        assert!(world.is_empty());

        let cube = world.register(RigidBody::cube(1.0, 1.0).unwrap());
        let point = world.register(MassPoint::at(Vec3::ONE, 2.0).unwrap());
        let soft = world.register(SoftBody::line(1.0, 1.0, 1.0, 0.0).unwrap());

        assert_eq!(world.len(), 3);
        assert_eq!([cube.index(), point.index(), soft.index()], [0, 1, 2]);
        assert!(world.rigid_body(cube).is_some());
        assert!(world.rigid_body(point).is_none());
        assert_eq!(world.mass_point(point).unwrap().mass(), 2.0);
        assert_eq!(world.soft_body(soft).unwrap().points().len(), 2);
        assert!(world.entity(EntityHandle(7)).is_none());
    }

    #[test]
    fn test_register_all() {
        let mut world = World::default();
        let handles = world.register_all([
            MassPoint::at(Vec3::ZERO, 1.0).unwrap(),
            MassPoint::at(Vec3::X, 1.0).unwrap(),
        ]);
        assert_eq!(handles.len(), 2);
        assert_eq!(world.mass_point(handles[1]).unwrap().position(), Vec3::X);
    }

    #[test]
    fn test_clock() {
        let mut world = World::new(WorldConfig::default().with_time_step(0.25)).unwrap();
        for _ in 0..3 {
            world.simulate().unwrap();
        }
        assert_eq!(world.steps(), 3);
        assert_relative_eq!(world.time(), 0.75);
    }

    #[test]
    fn test_gravity_acts_from_the_next_update() {
        let dt = 0.1;
        let mut world = World::new(WorldConfig::default().with_time_step(dt))
            .unwrap()
            .with_gravity(Vec3::new(0.0, -10.0, 0.0));
        let point = world.register(MassPoint::at(Vec3::ZERO, 3.0).unwrap());

        world.simulate().unwrap();
        assert_eq!(world.mass_point(point).unwrap().velocity, Vec3::ZERO);

        for _ in 0..10 {
            world.simulate().unwrap();
        }
        let point = world.mass_point(point).unwrap();
        assert_relative_eq!(point.velocity.y, -10.0, epsilon = 1e-4);
        assert_relative_eq!(point.position().y, -5.0, epsilon = 1e-3);
    }

    #[test]
    fn test_drag_slows_down() {
        let mut world = World::default();
        world.add_force_generator(LinearDrag::new(1.0));
        let point = world.register(
            MassPoint::at(Vec3::ZERO, 1.0)
                .unwrap()
                .with_velocity(Vec3::new(4.0, 0.0, 0.0)),
        );
        for _ in 0..30 {
            world.simulate().unwrap();
        }
        let v = world.mass_point(point).unwrap().velocity.x;
        assert!(v > 0.0 && v < 4.0);
    }

    #[test]
    fn test_overlapping_bodies_report_contact() {
        let mut world = World::default();
        let a = world.register(RigidBody::cube(1.0, 1.0).unwrap());
        let b = world.register(
            RigidBody::cube(1.0, 1.0)
                .unwrap()
                .with_position(Vec3::new(0.5, 0.0, 0.0)),
        );
        world.simulate().unwrap();

        let contacts = world.contacts();
        assert_eq!(contacts.len(), 1);
        assert_eq!((contacts[0].first, contacts[0].second), (a, b));
        assert_relative_eq!(contacts[0].contact.normal.x, 1.0, epsilon = 1e-5);
        // At rest, nothing to resolve
        assert!(!contacts[0].resolved);
    }

    #[test]
    fn test_overlapping_point_clouds_are_skipped() {
        let corners = "v -0.5 -0.5 -0.5\nv 0.5 -0.5 -0.5\nv -0.5 0.5 -0.5\nv 0.5 0.5 -0.5\n\
                       v -0.5 -0.5 0.5\nv 0.5 -0.5 0.5\nv -0.5 0.5 0.5\nv 0.5 0.5 0.5\n";
        let mesh = std::sync::Arc::new(crate::geometry::Mesh::from_wavefront(corners).unwrap());
        let cloud = |x: f32| {
            RigidBody::new(
                Transform::from_position(Vec3::new(x, 0.0, 0.0)),
                1.0,
                crate::math::Mat3::from_diagonal(Vec3::ONE),
                mesh.clone(),
            )
            .unwrap()
        };

        let mut world = World::default();
        let a = world.register(cloud(0.0).with_velocity(Vec3::X));
        world.register(cloud(0.5));
        world.simulate().unwrap();

        assert!(world.contacts().is_empty());
        assert_eq!(world.rigid_body(a).unwrap().velocity(), Vec3::X);
    }

    #[test]
    fn test_static_pairs_never_collide() {
        let mut world = World::default();
        let mesh = std::sync::Arc::new(crate::geometry::Mesh::cuboid(Vec3::splat(1.0)));
        world.register(RigidBody::fixed(Transform::IDENTITY, mesh.clone()));
        world.register(RigidBody::fixed(Transform::IDENTITY, mesh));
        world.simulate().unwrap();
        assert!(world.contacts().is_empty());
    }

    #[test]
    fn test_collisions_disabled() {
        let mut world = World::new(WorldConfig::default().with_collisions(false)).unwrap();
        let a = world.register(
            RigidBody::cube(1.0, 1.0)
                .unwrap()
                .with_velocity(Vec3::new(1.0, 0.0, 0.0)),
        );
        world.register(
            RigidBody::cube(1.0, 1.0)
                .unwrap()
                .with_position(Vec3::new(0.5, 0.0, 0.0)),
        );
        world.simulate().unwrap();
        world.simulate().unwrap();

        assert!(world.contacts().is_empty());
        assert_eq!(world.rigid_body(a).unwrap().velocity(), Vec3::new(1.0, 0.0, 0.0));
    }
}
