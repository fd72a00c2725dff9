use std::sync::Arc;

use crate::error::{PhysicsError, Result};
use crate::geometry::{Aabb, Mesh};
use crate::math::{Mat3, Transform, Vec3};

use super::body::Body;
use super::integrator::Derivative;

/// Number of sides used for the prism approximating a disk
const DISK_SEGMENTS: usize = 16;

/// A rigid body: translational [`Body`] dynamics plus rotation about the
/// center of mass, and a mesh used for collision detection.
#[derive(Debug, Clone)]
pub struct RigidBody {
    body: Body,
    /// Body-frame inertia tensor
    inertia: Mat3,
    /// Body-frame inverse inertia tensor (zero for static bodies)
    inverse_inertia: Mat3,
    /// Angular velocity in world frame (radians per second)
    pub angular_velocity: Vec3,
    torque: Vec3,
    mesh: Arc<Mesh>,
    vertices: Vec<Vec3>,
    aabb: Aabb,
}

impl RigidBody {
    /// Creates a rigid body from its mass, body-frame inertia tensor and mesh.
    ///
    /// An infinite mass creates a static body whose inertia is ignored.
    /// Fails if the mass is not positive or the inertia tensor is singular.
    pub fn new(transform: Transform, mass: f32, inertia: Mat3, mesh: Arc<Mesh>) -> Result<Self> {
        let body = Body::new(transform, mass)?;
        let (inertia, inverse_inertia) = if body.is_static() {
            (Mat3::ZERO, Mat3::ZERO)
        } else {
            (inertia, inertia.inverse()?)
        };
        Ok(Self::from_parts(body, inertia, inverse_inertia, mesh))
    }

    /// Creates a static body
    pub fn fixed(transform: Transform, mesh: Arc<Mesh>) -> Self {
        Self::from_parts(Body::fixed(transform), Mat3::ZERO, Mat3::ZERO, mesh)
    }

    fn from_parts(body: Body, inertia: Mat3, inverse_inertia: Mat3, mesh: Arc<Mesh>) -> Self {
        let mut rigid = Self {
            body,
            inertia,
            inverse_inertia,
            angular_velocity: Vec3::ZERO,
            torque: Vec3::ZERO,
            mesh,
            vertices: Vec::new(),
            aabb: Aabb::EMPTY,
        };
        rigid.refresh_vertices();
        rigid
    }

    /// Solid cube of the given side length, centered on the origin
    pub fn cube(side: f32, mass: f32) -> Result<Self> {
        let moment = 2.0 * side * side * mass / 12.0;
        Self::new(
            Transform::IDENTITY,
            mass,
            Mat3::from_diagonal(Vec3::splat(moment)),
            Arc::new(Mesh::cuboid(Vec3::splat(side * 0.5))),
        )
    }

    /// Solid box with the given half-extents, centered on the origin
    pub fn cuboid(half_extents: Vec3, mass: f32) -> Result<Self> {
        let size = half_extents * 2.0;
        let (x2, y2, z2) = (size.x * size.x, size.y * size.y, size.z * size.z);
        let inertia = Mat3::from_diagonal(Vec3::new(y2 + z2, x2 + z2, x2 + y2) * (mass / 12.0));
        Self::new(
            Transform::IDENTITY,
            mass,
            inertia,
            Arc::new(Mesh::cuboid(half_extents)),
        )
    }

    /// Thin disk with its symmetry axis along Z
    pub fn disk(radius: f32, thickness: f32, mass: f32) -> Result<Self> {
        let r2 = radius * radius;
        let inertia =
            Mat3::from_diagonal(Vec3::new(r2 * mass / 4.0, r2 * mass / 4.0, r2 * mass / 2.0));
        Self::new(
            Transform::IDENTITY,
            mass,
            inertia,
            Arc::new(Mesh::cylinder(radius, thickness * 0.5, DISK_SEGMENTS)),
        )
    }

    /// Moves the body to `position`
    pub fn with_position(mut self, position: Vec3) -> Self {
        let offset = position - self.body.position();
        self.body.transform_mut().translate(offset);
        self
    }

    /// Sets the initial linear velocity
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.body.velocity = velocity;
        self
    }

    /// Sets the initial angular velocity
    pub fn with_angular_velocity(mut self, angular_velocity: Vec3) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    #[inline]
    pub fn body(&self) -> &Body {
        &self.body
    }

    #[inline]
    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.body.position()
    }

    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.body.velocity
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.body.is_static()
    }

    #[inline]
    pub fn inertia(&self) -> Mat3 {
        self.inertia
    }

    #[inline]
    pub fn inverse_inertia(&self) -> Mat3 {
        self.inverse_inertia
    }

    #[inline]
    pub fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }

    /// Torque accumulated since the last update
    #[inline]
    pub fn torque(&self) -> Vec3 {
        self.torque
    }

    /// Applies a force at the center of mass
    #[inline]
    pub fn apply_force(&mut self, force: Vec3) {
        self.body.apply_force(force);
    }

    /// Applies a torque; ignored by static bodies
    #[inline]
    pub fn apply_torque(&mut self, torque: Vec3) {
        if !self.is_static() {
            self.torque += torque;
        }
    }

    /// Applies a force at a world point, producing a torque about the center
    /// of mass
    pub fn apply_force_at_point(&mut self, force: Vec3, point: Vec3) {
        self.apply_force(force);
        self.apply_torque((point - self.position()).cross(force));
    }

    /// Gets the velocity of a world point attached to the body
    pub fn velocity_at_point(&self, point: Vec3) -> Vec3 {
        self.body.velocity + self.angular_velocity.cross(point - self.position())
    }

    /// Advances rotation, then translation, by `dt`.
    ///
    /// Euler's rotation equation is evaluated in the body frame, where the
    /// inertia tensor is constant.
    pub fn update(&mut self, dt: f32) -> Result<()> {
        if self.is_static() {
            self.torque = Vec3::ZERO;
            return self.body.update(dt);
        }

        let rotation = self.body.transform().rotation();
        let inertia = self.inertia;
        let inverse_inertia = self.inverse_inertia;
        let local_torque = rotation.inverse_rotate_vec(self.torque);
        let local_omega = rotation.inverse_rotate_vec(self.angular_velocity);

        let euler: Derivative<'_, Vec3, 1> =
            &|_, state| inverse_inertia * (local_torque - state[0].cross(inertia * state[0]));
        let [next_omega] = self
            .body
            .method
            .integrate(&[local_omega], 0.0, dt, &[euler]);

        let angular_velocity = rotation.rotate_vec(next_omega);
        if !angular_velocity.is_finite() {
            return Err(PhysicsError::invalid(
                "angular velocity",
                angular_velocity.length(),
            ));
        }
        self.angular_velocity = angular_velocity;

        // A zero angular velocity leaves the orientation unchanged
        let angle = angular_velocity.length() * dt;
        if angle != 0.0 {
            self.body
                .transform_mut()
                .rotate(angle, angular_velocity)?;
        }
        self.torque = Vec3::ZERO;

        self.body.update(dt)
    }

    /// World-space mesh vertices, recomputed only if the transform changed
    pub fn vertices(&mut self) -> &[Vec3] {
        if self.body.transform().is_dirty() {
            self.refresh_vertices();
        }
        &self.vertices
    }

    /// World-space vertices if the cache is current, `None` if the transform
    /// changed since the last refresh
    pub fn cached_vertices(&self) -> Option<&[Vec3]> {
        (!self.body.transform().is_dirty()).then_some(self.vertices.as_slice())
    }

    /// Bounding box of the cached vertices
    pub fn aabb(&self) -> Option<Aabb> {
        (!self.body.transform().is_dirty()).then_some(self.aabb)
    }

    /// Recomputes world-space vertices and the bounding box, then clears the
    /// transform's dirty flag
    pub fn refresh_vertices(&mut self) {
        let transform = *self.body.transform();
        self.vertices.clear();
        self.vertices.extend(
            self.mesh
                .vertices()
                .iter()
                .map(|&v| transform.apply_transform(v)),
        );
        self.aabb = Aabb::from_points(&self.vertices);
        self.body.transform_mut().clear_dirty();
    }

    /// Kinetic energy `½m|v|² + ½ωᵀIω`, with ω in the body frame
    pub fn kinetic_energy(&self) -> f32 {
        if self.is_static() {
            return 0.0;
        }
        let omega = self.body.transform().rotation().inverse_rotate_vec(self.angular_velocity);
        self.body.kinetic_energy() + 0.5 * omega.dot(self.inertia * omega)
    }
}
