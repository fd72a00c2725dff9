use crate::error::{PhysicsError, Result};
use crate::math::{Transform, Vec3};

use super::integrator::{Derivative, IntegrationMethod};

/// Translational dynamics shared by every mass-bearing object.
///
/// A body with infinite mass is static: it ignores forces and never moves.
#[derive(Debug, Clone)]
pub struct Body {
    transform: Transform,
    /// Linear velocity
    pub velocity: Vec3,
    mass: f32,
    force: Vec3,
    /// Method used to advance position and velocity
    pub method: IntegrationMethod,
}

/// A point mass: a body without rotational state
pub type MassPoint = Body;

impl Body {
    /// Creates a body with the given mass.
    ///
    /// The mass must be positive; `f32::INFINITY` creates a static body.
    pub fn new(transform: Transform, mass: f32) -> Result<Self> {
        if mass.is_nan() || mass <= 0.0 {
            return Err(PhysicsError::invalid("mass", mass));
        }
        Ok(Self {
            transform,
            velocity: Vec3::ZERO,
            mass,
            force: Vec3::ZERO,
            method: IntegrationMethod::default(),
        })
    }

    /// Creates a static body
    pub fn fixed(transform: Transform) -> Self {
        Self {
            transform,
            velocity: Vec3::ZERO,
            mass: f32::INFINITY,
            force: Vec3::ZERO,
            method: IntegrationMethod::default(),
        }
    }

    /// Creates a point mass at `position`
    pub fn at(position: Vec3, mass: f32) -> Result<Self> {
        Self::new(Transform::from_position(position), mass)
    }

    /// Sets the initial velocity
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Sets the integration method
    pub fn with_method(mut self, method: IntegrationMethod) -> Self {
        self.method = method;
        self
    }

    #[inline]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Mutable access to the transform. The transform is marked dirty, as
    /// the caller may replace it outright.
    #[inline]
    pub fn transform_mut(&mut self) -> &mut Transform {
        self.transform.mark_dirty();
        &mut self.transform
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.transform.position()
    }

    /// Returns the mass (infinity for static bodies)
    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Returns the inverse mass (0 for static bodies)
    #[inline]
    pub fn inverse_mass(&self) -> f32 {
        if self.is_static() {
            0.0
        } else {
            1.0 / self.mass
        }
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.mass.is_infinite()
    }

    /// Force accumulated since the last update
    #[inline]
    pub fn force(&self) -> Vec3 {
        self.force
    }

    /// Adds a force to the accumulator; ignored by static bodies
    #[inline]
    pub fn apply_force(&mut self, force: Vec3) {
        if !self.is_static() {
            self.force += force;
        }
    }

    /// Advances position and velocity by `dt` under the accumulated force,
    /// then clears the accumulator.
    pub fn update(&mut self, dt: f32) -> Result<()> {
        if self.is_static() {
            self.force = Vec3::ZERO;
            return Ok(());
        }

        let acceleration = self.force / self.mass;
        let position = self.position();

        let dx: Derivative<'_, Vec3, 2> = &|_, state| state[1];
        let dv: Derivative<'_, Vec3, 2> = &|_, _| acceleration;
        let [next_position, next_velocity] =
            self.method
                .integrate(&[position, self.velocity], 0.0, dt, &[dx, dv]);

        if !next_position.is_finite() {
            return Err(PhysicsError::invalid("position", next_position.length()));
        }
        if !next_velocity.is_finite() {
            return Err(PhysicsError::invalid("velocity", next_velocity.length()));
        }

        let displacement = next_position - position;
        if displacement != Vec3::ZERO {
            self.transform.translate(displacement);
        }
        self.velocity = next_velocity;
        self.force = Vec3::ZERO;
        Ok(())
    }

    /// Translational kinetic energy, zero for static bodies
    pub fn kinetic_energy(&self) -> f32 {
        if self.is_static() {
            0.0
        } else {
            0.5 * self.mass * self.velocity.length_squared()
        }
    }
}
