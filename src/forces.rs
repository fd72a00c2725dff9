use std::fmt::Debug;

use crate::dynamics::Body;
use crate::math::{consts::STANDARD_GRAVITY, Vec3};

/// Something that pushes on bodies every step, such as gravity
pub trait ForceGenerator: Debug + Send {
    /// Adds this generator's force to the body's accumulator
    fn apply(&self, target: &mut Body);
}

/// Uniform gravitational field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gravity {
    pub acceleration: Vec3,
}

impl Gravity {
    #[inline]
    pub fn new(acceleration: Vec3) -> Self {
        Self { acceleration }
    }
}

impl Default for Gravity {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, -STANDARD_GRAVITY, 0.0))
    }
}

impl ForceGenerator for Gravity {
    fn apply(&self, target: &mut Body) {
        // Infinite mass times g is not a force
        if !target.is_static() {
            target.apply_force(self.acceleration * target.mass());
        }
    }
}

/// Drag proportional to velocity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearDrag {
    pub coefficient: f32,
}

impl LinearDrag {
    #[inline]
    pub fn new(coefficient: f32) -> Self {
        Self { coefficient }
    }
}

impl ForceGenerator for LinearDrag {
    fn apply(&self, target: &mut Body) {
        target.apply_force(target.velocity * -self.coefficient);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Transform;

    #[test]
    fn test_gravity_scales_with_mass() {
        let mut body = Body::at(Vec3::ZERO, 2.0).unwrap();
        Gravity::default().apply(&mut body);
        assert_eq!(body.force(), Vec3::new(0.0, -2.0 * STANDARD_GRAVITY, 0.0));
    }

    #[test]
    fn test_gravity_skips_static_bodies() {
        let mut body = Body::fixed(Transform::IDENTITY);
        Gravity::new(Vec3::new(1.0, 2.0, 3.0)).apply(&mut body);
        assert_eq!(body.force(), Vec3::ZERO);
    }

    #[test]
    fn test_linear_drag_opposes_velocity() {
        let mut body = Body::at(Vec3::ZERO, 1.0)
            .unwrap()
            .with_velocity(Vec3::new(2.0, 0.0, -4.0));
        LinearDrag::new(0.5).apply(&mut body);
        assert_eq!(body.force(), Vec3::new(-1.0, 0.0, 2.0));
    }
}
