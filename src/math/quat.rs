use std::ops::{Mul, Neg};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::vec3::Vec3;

/// A quaternion representing a rotation in 3D space.
///
/// Stored as (x, y, z, w) where w is the scalar part.
/// Every constructor that produces a rotation normalizes its result.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(C)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    /// Identity quaternion (no rotation)
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Creates a new quaternion from components
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Creates a quaternion from a rotation axis and angle (in radians).
    ///
    /// The axis does not need to be unit length but must not be zero.
    #[inline]
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Result<Self> {
        let (s, c) = (angle * 0.5).sin_cos();
        let axis = axis.normalize()?;
        Ok(Self::new(axis.x * s, axis.y * s, axis.z * s, c))
    }

    /// The vector part (x, y, z)
    #[inline]
    pub fn vector(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Returns the squared length of the quaternion
    #[inline]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    /// Returns the length of the quaternion
    #[inline]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Returns a normalized quaternion, or the identity for a zero quaternion
    #[inline]
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len > 1e-10 {
            let inv_len = 1.0 / len;
            Self::new(
                self.x * inv_len,
                self.y * inv_len,
                self.z * inv_len,
                self.w * inv_len,
            )
        } else {
            Self::IDENTITY
        }
    }

    /// Returns the conjugate (inverse rotation for unit quaternions)
    #[inline]
    pub fn conjugate(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Dot product of two quaternions
    #[inline]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Hamilton product `self * other`: applies `other` first, then `self`
    #[inline]
    pub fn hamilton(self, other: Self) -> Self {
        Self::new(
            self.w * other.x + self.x * other.w + self.y * other.z - self.z * other.y,
            self.w * other.y - self.x * other.z + self.y * other.w + self.z * other.x,
            self.w * other.z + self.x * other.y - self.y * other.x + self.z * other.w,
            self.w * other.w - self.x * other.x - self.y * other.y - self.z * other.z,
        )
    }

    /// Rotates a vector by this quaternion.
    ///
    /// Expands `q v q*` as `2a(a·v) + v(w² - |a|²) + 2w(a × v)`, where `a` is
    /// the vector part.
    #[inline]
    pub fn rotate_vec(self, v: Vec3) -> Vec3 {
        let a = self.vector();
        a * (2.0 * a.dot(v)) + v * (self.w * self.w - a.length_squared())
            + a.cross(v) * (2.0 * self.w)
    }

    /// Inverse rotates a vector (rotates by conjugate)
    #[inline]
    pub fn inverse_rotate_vec(self, v: Vec3) -> Vec3 {
        self.conjugate().rotate_vec(v)
    }
}

impl Mul for Quat {
    type Output = Self;

    /// Quaternion multiplication (combines rotations)
    #[inline]
    fn mul(self, other: Self) -> Self {
        self.hamilton(other)
    }
}

impl Neg for Quat {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, -self.w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PhysicsError;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    const EPSILON: f32 = 1e-5;

    fn quat_approx_eq(a: Quat, b: Quat) -> bool {
        // Quaternions q and -q represent the same rotation
        a.dot(b).abs() > 1.0 - EPSILON
    }

    fn assert_vec3_eq(a: Vec3, b: Vec3) {
        assert_relative_eq!(a.x, b.x, epsilon = EPSILON);
        assert_relative_eq!(a.y, b.y, epsilon = EPSILON);
        assert_relative_eq!(a.z, b.z, epsilon = EPSILON);
    }

    #[test]
    fn test_identity() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_vec3_eq(Quat::IDENTITY.rotate_vec(v), v);
    }

    #[test]
    fn test_axis_angle() {
        // 90 degree rotation around Z axis
        let q = Quat::from_axis_angle(Vec3::Z, PI / 2.0).unwrap();
        assert_vec3_eq(q.rotate_vec(Vec3::X), Vec3::Y);

        // Axis is normalized on construction
        let scaled = Quat::from_axis_angle(Vec3::new(0.0, 0.0, 5.0), PI / 2.0).unwrap();
        assert!(quat_approx_eq(q, scaled));
        assert_relative_eq!(scaled.length(), 1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_zero_axis() {
        assert_eq!(
            Quat::from_axis_angle(Vec3::ZERO, 1.0),
            Err(PhysicsError::DegenerateVector)
        );
    }

    #[test]
    fn test_inverse_rotation() {
        let axis = Vec3::new(1.0, 1.0, 1.0);
        let q = Quat::from_axis_angle(axis, PI / 3.0).unwrap();
        let v = Vec3::new(1.0, 2.0, 3.0);

        let back = q.inverse_rotate_vec(q.rotate_vec(v));
        assert_vec3_eq(back, v);
    }

    #[test]
    fn test_hamilton_composition() {
        // Two 90 degree rotations around Z equal one 180 degree rotation
        let q1 = Quat::from_axis_angle(Vec3::Z, PI / 2.0).unwrap();
        let q180 = Quat::from_axis_angle(Vec3::Z, PI).unwrap();
        assert!(quat_approx_eq(q1 * q1, q180));

        // X then Z: x-axis is fixed by the first, then sent to Y
        let rx = Quat::from_axis_angle(Vec3::X, PI / 2.0).unwrap();
        let combined = q1.hamilton(rx);
        assert_vec3_eq(combined.rotate_vec(Vec3::X), Vec3::Y);
        assert_vec3_eq(combined.rotate_vec(Vec3::Y), Vec3::Z);
    }

    #[test]
    fn test_rotation_preserves_length() {
        let q = Quat::from_axis_angle(Vec3::new(0.3, -1.0, 2.0), 1.234).unwrap();
        let v = Vec3::new(-4.0, 0.5, 2.5);
        assert_relative_eq!(q.rotate_vec(v).length(), v.length(), epsilon = 1e-4);
    }

    #[test]
    fn test_rotate_vec_half_turn() {
        // 180 degree rotation around X flips Y and Z
        let q = Quat::from_axis_angle(Vec3::X, PI).unwrap();
        let rotated = q.rotate_vec(Vec3::new(0.0, 1.0, 1.0));
        assert_vec3_eq(rotated, Vec3::new(0.0, -1.0, -1.0));
    }

    #[test]
    fn test_normalize() {
        let n = Quat::new(1.0, 2.0, 3.0, 4.0).normalize();
        assert_relative_eq!(n.length(), 1.0, epsilon = EPSILON);
        assert_eq!(Quat::new(0.0, 0.0, 0.0, 0.0).normalize(), Quat::IDENTITY);
    }
}
