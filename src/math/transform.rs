#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::quat::Quat;
use super::vec3::Vec3;

/// Position, rotation and scale of a body.
///
/// The fields are private so that every mutation goes through
/// [`translate`](Self::translate), [`rotate`](Self::rotate) or
/// [`scale`](Self::scale), all of which mark the transform dirty. Owners use
/// the flag to invalidate anything derived from the transform, such as
/// world-space vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Transform {
    position: Vec3,
    rotation: Quat,
    scaling: Vec3,
    dirty: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// Identity transform, marked dirty so that derived data is built once
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scaling: Vec3::ONE,
        dirty: true,
    };

    /// Creates a transform at `position` with no rotation and unit scale
    #[inline]
    pub const fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Sets the initial rotation (normalized)
    #[inline]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation.normalize();
        self.dirty = true;
        self
    }

    /// Sets the initial scale factors
    #[inline]
    pub fn with_scale(mut self, scaling: Vec3) -> Self {
        self.scaling = scaling;
        self.dirty = true;
        self
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    #[inline]
    pub fn scaling(&self) -> Vec3 {
        self.scaling
    }

    /// Moves the transform by `translation`
    #[inline]
    pub fn translate(&mut self, translation: Vec3) {
        self.position += translation;
        self.dirty = true;
    }

    /// Rotates by `angle` radians about `axis`, applied after the current
    /// rotation. The composed rotation is renormalized.
    pub fn rotate(&mut self, angle: f32, axis: Vec3) -> Result<()> {
        let increment = Quat::from_axis_angle(axis, angle)?;
        self.rotation = increment.hamilton(self.rotation).normalize();
        self.dirty = true;
        Ok(())
    }

    /// Multiplies the scale component-wise by `factors`
    #[inline]
    pub fn scale(&mut self, factors: Vec3) {
        self.scaling = self.scaling.component_mul(factors);
        self.dirty = true;
    }

    /// Maps a local-space point to world space: scale, then rotate, then
    /// translate.
    #[inline]
    pub fn apply_transform(&self, v: Vec3) -> Vec3 {
        self.rotation.rotate_vec(v.component_mul(self.scaling)) + self.position
    }

    /// Returns true if the transform changed since the flag was last cleared
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    #[inline]
    pub(crate) fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}
