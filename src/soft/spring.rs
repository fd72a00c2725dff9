use std::fmt::Debug;

use crate::dynamics::MassPoint;
use crate::error::{PhysicsError, Result};
use crate::math::Vec3;

/// An elastic link between two points of a soft body.
///
/// Connections hold no state between steps: each call to
/// [`apply`](Connection::apply) reads the current positions and velocities
/// and adds forces to both endpoints.
pub trait Connection: Debug + Send {
    /// Indices of the two connected points
    fn endpoints(&self) -> [usize; 2];

    /// Adds this connection's forces to its endpoints
    fn apply(&self, points: &mut [MassPoint]) -> Result<()>;
}

/// Hooke spring with force `stiffness * (length - rest_length)` along the
/// line between its endpoints
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    stiffness: f32,
    rest_length: f32,
    endpoints: [usize; 2],
}

impl Spring {
    pub fn new(stiffness: f32, rest_length: f32, first: usize, second: usize) -> Result<Self> {
        if !stiffness.is_finite() {
            return Err(PhysicsError::invalid("stiffness", stiffness));
        }
        if !rest_length.is_finite() {
            return Err(PhysicsError::invalid("rest length", rest_length));
        }
        Ok(Self {
            stiffness,
            rest_length,
            endpoints: [first, second],
        })
    }

    #[inline]
    pub fn stiffness(&self) -> f32 {
        self.stiffness
    }

    #[inline]
    pub fn rest_length(&self) -> f32 {
        self.rest_length
    }

    /// Force on the first endpoint; the second receives its negation
    pub fn force(&self, first: &MassPoint, second: &MassPoint) -> Result<Vec3> {
        let displacement = second.position() - first.position();
        let stretch = displacement.length() - self.rest_length;
        Ok(displacement.normalize()? * (self.stiffness * stretch))
    }
}

impl Connection for Spring {
    fn endpoints(&self) -> [usize; 2] {
        self.endpoints
    }

    fn apply(&self, points: &mut [MassPoint]) -> Result<()> {
        let (first, second) = pair(points, self.endpoints)?;
        let force = self.force(first, second)?;
        apply_pair(points, self.endpoints, force);
        Ok(())
    }
}

/// A [`Spring`] that also resists the relative velocity of its endpoints
/// along the line between them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DampedSpring {
    spring: Spring,
    damping: f32,
}

impl DampedSpring {
    pub fn new(
        stiffness: f32,
        damping: f32,
        rest_length: f32,
        first: usize,
        second: usize,
    ) -> Result<Self> {
        if !damping.is_finite() {
            return Err(PhysicsError::invalid("damping", damping));
        }
        Ok(Self {
            spring: Spring::new(stiffness, rest_length, first, second)?,
            damping,
        })
    }

    #[inline]
    pub fn spring(&self) -> &Spring {
        &self.spring
    }

    #[inline]
    pub fn damping(&self) -> f32 {
        self.damping
    }

    /// Force on the first endpoint, elastic and damping terms combined
    pub fn force(&self, first: &MassPoint, second: &MassPoint) -> Result<Vec3> {
        let elastic = self.spring.force(first, second)?;
        let direction = (second.position() - first.position()).normalize()?;
        let closing = (second.velocity - first.velocity).dot(direction);
        Ok(elastic + direction * (closing * self.damping))
    }
}

impl Connection for DampedSpring {
    fn endpoints(&self) -> [usize; 2] {
        self.spring.endpoints
    }

    fn apply(&self, points: &mut [MassPoint]) -> Result<()> {
        let (first, second) = pair(points, self.spring.endpoints)?;
        let force = self.force(first, second)?;
        apply_pair(points, self.spring.endpoints, force);
        Ok(())
    }
}

fn pair(points: &[MassPoint], [a, b]: [usize; 2]) -> Result<(&MassPoint, &MassPoint)> {
    match (points.get(a), points.get(b)) {
        (Some(first), Some(second)) => Ok((first, second)),
        _ => Err(PhysicsError::ShapeConstraint(format!(
            "connection ({}, {}) out of range for {} points",
            a,
            b,
            points.len()
        ))),
    }
}

fn apply_pair(points: &mut [MassPoint], [a, b]: [usize; 2], force: Vec3) {
    points[a].apply_force(force);
    points[b].apply_force(-force);
}
