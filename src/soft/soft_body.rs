use crate::dynamics::MassPoint;
use crate::error::{PhysicsError, Result};
use crate::math::consts::{PI, TAU};
use crate::math::Vec3;

use super::spring::{Connection, DampedSpring};

/// Unit cube corners, scaled by half the side length
const CUBE_CORNERS: [[f32; 3]; 8] = [
    [-1.0, -1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, 1.0, 1.0],
    [1.0, -1.0, -1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, -1.0],
    [1.0, 1.0, 1.0],
];

/// Corner pairs of the cube lattice
const CUBE_LINKS: [[usize; 2]; 22] = [
    // edges
    [0, 1],
    [0, 2],
    [0, 4],
    [7, 3],
    [7, 5],
    [7, 6],
    [1, 3],
    [1, 5],
    [4, 5],
    [4, 6],
    [2, 3],
    [2, 6],
    // face diagonals
    [0, 3],
    [1, 7],
    [5, 6],
    [4, 2],
    [1, 4],
    [2, 7],
    // space diagonals
    [0, 7],
    [1, 6],
    [2, 5],
    [3, 4],
];

/// A deformable body: point masses held together by elastic connections
#[derive(Debug)]
pub struct SoftBody {
    points: Vec<MassPoint>,
    connections: Vec<Box<dyn Connection>>,
}

impl SoftBody {
    /// Fails with [`PhysicsError::ShapeConstraint`] if a connection refers
    /// to a point that does not exist or joins a point to itself
    pub fn new(points: Vec<MassPoint>, connections: Vec<Box<dyn Connection>>) -> Result<Self> {
        for connection in &connections {
            let [a, b] = connection.endpoints();
            if a == b {
                return Err(PhysicsError::ShapeConstraint(format!(
                    "connection ({}, {}) joins a point to itself",
                    a, b
                )));
            }
            if a >= points.len() || b >= points.len() {
                return Err(PhysicsError::ShapeConstraint(format!(
                    "connection ({}, {}) out of range for {} points",
                    a,
                    b,
                    points.len()
                )));
            }
        }
        Ok(Self {
            points,
            connections,
        })
    }

    /// Two points `length` apart on the X axis, joined by one damped spring
    pub fn line(length: f32, mass_per_point: f32, stiffness: f32, damping: f32) -> Result<Self> {
        ensure_positive("length", length)?;
        let half = Vec3::new(length / 2.0, 0.0, 0.0);
        let points = vec![
            MassPoint::at(-half, mass_per_point)?,
            MassPoint::at(half, mass_per_point)?,
        ];
        let spring = DampedSpring::new(stiffness, damping, length, 0, 1)?;
        Self::new(points, vec![Box::new(spring)])
    }

    /// Eight corners of a cube centered on the origin, braced along its
    /// edges, face diagonals and space diagonals
    pub fn cube(side: f32, mass_per_point: f32, stiffness: f32, damping: f32) -> Result<Self> {
        ensure_positive("side", side)?;
        let points = CUBE_CORNERS
            .iter()
            .map(|&corner| MassPoint::at(Vec3::from(corner) * (side / 2.0), mass_per_point))
            .collect::<Result<Vec<_>>>()?;
        Self::braced(points, &CUBE_LINKS, stiffness, damping)
    }

    /// Points on latitude rings of a sphere centered on the origin, every
    /// pair joined by a damped spring.
    ///
    /// Rings are `2 * radius / detail` apart along Y and points on a ring
    /// are an arc of `PI` times that spacing apart. Each pole holds a single
    /// point.
    pub fn sphere(
        radius: f32,
        detail: usize,
        mass_per_point: f32,
        stiffness: f32,
        damping: f32,
    ) -> Result<Self> {
        ensure_positive("radius", radius)?;
        let detail = detail.max(1);
        let step = 2.0 * radius / detail as f32;
        let arc = PI * step;

        let mut points = Vec::new();
        for ring in 0..=detail {
            let y = -radius + ring as f32 * step;
            let ring_radius = (radius * radius - y * y).max(0.0).sqrt();
            if ring == 0 || ring == detail || ring_radius <= f32::EPSILON * radius {
                points.push(MassPoint::at(Vec3::new(0.0, y, 0.0), mass_per_point)?);
                continue;
            }

            // The tolerance keeps a full turn from yielding a duplicate point
            let count = (TAU * ring_radius / arc - 1e-3).ceil().max(1.0) as usize;
            let angle = arc / ring_radius;
            for i in 0..count {
                let theta = angle * i as f32;
                let position = Vec3::new(theta.sin() * ring_radius, y, theta.cos() * ring_radius);
                points.push(MassPoint::at(position, mass_per_point)?);
            }
        }

        let pairs: Vec<[usize; 2]> = (0..points.len())
            .flat_map(|i| (i + 1..points.len()).map(move |j| [i, j]))
            .collect();
        Self::braced(points, &pairs, stiffness, damping)
    }

    /// Joins point pairs with damped springs at their current distance
    fn braced(
        points: Vec<MassPoint>,
        pairs: &[[usize; 2]],
        stiffness: f32,
        damping: f32,
    ) -> Result<Self> {
        let connections = pairs
            .iter()
            .map(|&[i, j]| {
                let rest = points[i].position().distance(points[j].position());
                let spring = DampedSpring::new(stiffness, damping, rest, i, j)?;
                Ok(Box::new(spring) as Box<dyn Connection>)
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(points, connections)
    }

    /// Moves every point by `offset`
    pub fn with_offset(mut self, offset: Vec3) -> Self {
        for point in &mut self.points {
            point.transform_mut().translate(offset);
        }
        self
    }

    /// Sets the velocity of every point
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        for point in &mut self.points {
            point.velocity = velocity;
        }
        self
    }

    #[inline]
    pub fn points(&self) -> &[MassPoint] {
        &self.points
    }

    #[inline]
    pub fn points_mut(&mut self) -> &mut [MassPoint] {
        &mut self.points
    }

    #[inline]
    pub fn connections(&self) -> &[Box<dyn Connection>] {
        &self.connections
    }

    /// Mass-weighted mean position of the points
    pub fn center_of_mass(&self) -> Vec3 {
        let (weighted, total) = self
            .points
            .iter()
            .filter(|p| !p.is_static())
            .fold((Vec3::ZERO, 0.0), |(sum, mass), p| {
                (sum + p.position() * p.mass(), mass + p.mass())
            });
        if total > 0.0 {
            weighted / total
        } else {
            Vec3::ZERO
        }
    }

    /// Applies every connection, then integrates every point
    pub fn update(&mut self, dt: f32) -> Result<()> {
        for connection in &self.connections {
            connection.apply(&mut self.points)?;
        }
        for point in &mut self.points {
            point.update(dt)?;
        }
        Ok(())
    }

    pub fn kinetic_energy(&self) -> f32 {
        self.points.iter().map(MassPoint::kinetic_energy).sum()
    }
}

fn ensure_positive(what: &'static str, value: f32) -> Result<f32> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(PhysicsError::invalid(what, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soft::Spring;
    use approx::assert_relative_eq;

    #[test]
    fn test_line() {
        let line = SoftBody::line(2.0, 1.0, 10.0, 0.5).unwrap();
        assert_eq!(line.points().len(), 2);
        assert_eq!(line.connections().len(), 1);
        assert_eq!(line.points()[0].position(), Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(line.points()[1].position(), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_cube_rest_lengths() {
        let mut cube = SoftBody::cube(2.0, 1.0, 100.0, 1.0).unwrap();
        assert_eq!(cube.points().len(), 8);
        assert_eq!(cube.connections().len(), 22);

        // At rest every spring is relaxed, so nothing moves
        cube.update(0.01).unwrap();
        for (point, corner) in cube.points().iter().zip(CUBE_CORNERS) {
            let expected = Vec3::from(corner);
            assert_relative_eq!(point.position().x, expected.x, epsilon = 1e-6);
            assert_relative_eq!(point.position().y, expected.y, epsilon = 1e-6);
            assert_relative_eq!(point.position().z, expected.z, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_sphere_points_lie_on_surface() {
        let sphere = SoftBody::sphere(1.0, 4, 0.1, 10.0, 0.1).unwrap();
        let n = sphere.points().len();
        assert!(n > 2);
        assert_eq!(sphere.connections().len(), n * (n - 1) / 2);
        for point in sphere.points() {
            assert_relative_eq!(point.position().length(), 1.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_stretched_line_contracts() {
        let points = vec![
            MassPoint::at(Vec3::new(-1.0, 0.0, 0.0), 1.0).unwrap(),
            MassPoint::at(Vec3::new(1.0, 0.0, 0.0), 1.0).unwrap(),
        ];
        let spring = Spring::new(5.0, 1.0, 0, 1).unwrap();
        let mut body = SoftBody::new(points, vec![Box::new(spring)]).unwrap();

        body.update(0.01).unwrap();
        assert!(body.points()[0].velocity.x > 0.0);
        assert!(body.points()[1].velocity.x < 0.0);
        assert_relative_eq!(body.center_of_mass().x, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_connection_out_of_range() {
        let points = vec![MassPoint::at(Vec3::ZERO, 1.0).unwrap()];
        let spring = Spring::new(1.0, 1.0, 0, 1).unwrap();
        assert!(matches!(
            SoftBody::new(points, vec![Box::new(spring)]),
            Err(PhysicsError::ShapeConstraint(_))
        ));
    }

    #[test]
    fn test_self_connection() {
        let points = vec![
            MassPoint::at(Vec3::ZERO, 1.0).unwrap(),
            MassPoint::at(Vec3::X, 1.0).unwrap(),
        ];
        let spring = Spring::new(1.0, 1.0, 1, 1).unwrap();
        assert!(matches!(
            SoftBody::new(points, vec![Box::new(spring)]),
            Err(PhysicsError::ShapeConstraint(_))
        ));
    }

    #[test]
    fn test_degenerate_sizes() {
        assert!(matches!(
            SoftBody::line(0.0, 1.0, 1.0, 0.0),
            Err(PhysicsError::InvalidNumber { what: "length", .. })
        ));
        assert!(matches!(
            SoftBody::cube(0.0, 1.0, 1.0, 0.0),
            Err(PhysicsError::InvalidNumber { what: "side", .. })
        ));
        assert!(matches!(
            SoftBody::cube(-1.0, 1.0, 1.0, 0.0),
            Err(PhysicsError::InvalidNumber { what: "side", .. })
        ));
        assert!(matches!(
            SoftBody::sphere(f32::NAN, 2, 1.0, 1.0, 0.0),
            Err(PhysicsError::InvalidNumber { what: "radius", .. })
        ));
    }

    #[test]
    fn test_invalid_spring_parameters() {
        assert!(matches!(
            SoftBody::line(1.0, 1.0, f32::NAN, 0.0),
            Err(PhysicsError::InvalidNumber { .. })
        ));
        assert!(matches!(
            SoftBody::cube(1.0, 0.0, 1.0, 0.0),
            Err(PhysicsError::InvalidNumber { what: "mass", .. })
        ));
    }
}
