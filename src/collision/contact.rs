use crate::dynamics::RigidBody;
use crate::error::{PhysicsError, Result};
use crate::math::Vec3;

use super::narrow_phase::{support, Hull};

/// Approximate contact between two colliding hulls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit contact normal, pointing from A towards B
    pub normal: Vec3,
    /// Penetration depth along the normal
    pub depth: f32,
    /// Contact point in world space
    pub point: Vec3,
}

impl Contact {
    /// Approximates the contact of two hulls already known to collide.
    ///
    /// Candidate directions are the normals spanned by the first two edges
    /// of every face of both meshes, in both orientations. The direction
    /// whose Minkowski-difference support point lies closest to the origin
    /// gives the normal, and that distance the depth. The contact point is
    /// the midpoint of the two hulls' support points along it.
    ///
    /// Returns `None` if neither mesh yields a usable direction.
    pub fn between(a: &Hull<'_>, b: &Hull<'_>) -> Option<Self> {
        let mut best: Option<(Vec3, f32)> = None;

        for hull in [a, b] {
            for direction in face_directions(hull) {
                for candidate in [direction, -direction] {
                    let distance = support(a, b, candidate).length();
                    if best.map_or(true, |(_, d)| distance < d) {
                        best = Some((candidate, distance));
                    }
                }
            }
        }

        let (direction, depth) = best?;
        let point = (a.support(direction) + b.support(-direction)) * 0.5;
        let normal = if direction.dot(b.center - a.center) < 0.0 {
            -direction
        } else {
            direction
        };

        Some(Self {
            normal,
            depth,
            point,
        })
    }
}

/// Resolves a contact with a perfectly elastic collision along its normal.
///
/// Nothing happens unless the bodies approach each other along the normal.
/// Two finite masses exchange their normal velocities as in a
/// one-dimensional elastic collision; against an infinite mass the finite
/// body's relative normal velocity is reflected. The velocity change is
/// delivered as the force `m * dv / dt` at the contact point, so it takes
/// effect on the bodies' next update.
///
/// Returns whether any force was applied.
pub fn resolve_elastic(
    a: &mut RigidBody,
    b: &mut RigidBody,
    contact: &Contact,
    dt: f32,
) -> Result<bool> {
    if !dt.is_finite() || dt <= 0.0 {
        return Err(PhysicsError::invalid("time step", dt));
    }

    let normal = contact.normal;
    let approach = (a.velocity() - b.velocity()).dot(normal);
    if approach <= 0.0 {
        return Ok(false);
    }

    let (delta_a, delta_b) = match (a.is_static(), b.is_static()) {
        (false, false) => {
            let (ma, mb) = (a.body().mass(), b.body().mass());
            let ua = a.velocity().dot(normal);
            let ub = b.velocity().dot(normal);
            let total = ma + mb;
            let va = ((ma - mb) * ua + 2.0 * mb * ub) / total;
            let vb = ((mb - ma) * ub + 2.0 * ma * ua) / total;
            (normal * (va - ua), normal * (vb - ub))
        }
        (false, true) => (normal * (-2.0 * approach), Vec3::ZERO),
        (true, false) => (Vec3::ZERO, normal * (2.0 * approach)),
        (true, true) => return Ok(false),
    };

    if !a.is_static() {
        a.apply_force_at_point(delta_a * (a.body().mass() / dt), contact.point);
    }
    if !b.is_static() {
        b.apply_force_at_point(delta_b * (b.body().mass() / dt), contact.point);
    }
    Ok(true)
}

/// Unit normals of each face, from its first two edges
fn face_directions<'a>(hull: &Hull<'a>) -> impl Iterator<Item = Vec3> + 'a {
    let Hull { vertices, mesh, .. } = *hull;
    let edge = move |[from, to]: [usize; 2]| -> Option<Vec3> {
        Some(*vertices.get(to)? - *vertices.get(from)?)
    };
    mesh.leading_edges()
        .filter_map(move |(first, second)| edge(first)?.cross(edge(second)?).normalize().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Mesh;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn cube_at(center: Vec3, half: f32) -> (Vec<Vec3>, Mesh) {
        let mesh = Mesh::cuboid(Vec3::splat(half));
        let vertices = mesh.vertices().iter().map(|&v| v + center).collect();
        (vertices, mesh)
    }

    #[test]
    fn test_overlap_along_x() {
        let (va, ma) = cube_at(Vec3::ZERO, 0.5);
        let (vb, mb) = cube_at(Vec3::new(0.5, 0.0, 0.0), 0.5);
        let a = Hull::new(&va, Vec3::ZERO, &ma);
        let b = Hull::new(&vb, Vec3::new(0.5, 0.0, 0.0), &mb);

        let contact = Contact::between(&a, &b).unwrap();
        assert_relative_eq!(contact.depth, 0.5, epsilon = 1e-6);
        assert_relative_eq!(contact.normal.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(contact.point.x, 0.25, epsilon = 1e-6);
    }

    #[test]
    fn test_normal_points_from_a_to_b() {
        let (va, ma) = cube_at(Vec3::ZERO, 0.5);
        let (vb, mb) = cube_at(Vec3::new(0.0, -0.8, 0.0), 0.5);
        let a = Hull::new(&va, Vec3::ZERO, &ma);
        let b = Hull::new(&vb, Vec3::new(0.0, -0.8, 0.0), &mb);

        let contact = Contact::between(&a, &b).unwrap();
        assert_relative_eq!(contact.depth, 0.2, epsilon = 1e-5);
        assert_relative_eq!(contact.normal.y, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_no_faces() {
        let empty = Mesh::default();
        let points = [Vec3::ZERO];
        let a = Hull::new(&points, Vec3::ZERO, &empty);
        assert_eq!(Contact::between(&a, &a), None);
    }

    fn head_on(normal: Vec3) -> Contact {
        Contact {
            normal,
            depth: 0.0,
            point: Vec3::ZERO,
        }
    }

    #[test]
    fn test_equal_masses_exchange_velocities() {
        let mut a = RigidBody::cube(1.0, 2.0)
            .unwrap()
            .with_velocity(Vec3::new(1.0, 0.0, 0.0));
        let mut b = RigidBody::cube(1.0, 2.0)
            .unwrap()
            .with_velocity(Vec3::new(-1.0, 0.0, 0.0));
        let dt = 0.1;

        assert!(resolve_elastic(&mut a, &mut b, &head_on(Vec3::X), dt).unwrap());
        // dv = -2 on A, +2 on B
        assert_relative_eq!(a.body().force().x, -40.0, epsilon = 1e-4);
        assert_relative_eq!(b.body().force().x, 40.0, epsilon = 1e-4);

        a.update(dt).unwrap();
        b.update(dt).unwrap();
        assert_relative_eq!(a.velocity().x, -1.0, epsilon = 1e-4);
        assert_relative_eq!(b.velocity().x, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_separating_bodies_are_left_alone() {
        let mut a = RigidBody::cube(1.0, 1.0)
            .unwrap()
            .with_velocity(Vec3::new(-1.0, 0.0, 0.0));
        let mut b = RigidBody::cube(1.0, 1.0).unwrap();

        assert!(!resolve_elastic(&mut a, &mut b, &head_on(Vec3::X), 0.1).unwrap());
        assert_eq!(a.body().force(), Vec3::ZERO);
        assert_eq!(b.body().force(), Vec3::ZERO);
    }

    #[test]
    fn test_reflect_off_static_body() {
        let mut ball = RigidBody::cube(1.0, 3.0)
            .unwrap()
            .with_velocity(Vec3::new(0.0, -2.0, 0.0));
        let mut floor = RigidBody::fixed(
            crate::math::Transform::IDENTITY,
            Arc::new(Mesh::cuboid(Vec3::splat(5.0))),
        );
        let dt = 0.05;

        assert!(resolve_elastic(&mut ball, &mut floor, &head_on(-Vec3::Y), dt).unwrap());
        ball.update(dt).unwrap();
        assert_relative_eq!(ball.velocity().y, 2.0, epsilon = 1e-4);
        assert_eq!(floor.velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_invalid_time_step() {
        let mut a = RigidBody::cube(1.0, 1.0).unwrap();
        let mut b = RigidBody::cube(1.0, 1.0).unwrap();
        assert!(matches!(
            resolve_elastic(&mut a, &mut b, &head_on(Vec3::X), 0.0),
            Err(PhysicsError::InvalidNumber { .. })
        ));
    }
}
