use crate::dynamics::RigidBody;
use crate::geometry::Mesh;
use crate::math::Vec3;

/// Maximum iterations for GJK algorithm
const GJK_MAX_ITERATIONS: usize = 64;

/// Tolerance for GJK convergence
const GJK_TOLERANCE: f32 = 1e-6;

/// A convex body as seen by the narrow phase: world-space vertices, a
/// reference center and the mesh topology behind the vertices.
#[derive(Debug, Clone, Copy)]
pub struct Hull<'a> {
    pub vertices: &'a [Vec3],
    pub center: Vec3,
    pub mesh: &'a Mesh,
}

impl<'a> Hull<'a> {
    pub fn new(vertices: &'a [Vec3], center: Vec3, mesh: &'a Mesh) -> Self {
        Self {
            vertices,
            center,
            mesh,
        }
    }

    /// Hull of a rigid body, or `None` if its vertex cache is stale
    pub fn of(body: &'a RigidBody) -> Option<Self> {
        Some(Self::new(
            body.cached_vertices()?,
            body.position(),
            body.mesh().as_ref(),
        ))
    }

    /// Farthest vertex along `direction`; on ties the first one wins
    pub fn support(&self, direction: Vec3) -> Vec3 {
        let mut vertices = self.vertices.iter().copied();
        let Some(mut farthest) = vertices.next() else {
            return self.center;
        };
        let mut farthest_dot = direction.dot(farthest);
        for vertex in vertices {
            let dot = direction.dot(vertex);
            if dot > farthest_dot {
                farthest = vertex;
                farthest_dot = dot;
            }
        }
        farthest
    }
}

/// Support point of the Minkowski difference A - B along `direction`
#[inline]
pub fn support(a: &Hull<'_>, b: &Hull<'_>, direction: Vec3) -> Vec3 {
    a.support(direction) - b.support(-direction)
}

/// Result of a GJK query
#[derive(Debug, Clone)]
pub enum GjkResult {
    /// The Minkowski difference contains the origin
    Intersecting(Simplex),
    /// The hulls are disjoint, or no enclosing simplex was found
    Separated,
}

impl GjkResult {
    /// Returns true if shapes are intersecting
    pub fn is_intersecting(&self) -> bool {
        matches!(self, GjkResult::Intersecting(_))
    }
}

/// The evolving point set in Minkowski-difference space (1 to 4 points)
#[derive(Debug, Clone, Default)]
pub struct Simplex {
    points: [Vec3; 4],
    size: usize,
}

impl Simplex {
    /// Points currently in the simplex, oldest first
    pub fn points(&self) -> &[Vec3] {
        &self.points[..self.size]
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    fn push(&mut self, point: Vec3) {
        debug_assert!(self.size < 4);
        self.points[self.size] = point;
        self.size += 1;
    }

    fn contains(&self, point: Vec3) -> bool {
        self.points().contains(&point)
    }
}

/// What the simplex tells the search to do next
enum Evolution {
    /// The origin is enclosed
    Enclosed,
    /// Add the support point along this direction
    Extend(Vec3),
    /// Replace the point at this index with the support point along the
    /// direction
    Replace(usize, Vec3),
    /// The simplex collapsed and cannot make progress
    Degenerate,
}

/// Performs the GJK algorithm to detect collision between two hulls
pub fn gjk(a: &Hull<'_>, b: &Hull<'_>) -> GjkResult {
    let mut simplex = Simplex::default();

    // Initial direction from A to B
    let mut direction = b.center - a.center;
    if direction.is_near_zero(GJK_TOLERANCE) {
        direction = Vec3::X;
    }
    let mut replace = None;

    for _ in 0..GJK_MAX_ITERATIONS {
        let point = support(a, b, direction);

        // The difference does not reach past the origin along `direction`
        if point.dot(direction) < 0.0 || simplex.contains(point) {
            return GjkResult::Separated;
        }

        match replace.take() {
            Some(index) => simplex.points[index] = point,
            None => simplex.push(point),
        }

        match evolve(&simplex) {
            Evolution::Enclosed => return GjkResult::Intersecting(simplex),
            Evolution::Extend(next) => direction = next,
            Evolution::Replace(index, next) => {
                replace = Some(index);
                direction = next;
            }
            Evolution::Degenerate => return GjkResult::Separated,
        }
    }

    log::warn!(
        "GJK reached {} iterations without a verdict, reporting no collision",
        GJK_MAX_ITERATIONS
    );
    GjkResult::Separated
}

/// Simple intersection test using GJK
pub fn intersects(a: &Hull<'_>, b: &Hull<'_>) -> bool {
    gjk(a, b).is_intersecting()
}

fn evolve(simplex: &Simplex) -> Evolution {
    match *simplex.points() {
        [p] => point_case(p),
        [p0, p1] => line_case(p0, p1),
        [p0, p1, p2] => triangle_case(p0, p1, p2),
        [p0, p1, p2, p3] => tetrahedron_case([p0, p1, p2, p3]),
        _ => Evolution::Degenerate,
    }
}

fn point_case(p: Vec3) -> Evolution {
    if p.is_near_zero(GJK_TOLERANCE) {
        Evolution::Enclosed
    } else {
        Evolution::Extend(-p)
    }
}

/// `p1` is the newest point. The previous support check guarantees that
/// the segment straddles the origin along its own axis.
fn line_case(p0: Vec3, p1: Vec3) -> Evolution {
    let segment = p1 - p0;
    let towards_origin = segment.cross(-p1).cross(segment);
    if towards_origin.is_near_zero(GJK_TOLERANCE) {
        // Origin lies on the segment
        Evolution::Enclosed
    } else {
        Evolution::Extend(towards_origin)
    }
}

fn triangle_case(p0: Vec3, p1: Vec3, p2: Vec3) -> Evolution {
    let mut normal = (p1 - p0).cross(p2 - p0);

    if normal.is_near_zero(GJK_TOLERANCE) {
        // Collinear: search sideways from the line
        let axis = (p2 - p0).normalize_or_zero();
        let sideways = axis.cross(-p2).cross(axis);
        return if sideways.is_near_zero(GJK_TOLERANCE) {
            Evolution::Extend(axis.any_perpendicular())
        } else {
            Evolution::Extend(sideways)
        };
    }

    // Face the origin
    if normal.dot(p0) > 0.0 {
        normal = -normal;
    }

    let offset = normal.dot(p0) / normal.length();
    if offset.abs() <= GJK_TOLERANCE && triangle_contains_origin(p0, p1, p2, normal) {
        return Evolution::Enclosed;
    }

    Evolution::Extend(normal)
}

/// Assumes the origin lies in the triangle's plane
fn triangle_contains_origin(p0: Vec3, p1: Vec3, p2: Vec3, normal: Vec3) -> bool {
    let sides = [(p0, p1), (p1, p2), (p2, p0)].map(|(a, b)| (b - a).cross(-a).dot(normal));
    let tolerance = GJK_TOLERANCE * normal.length();
    sides.iter().all(|&s| s >= -tolerance) || sides.iter().all(|&s| s <= tolerance)
}

/// Tests the four faces of the tetrahedron. If the origin is outside, the
/// vertex opposite the nearest face it lies outside of is replaced.
fn tetrahedron_case(points: [Vec3; 4]) -> Evolution {
    let mut nearest: Option<(usize, Vec3, f32)> = None;

    for opposite in 0..4 {
        let [a, b, c] = face_of(points, opposite);
        let mut normal = (b - a).cross(c - a);
        if normal.dot(points[opposite] - a) > 0.0 {
            normal = -normal;
        }
        let Ok(normal) = normal.normalize() else {
            return Evolution::Degenerate;
        };
        if normal.dot(points[opposite] - a).abs() <= GJK_TOLERANCE {
            return Evolution::Degenerate;
        }

        // Positive when the origin is on the outer side of this face
        let distance = -normal.dot(a);
        if distance > GJK_TOLERANCE && nearest.map_or(true, |(_, _, d)| distance < d) {
            nearest = Some((opposite, normal, distance));
        }
    }

    match nearest {
        None => Evolution::Enclosed,
        Some((opposite, normal, _)) => Evolution::Replace(opposite, normal),
    }
}

fn face_of(points: [Vec3; 4], opposite: usize) -> [Vec3; 3] {
    match opposite {
        0 => [points[1], points[2], points[3]],
        1 => [points[0], points[2], points[3]],
        2 => [points[0], points[1], points[3]],
        _ => [points[0], points[1], points[2]],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube_at(center: Vec3, half: f32) -> (Vec<Vec3>, Vec3, Mesh) {
        let mesh = Mesh::cuboid(Vec3::splat(half));
        let vertices = mesh.vertices().iter().map(|&v| v + center).collect();
        (vertices, center, mesh)
    }

    fn collide(a: Vec3, b: Vec3) -> bool {
        let (va, ca, ma) = cube_at(a, 0.5);
        let (vb, cb, mb) = cube_at(b, 0.5);
        intersects(&Hull::new(&va, ca, &ma), &Hull::new(&vb, cb, &mb))
    }

    #[test]
    fn test_support_first_maximum_wins() {
        let (vertices, center, mesh) = cube_at(Vec3::ZERO, 1.0);
        let hull = Hull::new(&vertices, center, &mesh);
        // Four vertices share x = 1; the first in mesh order is returned
        assert_eq!(hull.support(Vec3::X), Vec3::new(1.0, -1.0, -1.0));
        assert_eq!(hull.support(Vec3::ONE), Vec3::ONE);
    }

    #[test]
    fn test_overlapping_cubes() {
        assert!(collide(Vec3::ZERO, Vec3::new(0.5, 0.0, 0.0)));
    }

    #[test]
    fn test_separated_cubes() {
        assert!(!collide(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_coincident_cubes() {
        assert!(collide(Vec3::ZERO, Vec3::ZERO));
    }

    #[test]
    fn test_diagonal_offsets() {
        assert!(collide(Vec3::ZERO, Vec3::new(0.5, 0.3, 0.2)));
        assert!(collide(Vec3::new(1.0, 1.0, 1.0), Vec3::new(0.3, 0.4, 0.6)));
        assert!(!collide(Vec3::ZERO, Vec3::new(1.5, 1.5, 0.0)));
        assert!(!collide(Vec3::ZERO, Vec3::new(-0.2, 3.0, -0.4)));
    }

    #[test]
    fn test_point_and_cube() {
        let (vertices, center, mesh) = cube_at(Vec3::ZERO, 1.0);
        let cube = Hull::new(&vertices, center, &mesh);
        let empty = Mesh::default();

        let inside = [Vec3::new(0.2, 0.1, -0.3)];
        assert!(intersects(&cube, &Hull::new(&inside, inside[0], &empty)));

        let outside = [Vec3::new(0.2, 3.0, -0.3)];
        assert!(!intersects(&cube, &Hull::new(&outside, outside[0], &empty)));
    }

    /// Unit cube turned 45 degrees about Z, centered at `center`
    fn turned_cube_at(center: Vec3) -> (Vec<Vec3>, Vec3, Mesh) {
        let mesh = Mesh::cuboid(Vec3::splat(0.5));
        let rotation =
            crate::math::Quat::from_axis_angle(Vec3::Z, std::f32::consts::FRAC_PI_4).unwrap();
        let transform = crate::math::Transform::from_position(center).with_rotation(rotation);
        let vertices = mesh
            .vertices()
            .iter()
            .map(|&v| transform.apply_transform(v))
            .collect();
        (vertices, center, mesh)
    }

    fn collide_turned(b: Vec3) -> bool {
        let (va, ca, ma) = cube_at(Vec3::ZERO, 0.5);
        let (vb, cb, mb) = turned_cube_at(b);
        intersects(&Hull::new(&va, ca, &ma), &Hull::new(&vb, cb, &mb))
    }

    #[test]
    fn test_rotated_cubes() {
        // The turned cube reaches 1/sqrt(2) from its center along X
        assert!(collide_turned(Vec3::new(1.1, 0.0, 0.0)));
        assert!(collide_turned(Vec3::new(0.0, -1.15, 0.3)));
        assert!(!collide_turned(Vec3::new(1.3, 0.0, 0.0)));
        assert!(!collide_turned(Vec3::new(0.0, -1.3, 0.3)));
    }

    #[test]
    fn test_rotated_cubes_with_overlapping_bounds() {
        // Bounding boxes overlap near the corner, the hulls do not
        assert!(!collide_turned(Vec3::new(1.1, 1.1, 0.0)));
        assert!(collide_turned(Vec3::new(0.75, 0.75, 0.0)));
    }

    #[test]
    fn test_simplex_is_reported() {
        let (va, ca, ma) = cube_at(Vec3::ZERO, 0.5);
        let (vb, cb, mb) = cube_at(Vec3::new(0.5, 0.3, 0.2), 0.5);
        match gjk(&Hull::new(&va, ca, &ma), &Hull::new(&vb, cb, &mb)) {
            GjkResult::Intersecting(simplex) => {
                assert!(!simplex.is_empty());
                assert!(simplex.len() <= 4);
            }
            GjkResult::Separated => panic!("expected intersection"),
        }
    }
}
