use std::collections::HashMap;

use crate::error::{PhysicsError, Result};
use crate::math::{consts::TAU, Vec3};

/// Polyhedral geometry of a rigid body in local space.
///
/// Edges are undirected and unique across the mesh. Each face is the ordered
/// loop of its edges, referenced by index into [`edges`](Self::edges).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    vertices: Vec<Vec3>,
    edges: Vec<[usize; 2]>,
    faces: Vec<Vec<usize>>,
}

impl Mesh {
    /// Builds a mesh from vertices and polygons given as vertex-index loops.
    ///
    /// Every polygon needs at least three vertices and every index must refer
    /// to an existing vertex.
    pub fn from_polygons(vertices: Vec<Vec3>, polygons: &[Vec<usize>]) -> Result<Self> {
        let mut edges: Vec<[usize; 2]> = Vec::new();
        let mut lookup: HashMap<(usize, usize), usize> = HashMap::new();
        let mut faces = Vec::with_capacity(polygons.len());

        for (face_index, polygon) in polygons.iter().enumerate() {
            if polygon.len() < 3 {
                return Err(PhysicsError::ShapeConstraint(format!(
                    "face {} has {} vertices, expected at least 3",
                    face_index,
                    polygon.len()
                )));
            }
            if let Some(&bad) = polygon.iter().find(|&&v| v >= vertices.len()) {
                return Err(PhysicsError::ShapeConstraint(format!(
                    "face {} references vertex {} of {}",
                    face_index,
                    bad,
                    vertices.len()
                )));
            }

            let face: Vec<usize> = (0..polygon.len())
                .map(|i| {
                    let a = polygon[i];
                    let b = polygon[(i + 1) % polygon.len()];
                    *lookup.entry((a.min(b), a.max(b))).or_insert_with(|| {
                        edges.push([a, b]);
                        edges.len() - 1
                    })
                })
                .collect();
            faces.push(face);
        }

        Ok(Self {
            vertices,
            edges,
            faces,
        })
    }

    /// Parses the vertex and face records of a Wavefront OBJ document.
    ///
    /// `v x y z` lines add vertices and `f i j k ...` lines add faces with
    /// 1-based indices; anything after a `/` in a face index is ignored, as
    /// are all other record types.
    pub fn from_wavefront(source: &str) -> Result<Self> {
        let mut vertices = Vec::new();
        let mut polygons = Vec::new();

        for (number, line) in source.lines().enumerate() {
            let mut words = line.split_whitespace();
            match words.next() {
                Some("v") => {
                    let coordinates = words
                        .take(3)
                        .map(|w| {
                            w.parse::<f32>()
                                .map_err(|_| PhysicsError::invalid("vertex coordinate", f32::NAN))
                        })
                        .collect::<Result<Vec<f32>>>()?;
                    match coordinates[..] {
                        [x, y, z] => vertices.push(Vec3::new(x, y, z)),
                        _ => {
                            return Err(PhysicsError::ShapeConstraint(format!(
                                "line {}: vertex needs 3 coordinates",
                                number + 1
                            )))
                        }
                    }
                }
                Some("f") => {
                    let polygon = words
                        .map(|w| parse_face_index(w, number + 1))
                        .collect::<Result<Vec<usize>>>()?;
                    polygons.push(polygon);
                }
                _ => {}
            }
        }

        log::debug!(
            "parsed wavefront mesh: {} vertices, {} faces",
            vertices.len(),
            polygons.len()
        );
        Self::from_polygons(vertices, &polygons)
    }

    /// Axis-aligned box centered on the origin
    pub fn cuboid(half_extents: Vec3) -> Self {
        let Vec3 { x, y, z } = half_extents;
        let vertices = vec![
            Vec3::new(-x, -y, -z),
            Vec3::new(x, -y, -z),
            Vec3::new(-x, y, -z),
            Vec3::new(x, y, -z),
            Vec3::new(-x, -y, z),
            Vec3::new(x, -y, z),
            Vec3::new(-x, y, z),
            Vec3::new(x, y, z),
        ];
        let polygons = [
            vec![0, 2, 3, 1],
            vec![4, 5, 7, 6],
            vec![0, 1, 5, 4],
            vec![2, 6, 7, 3],
            vec![0, 4, 6, 2],
            vec![1, 3, 7, 5],
        ];
        Self::with_valid_polygons(vertices, &polygons)
    }

    /// Prism with a regular `segments`-gon cross-section, axis along Z,
    /// centered on the origin. Fewer than 3 segments are raised to 3.
    pub fn cylinder(radius: f32, half_height: f32, segments: usize) -> Self {
        let n = segments.max(3);
        let ring = |z: f32| {
            (0..n).map(move |i| {
                let angle = TAU * i as f32 / n as f32;
                Vec3::new(radius * angle.cos(), radius * angle.sin(), z)
            })
        };
        let vertices: Vec<Vec3> = ring(-half_height).chain(ring(half_height)).collect();

        let mut polygons: Vec<Vec<usize>> = (0..n)
            .map(|i| {
                let j = (i + 1) % n;
                vec![i, j, n + j, n + i]
            })
            .collect();
        polygons.push((0..n).rev().collect());
        polygons.push((n..2 * n).collect());

        Self::with_valid_polygons(vertices, &polygons)
    }

    // Factory topology is valid by construction
    fn with_valid_polygons(vertices: Vec<Vec3>, polygons: &[Vec<usize>]) -> Self {
        Self::from_polygons(vertices, polygons).unwrap_or_default()
    }

    #[inline]
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    #[inline]
    pub fn edges(&self) -> &[[usize; 2]] {
        &self.edges
    }

    #[inline]
    pub fn faces(&self) -> &[Vec<usize>] {
        &self.faces
    }

    /// The first two edges of every face, as vertex-index pairs
    pub fn leading_edges(&self) -> impl Iterator<Item = ([usize; 2], [usize; 2])> + '_ {
        self.faces
            .iter()
            .filter(|face| face.len() >= 2)
            .map(|face| (self.edges[face[0]], self.edges[face[1]]))
    }
}

fn parse_face_index(word: &str, line: usize) -> Result<usize> {
    let index = word.split('/').next().unwrap_or(word);
    match index.parse::<usize>() {
        Ok(i) if i >= 1 => Ok(i - 1),
        _ => Err(PhysicsError::ShapeConstraint(format!(
            "line {}: invalid face index '{}'",
            line, word
        ))),
    }
}
