//! Icosphere construction: a regular icosahedron, recursively subdivided and
//! pushed out onto the unit sphere.

use anyhow::bail;
use fnv::{FnvBuildHasher, FnvHashMap};
use nalgebra::Vector3;

/// A triangle, as three indices into the vertex list. Winding is
/// counter-clockwise as seen from outside the sphere.
pub type Face = [usize; 3];

/// An unordered pair of vertex indices, identifying one edge of the mesh.
/// `EdgeKey::new(a, b) == EdgeKey::new(b, a)`, which is what lets two faces
/// that share an edge find the same midpoint.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EdgeKey {
    low: usize,
    high: usize,
}

impl EdgeKey {
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn endpoints(self) -> (usize, usize) {
        (self.low, self.high)
    }
}

/// A triangle mesh approximating the unit sphere. Vertices are only ever
/// appended, never moved or removed, so a vertex index is a stable identity
/// for the lifetime of the mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct Icosphere {
    vertices: Vec<Vector3<f64>>,
    faces: Vec<Face>,
}

impl Icosphere {
    /// Build an icosphere by subdividing an icosahedron `subdivisions` times.
    /// Output is fully deterministic: midpoints are created in face traversal
    /// order, and each face is replaced by its four children in place.
    pub fn generate(subdivisions: u32) -> Self {
        let mut mesh = Self::icosahedron();
        for _ in 0..subdivisions {
            mesh.subdivide();
        }

        // Every vertex was normalized on creation, but do it again so float
        // drift never leaves a vertex off the sphere
        for vertex in &mut mesh.vertices {
            vertex.normalize_mut();
        }

        debug_assert_eq!(mesh.vertices.len(), Self::vertex_count(subdivisions));
        debug_assert_eq!(mesh.faces.len(), Self::face_count(subdivisions));
        mesh
    }

    /// Build a mesh from arbitrary parts. Vertices are normalized. Returns an
    /// error if any face references a vertex that doesn't exist, or any
    /// vertex is zero-length or non-finite.
    pub fn from_parts(
        vertices: Vec<Vector3<f64>>,
        faces: Vec<Face>,
    ) -> anyhow::Result<Self> {
        let mut normalized = Vec::with_capacity(vertices.len());
        for (i, vertex) in vertices.into_iter().enumerate() {
            let norm = vertex.norm();
            if !(norm.is_finite() && norm > 0.0) {
                bail!("vertex {} ({:?}) can't be projected onto the sphere", i, vertex);
            }
            normalized.push(vertex / norm);
        }
        for (i, face) in faces.iter().enumerate() {
            if let Some(&vertex) = face.iter().find(|&&v| v >= normalized.len()) {
                bail!(
                    "face {} references vertex {}, but there are only {} vertices",
                    i,
                    vertex,
                    normalized.len()
                );
            }
        }
        Ok(Self {
            vertices: normalized,
            faces,
        })
    }

    /// Number of vertices at a given subdivision level: `10 * 4^n + 2`
    pub fn vertex_count(subdivisions: u32) -> usize {
        10 * 4usize.pow(subdivisions) + 2
    }

    /// Number of faces at a given subdivision level: `20 * 4^n`
    pub fn face_count(subdivisions: u32) -> usize {
        20 * 4usize.pow(subdivisions)
    }

    pub fn vertices(&self) -> &[Vector3<f64>] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// The 12 vertices and 20 faces of a regular icosahedron. Vertices are
    /// the cyclic permutations of `(0, ±1, ±φ)`, normalized.
    fn icosahedron() -> Self {
        let phi = (1.0 + 5.0f64.sqrt()) / 2.0;
        let vertices = [
            [-1.0, phi, 0.0],
            [1.0, phi, 0.0],
            [-1.0, -phi, 0.0],
            [1.0, -phi, 0.0],
            [0.0, -1.0, phi],
            [0.0, 1.0, phi],
            [0.0, -1.0, -phi],
            [0.0, 1.0, -phi],
            [phi, 0.0, -1.0],
            [phi, 0.0, 1.0],
            [-phi, 0.0, -1.0],
            [-phi, 0.0, 1.0],
        ]
        .iter()
        .map(|&[x, y, z]| Vector3::new(x, y, z).normalize())
        .collect();

        let faces = vec![
            // 5 faces around vertex 0
            [0, 11, 5],
            [0, 5, 1],
            [0, 1, 7],
            [0, 7, 10],
            [0, 10, 11],
            // 5 adjacent faces
            [1, 5, 9],
            [5, 11, 4],
            [11, 10, 2],
            [10, 7, 6],
            [7, 1, 8],
            // 5 faces around vertex 3
            [3, 9, 4],
            [3, 4, 2],
            [3, 2, 6],
            [3, 6, 8],
            [3, 8, 9],
            // 5 adjacent faces
            [4, 9, 5],
            [2, 4, 11],
            [6, 2, 10],
            [8, 6, 7],
            [9, 8, 1],
        ];

        Self { vertices, faces }
    }

    /// Split every face into four. Each edge gets exactly one new midpoint
    /// vertex per pass, shared by both faces that touch the edge.
    fn subdivide(&mut self) {
        let old_faces = std::mem::take(&mut self.faces);
        // Closed triangle mesh: every edge is shared by 2 faces
        let edge_count = old_faces.len() * 3 / 2;
        let mut midpoints: FnvHashMap<EdgeKey, usize> =
            FnvHashMap::with_capacity_and_hasher(
                edge_count,
                FnvBuildHasher::default(),
            );
        self.vertices.reserve(edge_count);
        self.faces.reserve(old_faces.len() * 4);

        for [a, b, c] in old_faces {
            let ab = midpoint(&mut self.vertices, &mut midpoints, a, b);
            let bc = midpoint(&mut self.vertices, &mut midpoints, b, c);
            let ca = midpoint(&mut self.vertices, &mut midpoints, c, a);

            self.faces.push([a, ab, ca]);
            self.faces.push([b, bc, ab]);
            self.faces.push([c, ca, bc]);
            self.faces.push([ab, bc, ca]);
        }
    }
}

/// Get the index of the midpoint vertex for the edge `a-b`, creating it (on
/// the unit sphere) if this is the first time the edge was split.
fn midpoint(
    vertices: &mut Vec<Vector3<f64>>,
    midpoints: &mut FnvHashMap<EdgeKey, usize>,
    a: usize,
    b: usize,
) -> usize {
    *midpoints.entry(EdgeKey::new(a, b)).or_insert_with(|| {
        let point = ((vertices[a] + vertices[b]) / 2.0).normalize();
        vertices.push(point);
        vertices.len() - 1
    })
}
