//! Dual polygon extraction. Every vertex of the icosphere becomes one tile,
//! whose corners are the centroids of the faces around that vertex.

use crate::planet::{geodesic::Icosphere, TileId};
use anyhow::{anyhow, bail, Context};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// The geometry of one tile: an anchor direction plus an ordered ring of
/// corners around it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TilePolygon {
    /// Index of the anchor vertex in the source mesh
    pub id: TileId,
    /// Unit direction from the planet center to the anchor vertex
    pub anchor: Vector3<f64>,
    /// Distance from the planet center to every corner
    pub radius: f64,
    /// Face centroids projected onto the sphere, counter-clockwise as seen
    /// from outside
    pub corners: Vec<Point3<f64>>,
    /// The tile across each side. Side `i` runs from corner `i` to corner
    /// `i + 1`, wrapping around.
    pub neighbors: Vec<TileId>,
}

impl TilePolygon {
    /// The anchor scaled out to the sphere
    pub fn center(&self) -> Point3<f64> {
        Point3::from(self.anchor * self.radius)
    }

    /// Angle of each corner around the anchor, in the anchor's tangent basis.
    /// For a well-formed polygon these are strictly increasing.
    pub fn corner_angles(&self) -> anyhow::Result<Vec<f64>> {
        let basis = TangentBasis::at(&self.anchor)?;
        let center = self.center();
        Ok(self
            .corners
            .iter()
            .map(|corner| basis.angle(&(corner - center)))
            .collect())
    }
}

/// An orthonormal frame on the plane tangent to the sphere at some point.
/// `(u, w, normal)` is right-handed, so angles measured from `u` towards `w`
/// increase counter-clockwise when viewed from outside the sphere.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TangentBasis {
    pub normal: Vector3<f64>,
    pub u: Vector3<f64>,
    pub w: Vector3<f64>,
}

impl TangentBasis {
    /// Reference direction used to build the basis. It's deliberately not
    /// aligned with any axis, so that no icosphere vertex lands on it.
    pub const PRIMARY_REFERENCE: [f64; 3] = [0.267, 0.535, 0.802];

    /// Below this squared cross product length, a reference is considered
    /// parallel to the normal
    const PARALLEL_EPSILON: f64 = 1e-6;

    /// Build a tangent basis at the given normal. The normal doesn't need to
    /// be unit length, but it must be non-zero.
    pub fn at(normal: &Vector3<f64>) -> anyhow::Result<Self> {
        let normal = normal
            .try_normalize(f64::EPSILON)
            .ok_or_else(|| anyhow!("cannot build tangent basis at {:?}", normal))?;
        let [x, y, z] = Self::PRIMARY_REFERENCE;
        let primary = Vector3::new(x, y, z);

        let mut cross = primary.cross(&normal);
        if cross.norm_squared() < Self::PARALLEL_EPSILON {
            cross = Vector3::x().cross(&normal);
        }
        if cross.norm_squared() < Self::PARALLEL_EPSILON {
            bail!("degenerate tangent basis at {:?}", normal);
        }

        let u = cross.normalize();
        let w = normal.cross(&u);
        Ok(Self { normal, u, w })
    }

    /// Angle of a direction in this basis, in `(-π, π]`. The normal
    /// component of the direction is ignored.
    pub fn angle(&self, direction: &Vector3<f64>) -> f64 {
        direction.dot(&self.w).atan2(direction.dot(&self.u))
    }
}

/// Build one polygon per mesh vertex that's used by at least one face, in
/// vertex order. Corners sit at `radius` from the center. Returns an error
/// if the mesh isn't closed around some vertex, or produces non-finite
/// geometry.
pub fn extract_tiles(
    mesh: &Icosphere,
    radius: f64,
) -> anyhow::Result<Vec<TilePolygon>> {
    if mesh.faces().is_empty() {
        return Ok(Vec::new());
    }
    if !(radius.is_finite() && radius > 0.0) {
        bail!("invalid radius {}", radius);
    }

    let vertices = mesh.vertices();
    let faces = mesh.faces();

    // Vertex -> incident faces, in face order
    let mut incident: Vec<Vec<usize>> = vec![Vec::with_capacity(6); vertices.len()];
    for (face_index, face) in faces.iter().enumerate() {
        for &vertex in face {
            incident[vertex].push(face_index);
        }
    }

    let centroids: Vec<Point3<f64>> = faces
        .iter()
        .map(|&[a, b, c]| {
            let direction = (vertices[a] + vertices[b] + vertices[c]) / 3.0;
            Point3::from(direction.normalize() * radius)
        })
        .collect();

    vertices
        .iter()
        .zip(incident)
        .enumerate()
        // Unreferenced vertices aren't part of the surface, so no tile
        .filter(|(_, (_, face_indices))| !face_indices.is_empty())
        .map(|(vertex, (anchor, face_indices))| {
            build_polygon(vertex, anchor, face_indices, faces, &centroids, radius)
                .with_context(|| format!("error building tile {}", TileId(vertex)))
        })
        .collect()
}

fn build_polygon(
    vertex: usize,
    anchor: &Vector3<f64>,
    face_indices: Vec<usize>,
    faces: &[[usize; 3]],
    centroids: &[Point3<f64>],
    radius: f64,
) -> anyhow::Result<TilePolygon> {
    if face_indices.len() < 3 {
        bail!(
            "vertex has {} incident faces, need at least 3",
            face_indices.len()
        );
    }

    let basis = TangentBasis::at(anchor)?;
    let center = Point3::from(anchor * radius);
    let mut ring = Vec::with_capacity(face_indices.len());
    for face_index in face_indices {
        let corner = centroids[face_index];
        let angle = basis.angle(&(corner - center));
        if !(angle.is_finite() && corner.coords.iter().all(|c| c.is_finite())) {
            bail!("non-finite corner {:?} for face {}", corner, face_index);
        }
        ring.push((angle, face_index));
    }
    ring.sort_by(|(a, _), (b, _)| a.total_cmp(b));

    // Consecutive faces share an edge from the anchor out to a neighbor
    let neighbors = (0..ring.len())
        .map(|i| {
            let current = &faces[ring[i].1];
            let next = &faces[ring[(i + 1) % ring.len()].1];
            current
                .iter()
                .copied()
                .find(|&v| v != vertex && next.contains(&v))
                .map(TileId)
                .ok_or_else(|| {
                    anyhow!(
                        "faces {} and {} don't share an edge",
                        ring[i].1,
                        ring[(i + 1) % ring.len()].1
                    )
                })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(TilePolygon {
        id: TileId(vertex),
        anchor: *anchor,
        radius,
        corners: ring.iter().map(|&(_, face_index)| centroids[face_index]).collect(),
        neighbors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::f64::consts::PI;

    fn assert_orthonormal(basis: &TangentBasis) {
        assert_approx_eq!(basis.u.norm(), 1.0);
        assert_approx_eq!(basis.w.norm(), 1.0);
        assert_approx_eq!(basis.normal.norm(), 1.0);
        assert_approx_eq!(basis.u.dot(&basis.w), 0.0);
        assert_approx_eq!(basis.u.dot(&basis.normal), 0.0);
        assert_approx_eq!(basis.w.dot(&basis.normal), 0.0);
        // Right-handed
        assert_approx_eq!(basis.u.cross(&basis.w).dot(&basis.normal), 1.0);
    }

    #[test]
    fn test_basis_orthonormal() {
        for vertex in Icosphere::generate(2).vertices() {
            assert_orthonormal(&TangentBasis::at(vertex).unwrap());
        }
    }

    #[test]
    fn test_basis_fallback() {
        // Parallel to the primary reference, so the fallback axis kicks in
        let [x, y, z] = TangentBasis::PRIMARY_REFERENCE;
        let basis = TangentBasis::at(&Vector3::new(x, y, z)).unwrap();
        assert_orthonormal(&basis);
        let basis = TangentBasis::at(&Vector3::new(-x, -y, -z)).unwrap();
        assert_orthonormal(&basis);
    }

    #[test]
    fn test_basis_zero_normal() {
        assert!(TangentBasis::at(&Vector3::zeros()).is_err());
    }

    #[test]
    fn test_twelve_pentagons() {
        for level in 0..=3 {
            let tiles = extract_tiles(&Icosphere::generate(level), 1.0).unwrap();
            assert_eq!(tiles.len(), Icosphere::vertex_count(level));
            let pentagons = tiles.iter().filter(|t| t.corners.len() == 5).count();
            let hexagons = tiles.iter().filter(|t| t.corners.len() == 6).count();
            assert_eq!(pentagons, 12, "level {}", level);
            assert_eq!(pentagons + hexagons, tiles.len());
        }
    }

    #[test]
    fn test_corners_on_sphere() {
        let tiles = extract_tiles(&Icosphere::generate(2), 3.5).unwrap();
        for tile in &tiles {
            assert_approx_eq!(tile.center().coords.norm(), 3.5);
            for corner in &tile.corners {
                assert_approx_eq!(corner.coords.norm(), 3.5);
            }
        }
    }

    #[test]
    fn test_corner_angles_increase() {
        let tiles = extract_tiles(&Icosphere::generate(3), 1.0).unwrap();
        for tile in &tiles {
            let angles = tile.corner_angles().unwrap();
            for pair in angles.windows(2) {
                assert!(pair[0] < pair[1], "{:?} for {}", angles, tile.id);
            }
            // One full turn, no more
            assert!(angles[angles.len() - 1] - angles[0] < 2.0 * PI);
        }
    }

    #[test]
    fn test_polygons_convex_and_ccw() {
        let tiles = extract_tiles(&Icosphere::generate(2), 1.0).unwrap();
        for tile in &tiles {
            let n = tile.corners.len();
            for i in 0..n {
                let a = tile.corners[i];
                let b = tile.corners[(i + 1) % n];
                let c = tile.corners[(i + 2) % n];
                let turn = (b - a).cross(&(c - b));
                assert!(turn.dot(&tile.anchor) > 0.0, "tile {}", tile.id);
            }
        }
    }

    #[test]
    fn test_neighbors_symmetric() {
        let tiles = extract_tiles(&Icosphere::generate(2), 1.0).unwrap();
        for tile in &tiles {
            assert_eq!(tile.neighbors.len(), tile.corners.len());
            for (i, neighbor) in tile.neighbors.iter().enumerate() {
                let other = &tiles[neighbor.0];
                assert!(other.neighbors.contains(&tile.id));

                // The side towards the neighbor is shared by both polygons
                let a = tile.corners[i];
                let b = tile.corners[(i + 1) % tile.corners.len()];
                for corner in &[a, b] {
                    assert!(other
                        .corners
                        .iter()
                        .any(|c| (c - corner).norm() < 1e-9));
                }
            }
        }
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = Icosphere::from_parts(vec![Vector3::x()], vec![]).unwrap();
        assert!(extract_tiles(&mesh, 1.0).unwrap().is_empty());
    }

    #[test]
    fn test_open_mesh() {
        let mesh = Icosphere::from_parts(
            vec![Vector3::x(), Vector3::y(), Vector3::z()],
            vec![[0, 1, 2]],
        )
        .unwrap();
        assert!(extract_tiles(&mesh, 1.0).is_err());
    }

    #[test]
    fn test_unreferenced_vertex_skipped() {
        let icosahedron = Icosphere::generate(0);
        let mut vertices = icosahedron.vertices().to_vec();
        vertices.push(Vector3::new(1.0, 1.0, 1.0));
        let mesh =
            Icosphere::from_parts(vertices, icosahedron.faces().to_vec())
                .unwrap();

        let tiles = extract_tiles(&mesh, 1.0).unwrap();
        assert_eq!(tiles.len(), 12);
        for (i, tile) in tiles.iter().enumerate() {
            assert_eq!(tile.id, TileId(i));
            assert_eq!(tile.corners.len(), 5);
        }
    }

    #[test]
    fn test_invalid_radius() {
        let mesh = Icosphere::generate(0);
        assert!(extract_tiles(&mesh, 0.0).is_err());
        assert!(extract_tiles(&mesh, f64::NAN).is_err());
    }
}
