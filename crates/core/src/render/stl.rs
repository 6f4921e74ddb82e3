//! This module provides logic for rendering a planet as an STL. Only
//! available with the "stl" feature enabled.

use crate::{render::PlanetRenderer, Planet, Tile};
use nalgebra::{Point3, Vector3};
use stl_io::{Normal, Triangle, Vertex};

/// Render the given planet as an STL model. STL only carries geometric data,
/// so no colors/textures. Each tile is a flat-topped fan lifted off the
/// sphere by its height, with walls down to any lower neighbor.
pub fn planet_to_stl(planet: &Planet, renderer: &PlanetRenderer) -> Vec<Triangle> {
    let tiles = planet.tiles();
    // Hexagons are the vast majority: 6 for the top plus up to 2 per side
    let mut mesh = Vec::with_capacity(tiles.len() * 18);

    for tile in tiles {
        let solid = TileSolid::new(planet, renderer, tile);
        solid.add_to_mesh(&mut mesh);
    }

    mesh
}

/// A convenience struct for converting a tile into STL triangles.
#[derive(Clone, Debug)]
struct TileSolid {
    center: Point3<f64>,
    /// Unlifted corners, counter-clockwise from outside
    corners: Vec<Point3<f64>>,
    lift: f64,
    /// Lift of the neighbor across each side, if it exists
    neighbor_lifts: Vec<Option<f64>>,
}

impl TileSolid {
    fn new(planet: &Planet, renderer: &PlanetRenderer, tile: &Tile) -> Self {
        let neighbor_lifts = tile
            .neighbors()
            .iter()
            .map(|&id| {
                planet
                    .tile(id)
                    .map(|neighbor| renderer.tile_lift(planet, neighbor))
            })
            .collect();

        Self {
            center: tile.center(),
            corners: tile.corners().to_vec(),
            lift: renderer.tile_lift(planet, tile),
            neighbor_lifts,
        }
    }

    /// Convert this tile to triangle soup and add them to the soup pot.
    fn add_to_mesh(self, mesh: &mut Vec<Triangle>) {
        // REMEMBER: We use the right-hand rule, so all vertices are
        // COUNTER-CLOCKWISE when looking at the visible side.
        let top_center = lifted(&self.center, self.lift);
        let n = self.corners.len();

        for i in 0..n {
            let c1 = &self.corners[i];
            let c2 = &self.corners[(i + 1) % n];
            let top1 = lifted(c1, self.lift);
            let top2 = lifted(c2, self.lift);

            // Top face, as a fan around the center
            mesh.push(triangle([top_center, top1, top2]));

            // If the neighbor is as tall or taller, the wall isn't visible.
            // Missing neighbors only happen for a malformed planet, in which
            // case we wall all the way down.
            let bottom = self.neighbor_lifts[i].unwrap_or(0.0);
            if bottom < self.lift {
                let bottom1 = lifted(c1, bottom);
                let bottom2 = lifted(c2, bottom);
                // Wall faces away from the tile center
                mesh.push(triangle([bottom1, bottom2, top2]));
                mesh.push(triangle([top2, top1, bottom1]));
            }
        }
    }
}

/// Push a point on the sphere outward along its radial direction
fn lifted(point: &Point3<f64>, lift: f64) -> Point3<f64> {
    match point.coords.try_normalize(f64::EPSILON) {
        Some(direction) => point + direction * lift,
        None => *point,
    }
}

fn triangle(points: [Point3<f64>; 3]) -> Triangle {
    let [a, b, c] = points;
    let normal = (b - a)
        .cross(&(c - a))
        .try_normalize(f64::EPSILON)
        .unwrap_or_else(Vector3::zeros);
    Triangle {
        normal: Normal::new([normal.x as f32, normal.y as f32, normal.z as f32]),
        vertices: [vertex(&a), vertex(&b), vertex(&c)],
    }
}

fn vertex(point: &Point3<f64>) -> Vertex {
    Vertex::new([point.x as f32, point.y as f32, point.z as f32])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{planet::FieldSet, render::RenderConfig, PlanetConfig};

    #[test]
    fn test_smooth_sphere() {
        let config = PlanetConfig {
            subdivisions: 1,
            ..Default::default()
        };
        let planet =
            Planet::generate_with_fields(config, &FieldSet::constant(0.0, 0.0, 0.0))
                .unwrap();
        let renderer = PlanetRenderer::new(RenderConfig::default()).unwrap();
        let mesh = planet_to_stl(&planet, &renderer);

        // No relief means no walls, just one fan triangle per side
        let sides: usize = planet.tiles().iter().map(Tile::sides).sum();
        assert_eq!(mesh.len(), sides);

        // Every normal faces out
        for triangle in &mesh {
            let v = triangle.vertices[0];
            let n = triangle.normal;
            assert!(v[0] * n[0] + v[1] * n[1] + v[2] * n[2] > 0.0);
        }
    }

    #[test]
    fn test_render_as_stl() {
        let planet = Planet::generate(PlanetConfig {
            seed: 42.into(),
            subdivisions: 2,
            ..Default::default()
        })
        .unwrap();
        let renderer = PlanetRenderer::new(RenderConfig {
            relief_scale: 0.2,
            ..Default::default()
        })
        .unwrap();
        let stl = renderer.render_as_stl(&planet).unwrap();
        // 80 byte header, u32 count, 50 bytes per triangle
        let mesh = planet_to_stl(&planet, &renderer);
        assert_eq!(stl.len(), 84 + 50 * mesh.len());
    }
}
