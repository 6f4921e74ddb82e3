pub mod config;
#[cfg(feature = "stl")]
pub mod stl;
pub mod unit;

pub use crate::render::{config::RenderConfig, unit::Color3};

use crate::{planet::Planet, util::range::NumRange, Tile};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use validator::Validate;

/// A planet renderer is used to convert planets into visual output. A
/// renderer is created using a particular [RenderConfig], and from there can
/// be used to render any number of planets any number of times.
///
/// Aside from providing complete rendering, a renderer also provides utility
/// functions that make it easy to generate your own renderings based on a
/// planet, e.g. [Self::tile_color] and [Self::tile_lift].
///
/// Config options cannot be changed after creating a renderer, but renderers
/// are very cheap to create so if you need to change the config, just create
/// a new renderer.
///
/// ## Supported Formats
/// - STL (3D, no colors or textures)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanetRenderer {
    /// Config that determines how rendering is done
    ///
    /// **This is different from the planet config.** The planet config
    /// controls how the planet is generated, the render config just controls
    /// how it's visually presented _after_ generation.
    render_config: RenderConfig,
}

impl PlanetRenderer {
    /// Used for tiles whose biome has no color payload
    pub const MISSING_COLOR: Color3 = Color3::new_int(255, 0, 255);

    /// Initialize a new renderer with the given options. Returns an error if
    /// the render config is invalid.
    pub fn new(render_config: RenderConfig) -> anyhow::Result<Self> {
        render_config.validate()?;
        Ok(Self { render_config })
    }

    /// Get a reference to the config that this renderer uses
    pub fn render_config(&self) -> &RenderConfig {
        &self.render_config
    }

    /// How far a tile's surface sits above the base sphere, in the same units
    /// as the planet radius. See [RenderConfig::relief_scale].
    pub fn tile_lift(&self, planet: &Planet, tile: &Tile) -> f64 {
        tile.height() * self.render_config.relief_scale * planet.config().radius
    }

    /// Compute the color of a tile based on current render settings. The
    /// tile lens in the render config controls what data the color is
    /// derived from.
    pub fn tile_color(&self, planet: &Planet, tile: &Tile) -> Color3 {
        match self.render_config.tile_lens {
            // See TileLens definition for a description of each lens type
            TileLens::Biome => planet
                .biome_of(tile)
                .and_then(|rule| rule.color())
                .unwrap_or(Self::MISSING_COLOR),
            TileLens::BlendedBiome => planet
                .blended_color(tile)
                .unwrap_or(Self::MISSING_COLOR),
            TileLens::Height => {
                let height = unit_component(tile.height());
                // 0 -> white
                // 1 -> red
                Color3::new(1.0, 1.0 - height, 1.0 - height)
            }
            TileLens::Moisture => {
                let moisture = unit_component(tile.moisture());
                // 0 -> white
                // 1 -> green
                Color3::new(1.0 - moisture, 1.0, 1.0 - moisture)
            }
            TileLens::Temperature => {
                let temperature = unit_component(tile.temperature());
                // 0 -> blue
                // 1 -> red
                Color3::new(temperature, 0.0, 1.0 - temperature)
            }
        }
    }

    /// Render this planet into an STL model. Return value is the STL binary
    /// data. Returns an error if serialization fails, which indicates a bug
    /// in the mesh or in stl_io.
    #[cfg(feature = "stl")]
    pub fn render_as_stl(&self, planet: &Planet) -> anyhow::Result<Vec<u8>> {
        use anyhow::Context;

        let mesh = stl::planet_to_stl(planet, self);
        let mut buffer = Vec::<u8>::new();
        stl_io::write_stl(&mut buffer, mesh.iter())
            .context("error serializing STL")?;
        Ok(buffer)
    }
}

/// Squash a channel value into a color component
fn unit_component(value: f64) -> f32 {
    NumRange::<f32>::normal_range().clamp(value as f32)
}

/// A definition of what data is used to compute a tile's color.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Eq,
    PartialEq,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TileLens {
    /// Color is the tile's biome color. Biomes with a material payload
    /// render as [PlanetRenderer::MISSING_COLOR].
    Biome,
    /// Color is the average biome color of the tile and all its neighbors,
    /// which softens the borders between biomes.
    BlendedBiome,
    /// Color is a gradient based on height.
    Height,
    /// Color is a gradient based on moisture.
    Moisture,
    /// Color is a gradient from cold (blue) to hot (red).
    Temperature,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        biome::{BiomePayload, BiomeRule, BiomeSet},
        planet::FieldSet,
        PlanetConfig,
    };
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    fn planet() -> Planet {
        let config = PlanetConfig {
            subdivisions: 1,
            biomes: BiomeSet::new(vec![
                BiomeRule::new("stone", BiomePayload::Material("stone".into()))
                    .with_temperature(0.0, 0.1),
                BiomeRule::new(
                    "grass",
                    BiomePayload::Color(Color3::new_int(0, 255, 0)),
                ),
            ])
            .unwrap(),
            ..Default::default()
        };
        Planet::generate_with_fields(config, &FieldSet::constant(0.0, 0.0, 0.0))
            .unwrap()
    }

    #[test]
    fn test_tile_lens_from_str() {
        assert_eq!(TileLens::from_str("blended_biome").unwrap(), TileLens::BlendedBiome);
        assert_eq!(TileLens::Temperature.to_string(), "temperature");
        assert!(TileLens::from_str("runoff").is_err());
    }

    #[test]
    fn test_tile_color() {
        let planet = planet();
        let tile = &planet.tiles()[0];
        let renderer = PlanetRenderer::new(RenderConfig::default()).unwrap();
        assert_eq!(
            renderer.tile_color(&planet, tile),
            Color3::new_int(0, 255, 0)
        );

        // Every lens produces a color for every tile
        for tile_lens in TileLens::iter() {
            let renderer = PlanetRenderer::new(RenderConfig {
                tile_lens,
                ..Default::default()
            })
            .unwrap();
            for tile in planet.tiles() {
                renderer.tile_color(&planet, tile);
            }
        }
    }

    #[test]
    fn test_tile_lift() {
        let planet = planet();
        let renderer = PlanetRenderer::new(RenderConfig {
            relief_scale: 0.5,
            ..Default::default()
        })
        .unwrap();
        // Flat planet, every tile has height 0
        for tile in planet.tiles() {
            assert_eq!(renderer.tile_lift(&planet, tile), 0.0);
        }
    }

    #[test]
    fn test_invalid_config() {
        assert!(PlanetRenderer::new(RenderConfig {
            relief_scale: -1.0,
            ..Default::default()
        })
        .is_err());
    }
}
