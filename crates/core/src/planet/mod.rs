pub mod dual;
pub mod field;
mod generate;
pub mod geodesic;
mod tile;

pub use crate::planet::{
    dual::{extract_tiles, TangentBasis, TilePolygon},
    field::{ConstantField, FieldSampler, FieldSet, ScalarField},
    generate::TileNoiseFn,
    geodesic::{EdgeKey, Icosphere},
    tile::{Channel, ChannelValues, Tile, TileId},
};

use crate::{
    biome::BiomeRule, config::PlanetConfig, planet::generate::PlanetBuilder,
    render::Color3, timed,
};
use anyhow::Context;
use fnv::FnvBuildHasher;
use indexmap::IndexMap;
use log::info;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A fully generated planet. Contains the tiles that cover the sphere, as
/// well as the configuration that was used to generate them.
///
/// ## Serialization
/// Planets can be serialized and deserialized through multiple formats: JSON
/// and binary.
///
/// ### JSON Format
/// All fields and values use snake casing. Tiles are serialized as an array
/// ordered by ID, and every tile carries its full geometry, so consumers
/// don't need to regenerate the mesh.
///
/// ### Binary Format
/// Planets can be saved and exported in a binary format via [Planet::to_bin]
/// and reloaded via [Planet::from_bin]. Currently the binary format is
/// [CBOR](https://cbor.io/), but that is subject to change so beware of that
/// if you write other programs that load the format.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    /// The config used to generate this planet. Generation is deterministic
    /// based on config, and once the planet has been generated, the config
    /// can never change.
    config: PlanetConfig,

    /// Every tile on the planet, ordered by [TileId]
    tiles: Vec<Tile>,
}

impl Planet {
    /// Generate a new planet with the given config. Noise fields are built
    /// from the config, each seeded from an RNG seeded by the config's seed.
    /// Returns an error if the given config is invalid.
    pub fn generate(config: PlanetConfig) -> anyhow::Result<Self> {
        info!("Generating planet with config {:#?}", config);
        config.validate().context("invalid config")?;

        let mut rng = Pcg64::seed_from_u64(config.seed.to_u64());
        let fields = FieldSet::from_config(&config, &mut rng);
        Self::generate_validated(config, &fields)
    }

    /// Generate a new planet with a caller-provided set of fields. The noise
    /// configs in `config` are ignored, but everything else still applies.
    /// Returns an error if the given config is invalid.
    pub fn generate_with_fields(
        config: PlanetConfig,
        fields: &FieldSet,
    ) -> anyhow::Result<Self> {
        info!("Generating planet with config {:#?}", config);
        config.validate().context("invalid config")?;
        Self::generate_validated(config, fields)
    }

    fn generate_validated(
        config: PlanetConfig,
        fields: &FieldSet,
    ) -> anyhow::Result<Self> {
        let tiles = timed!("Planet generation", log::Level::Info, {
            PlanetBuilder::new(&config, fields)?.generate_planet()?
        });

        Ok(Self { config, tiles })
    }

    /// Get a reference to the config that defines this planet.
    pub fn config(&self) -> &PlanetConfig {
        &self.config
    }

    /// Get all tiles, ordered by ID
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Get the owned tile list for this planet
    pub fn into_tiles(self) -> Vec<Tile> {
        self.tiles
    }

    /// Look up a tile by ID
    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles
            .binary_search_by_key(&id, Tile::id)
            .ok()
            .map(|index| &self.tiles[index])
    }

    /// Get the biome rule that a tile was classified as. Returns `None` only
    /// if the tile came from a different planet.
    pub fn biome_of(&self, tile: &Tile) -> Option<&BiomeRule> {
        self.config.biomes.get(tile.biome_index())
    }

    /// Always 12 for a closed icosphere
    pub fn pentagon_count(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.is_pentagon()).count()
    }

    /// Count how many tiles ended up in each biome. Every rule in the set is
    /// present, in rule order, even if no tiles use it.
    pub fn biome_counts(&self) -> IndexMap<&str, usize, FnvBuildHasher> {
        let mut counts: IndexMap<&str, usize, FnvBuildHasher> = self
            .config
            .biomes
            .rules()
            .iter()
            .map(|rule| (rule.name.as_str(), 0))
            .collect();
        for tile in &self.tiles {
            if let Some(rule) = self.biome_of(tile) {
                *counts.entry(rule.name.as_str()).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Average the color of a tile's biome with its neighbors' biomes. Biomes
    /// without a color payload are skipped. Returns `None` if none of them
    /// have a color.
    pub fn blended_color(&self, tile: &Tile) -> Option<Color3> {
        let neighbors = tile.neighbors().iter().filter_map(|&id| self.tile(id));
        let colors = std::iter::once(tile)
            .chain(neighbors)
            .filter_map(|t| self.biome_of(t))
            .filter_map(BiomeRule::color);
        Color3::mean(colors)
    }

    /// Deserialize a planet from JSON. A planet can be serialized into JSON
    /// with [Planet::to_json]. Will fail if the input is malformed.
    #[cfg(feature = "json")]
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("error deserializing planet")
    }

    /// Deserialize a planet from binary format. A planet can be serialized
    /// into binary with [Planet::to_bin]. See the struct-level [Planet]
    /// documentation for a description of the binary format. Will fail if the
    /// input is malformed.
    #[cfg(feature = "bin")]
    pub fn from_bin(read: impl std::io::Read) -> anyhow::Result<Self> {
        serde_cbor::from_reader(read).context("error deserializing planet")
    }

    /// Serializes this planet into JSON. This is a recoverable format, which
    /// can be loaded back into a [Planet] with [Planet::from_json].
    #[cfg(feature = "json")]
    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string(self).context("error serializing planet")
    }

    /// Serializes this planet into a binary format. This is a recoverable
    /// format, which can be loaded back into a [Planet] with
    /// [Planet::from_bin].
    #[cfg(feature = "bin")]
    pub fn to_bin(&self) -> anyhow::Result<Vec<u8>> {
        let mut buffer = Vec::new();
        serde_cbor::to_writer(&mut buffer, self)
            .context("error serializing planet")?;
        Ok(buffer)
    }
}
