mod biome;
mod climate;
mod detail;
mod height;
mod noise_fn;

pub use noise_fn::TileNoiseFn;

use crate::{
    config::PlanetConfig,
    planet::{
        dual::{extract_tiles, TilePolygon},
        field::{FieldSampler, FieldSet},
        generate::{
            biome::BiomeGenerator,
            climate::{MoistureGenerator, TemperatureGenerator},
            detail::DetailGenerator,
            height::HeightGenerator,
        },
        geodesic::Icosphere,
        ChannelValues, Tile, TileId,
    },
    timed,
    util::range::NumRange,
};
use anyhow::{anyhow, Context};
use log::info;
use std::fmt::Debug;

/// A container for generating a new planet. This applies a series of
/// generators in sequence to fill in tile channels. These fields are public to
/// allow for disjoint borrowing of multiple fields at once.
pub struct PlanetBuilder<'a> {
    /// The config that deterministically controls planet gen. Two planets
    /// with the same config (and the same fields) will always be identical.
    pub config: &'a PlanetConfig,

    /// The scalar fields that every channel is sampled from
    pub fields: &'a FieldSet,

    /// All the tiles on the planet, ordered by ID. Individual tiles will be
    /// mutated during generation, but tiles can never be added, removed, or
    /// reordered!
    pub tiles: Vec<TileBuilder>,
}

impl<'a> PlanetBuilder<'a> {
    /// Build the tile geometry for a planet. Returns an error if the mesh
    /// can't be turned into tiles, which indicates a bug.
    pub fn new(
        config: &'a PlanetConfig,
        fields: &'a FieldSet,
    ) -> anyhow::Result<Self> {
        let mesh = timed!(
            "Icosphere subdivision",
            Icosphere::generate(config.subdivisions)
        );
        let polygons = timed!(
            "Tile extraction",
            extract_tiles(&mesh, config.radius)
                .context("error extracting tiles")?
        );

        let tiles: Vec<TileBuilder> =
            polygons.into_iter().map(TileBuilder::new).collect();
        info!(
            "Initialized planet with {} tiles ({} pentagons)",
            tiles.len(),
            tiles.iter().filter(|tile| tile.polygon.corners.len() == 5).count()
        );
        Ok(Self {
            config,
            fields,
            tiles,
        })
    }

    /// Get a sampler over this planet's fields
    pub fn sampler(&self) -> FieldSampler<'a> {
        FieldSampler::new(self.fields, &self.config.climate)
    }

    /// Generate a planet by running a series of generation steps
    /// sequentially. Must be run from a blank slate. Outputs the finalized
    /// set of tiles.
    pub fn generate_planet(mut self) -> anyhow::Result<Vec<Tile>> {
        // Run each generation step. The order is very important!
        self.apply_generator(HeightGenerator)?;
        self.apply_generator(MoistureGenerator)?;
        self.apply_generator(TemperatureGenerator)?;
        self.apply_generator(DetailGenerator)?;
        self.apply_generator(BiomeGenerator)?;

        // Build each tile into its final value
        self.tiles.into_iter().map(TileBuilder::build).collect()
    }

    /// A helper to run a generation step on this builder.
    fn apply_generator(
        &mut self,
        generator: impl Debug + Generate,
    ) -> anyhow::Result<()> {
        timed!(&format!("{:?}", generator), generator.generate(self))
            .with_context(|| format!("error in {:?}", generator))
    }
}

/// A type that generates some sort of data for the planet. This takes in a
/// set of tiles that have some data generated, and mutates the tiles to add
/// new data. Generators are chained together, where each one adds some more
/// data until the planet is complete.
trait Generate {
    /// Apply some generation step to the given planet. This can mutate the
    /// planet's tiles, but can never add/remove tiles, or change their
    /// geometry in any way. Any error returned here indicates a bug in the
    /// code, rather than anything invalid about the input.
    fn generate(&self, planet: &mut PlanetBuilder<'_>) -> anyhow::Result<()>;
}

/// A partially built [Tile]. This should only be used while the planet is
/// being generated. After generation is complete, only [Tile] should be used.
/// Since the channels may not be defined yet, the getters all return results
/// that error if the channel hasn't been set. This makes it easy to catch bugs
/// where we're trying to use values that haven't been generated yet.
#[derive(Clone, Debug)]
pub struct TileBuilder {
    polygon: TilePolygon,
    height: Option<f64>,
    moisture: Option<f64>,
    temperature: Option<f64>,
    detail: Option<f64>,
    biome: Option<usize>,
}

impl TileBuilder {
    pub fn new(polygon: TilePolygon) -> Self {
        Self {
            polygon,
            height: None,
            moisture: None,
            temperature: None,
            detail: None,
            biome: None,
        }
    }

    /// Finalize this builder to create a [Tile]. Returns an error if any
    /// required channel, or the biome, is uninitialized.
    pub fn build(self) -> anyhow::Result<Tile> {
        let channels = self.channels()?;
        let biome = self.biome()?;
        Ok(Tile {
            polygon: self.polygon,
            channels,
            biome,
        })
    }

    pub fn id(&self) -> TileId {
        self.polygon.id
    }

    pub fn polygon(&self) -> &TilePolygon {
        &self.polygon
    }

    /// See [Tile::height]. Returns an error if height is unset.
    pub fn height(&self) -> anyhow::Result<f64> {
        self.height
            .ok_or_else(|| anyhow!("height not initialized for {}", self.id()))
    }

    /// Set the normalized height for this tile. Returns an error if the
    /// value is outside [0,1].
    pub fn set_height(&mut self, height: f64) -> anyhow::Result<()> {
        NumRange::normal_range().ensure_contains(height)?;
        self.height = Some(height);
        Ok(())
    }

    /// See [Tile::moisture]. Returns an error if moisture is unset.
    pub fn moisture(&self) -> anyhow::Result<f64> {
        self.moisture.ok_or_else(|| {
            anyhow!("moisture not initialized for {}", self.id())
        })
    }

    pub fn set_moisture(&mut self, moisture: f64) -> anyhow::Result<()> {
        NumRange::normal_range().ensure_contains(moisture)?;
        self.moisture = Some(moisture);
        Ok(())
    }

    /// See [Tile::temperature]. Returns an error if temperature is unset.
    pub fn temperature(&self) -> anyhow::Result<f64> {
        self.temperature.ok_or_else(|| {
            anyhow!("temperature not initialized for {}", self.id())
        })
    }

    pub fn set_temperature(&mut self, temperature: f64) -> anyhow::Result<()> {
        NumRange::normal_range().ensure_contains(temperature)?;
        self.temperature = Some(temperature);
        Ok(())
    }

    /// Detail is optional, so unlike the other channels this never errors
    pub fn detail(&self) -> Option<f64> {
        self.detail
    }

    pub fn set_detail(&mut self, detail: f64) -> anyhow::Result<()> {
        NumRange::normal_range().ensure_contains(detail)?;
        self.detail = Some(detail);
        Ok(())
    }

    /// Collect all channels. Returns an error if any required channel is
    /// unset.
    pub fn channels(&self) -> anyhow::Result<ChannelValues> {
        Ok(ChannelValues {
            height: self.height()?,
            moisture: self.moisture()?,
            temperature: self.temperature()?,
            detail: self.detail,
        })
    }

    /// See [Tile::biome_index]. Returns an error if biome is unset.
    pub fn biome(&self) -> anyhow::Result<usize> {
        self.biome
            .ok_or_else(|| anyhow!("biome not initialized for {}", self.id()))
    }

    pub fn set_biome(&mut self, biome: usize) {
        self.biome = Some(biome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::{BiomePayload, BiomeRule, BiomeSet};

    fn builder() -> TileBuilder {
        let mesh = Icosphere::generate(0);
        let polygon = extract_tiles(&mesh, 1.0).unwrap().remove(0);
        TileBuilder::new(polygon)
    }

    #[test]
    fn test_tile_builder_unset() {
        let tile = builder();
        assert!(tile.height().is_err());
        assert!(tile.channels().is_err());
        assert_eq!(tile.detail(), None);
        assert!(tile.build().is_err());
    }

    #[test]
    fn test_tile_builder_out_of_range() {
        let mut tile = builder();
        assert!(tile.set_height(1.5).is_err());
        assert!(tile.set_moisture(-0.1).is_err());
        assert!(tile.set_temperature(f64::NAN).is_err());
        assert!(tile.set_detail(2.0).is_err());
        assert!(tile.height().is_err());
    }

    #[test]
    fn test_tile_builder_build() {
        let mut tile = builder();
        tile.set_height(0.25).unwrap();
        tile.set_moisture(0.5).unwrap();
        tile.set_temperature(0.75).unwrap();
        tile.set_biome(2);
        let tile = tile.build().unwrap();
        assert_eq!(tile.id(), TileId(0));
        assert_eq!(tile.channels(), &ChannelValues::new(0.25, 0.5, 0.75));
        assert_eq!(tile.biome_index(), 2);
        assert!(tile.is_pentagon());
    }

    /// Every tile gets 0.5 on every channel, and a single rule with the full
    /// [0,1] ranges classifies all of them
    #[test]
    fn test_classify_uniform_tiles() {
        let config = PlanetConfig {
            subdivisions: 1,
            biomes: BiomeSet::new(vec![BiomeRule::new(
                "everything",
                BiomePayload::Material("grass".into()),
            )])
            .unwrap(),
            ..Default::default()
        };
        let fields = FieldSet::constant(0.0, 0.0, 0.0);
        let mut planet = PlanetBuilder::new(&config, &fields).unwrap();
        for tile in &mut planet.tiles {
            tile.set_height(0.5).unwrap();
            tile.set_moisture(0.5).unwrap();
            tile.set_temperature(0.5).unwrap();
        }
        planet.apply_generator(BiomeGenerator).unwrap();

        let tiles = planet
            .tiles
            .into_iter()
            .map(TileBuilder::build)
            .collect::<anyhow::Result<Vec<_>>>()
            .unwrap();
        assert_eq!(tiles.len(), 42);
        assert_eq!(tiles.iter().filter(|tile| tile.is_pentagon()).count(), 12);
        assert_eq!(tiles.iter().filter(|tile| tile.sides() == 6).count(), 30);
        for tile in &tiles {
            assert_eq!(tile.channels(), &ChannelValues::new(0.5, 0.5, 0.5));
            assert_eq!(tile.biome_index(), 0);
        }
    }

    #[test]
    fn test_generate_planet() {
        let config = PlanetConfig {
            subdivisions: 1,
            biomes: BiomeSet::new(vec![
                BiomeRule::new("low", BiomePayload::Material("a".into()))
                    .with_height(0.0, 0.5),
                BiomeRule::new("high", BiomePayload::Material("b".into())),
            ])
            .unwrap(),
            ..Default::default()
        };
        let fields = FieldSet::constant(0.0, 0.0, 0.0);
        let tiles = PlanetBuilder::new(&config, &fields)
            .unwrap()
            .generate_planet()
            .unwrap();
        assert_eq!(tiles.len(), 42);
        for (i, tile) in tiles.iter().enumerate() {
            assert_eq!(tile.id(), TileId(i));
            // Constant height means zero span, which maps to 0
            assert_eq!(tile.height(), 0.0);
            assert_eq!(tile.biome_index(), 0);
        }
    }
}
