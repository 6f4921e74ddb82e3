//! Globe is a geodesic planet generator. A planet is an icosphere whose dual
//! polygons (12 pentagons, everything else hexagons) become tiles, and every
//! tile is classified into a biome from a set of noise-driven channels. This
//! crate contains all the core generation logic. Presentation layers are
//! implemented elsewhere, [PlanetRenderer] only provides a thin adapter.
//!
//! ```
//! use globe::{Planet, PlanetConfig};
//!
//! let config = PlanetConfig {
//!     subdivisions: 2,
//!     ..Default::default()
//! };
//! let planet = Planet::generate(config).unwrap();
//! assert_eq!(planet.tiles().len(), 162);
//! // From here you can display/use the planet however you like.
//! ```
//!
//! See [PlanetConfig] for details on how generation can be customized, and
//! [BiomeSet] for how tiles are classified.

mod biome;
mod config;
pub mod planet;
mod render;
mod util;

pub use crate::{
    biome::{BiomePayload, BiomeRule, BiomeSet},
    config::{
        CellularConfig, CellularDistance, CellularReturn, ClimateConfig,
        DomainWarpConfig, NoiseFnConfig, NoiseFnType, PlanetConfig, Seed,
    },
    planet::{Channel, ChannelValues, Planet, Tile, TileId},
    render::{Color3, PlanetRenderer, RenderConfig, TileLens},
    util::range::{NumRange, RangeValue},
};
