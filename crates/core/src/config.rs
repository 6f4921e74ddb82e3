mod seed;

pub use seed::Seed;

use crate::{biome::BiomeSet, util::range::NumRange};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Configuration that defines a planet gen process. Two planets generated
/// with the same config will always be identical.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PlanetConfig {
    /// RNG seed to use for all randomized processes during planet gen. Each
    /// noise function gets its own seed, drawn from an RNG seeded with this.
    /// See [Seed] for the accepted formats.
    pub seed: Seed,

    /// Number of times the base icosahedron is subdivided. Every level
    /// quadruples the face count, so the tile count is `10 * 4^n + 2`. 0
    /// gives the 12 pentagons of a dodecahedron, 5 gives 10242 tiles.
    #[validate(range(min = 0, max = 10))]
    pub subdivisions: u32,

    /// Distance from the center of the planet to each tile's anchor point.
    /// This scales tile geometry only, sampling is always done on the unit
    /// sphere so changing the radius never changes the biome layout.
    #[validate(custom = "validate_positive")]
    pub radius: f64,

    /// Noise function for raw height values. Heights are normalized to
    /// [0,1] across the whole planet after sampling, so only the relative
    /// shape of this function matters.
    #[validate]
    pub height: NoiseFnConfig,

    /// Noise function for the random component of moisture
    #[validate]
    pub moisture: NoiseFnConfig,

    /// Noise function for the random component of temperature
    #[validate]
    pub temperature: NoiseFnConfig,

    /// Optional noise function for a fourth "detail" channel. If this is
    /// `None`, tiles have no detail value, and any biome rule that
    /// constrains detail can never match.
    #[validate]
    pub detail: Option<NoiseFnConfig>,

    /// Controls how height feeds into moisture and temperature
    #[validate]
    pub climate: ClimateConfig,

    /// Ordered rules used to classify each tile into a biome. The first rule
    /// that matches a tile wins, and the last rule doubles as the fallback.
    pub biomes: BiomeSet,
}

/// Config for a particular noise generation function. We use
/// https://crates.io/crates/noise for noise generation. This type is generic,
/// i.e. not specific to a particular channel, so as such it has no default
/// implementation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
pub struct NoiseFnConfig {
    pub noise_type: NoiseFnType,

    /// Number of different frequencies to add together. Ignored by
    /// [NoiseFnType::Worley], which is single-octave.
    #[validate(range(min = 1, max = 32))]
    pub octaves: usize,

    /// The frequency of the first (lowest) octave. Inputs are points on the
    /// unit sphere, so a frequency of 1.0 spans roughly one feature per
    /// hemisphere.
    #[validate(range(min = 0.0))]
    pub frequency: f64,

    /// Frequency multiplier between successive octaves
    pub lacunarity: f64,

    /// Amplitude multiplier between successive octaves (AKA gain). The first
    /// amplitude is always 1.0, so with 3 octaves and a persistence of 0.5
    /// your amplitudes will be `[1.0, 0.5, 0.25]`.
    pub persistence: f64,

    /// Optionally offset each sample point by a secondary noise field before
    /// evaluating the main function. This breaks up the regular look of
    /// plain fractal noise.
    #[serde(default)]
    #[validate]
    pub domain_warp: Option<DomainWarpConfig>,

    /// Cellular settings, only used by [NoiseFnType::Worley]. Falls back to
    /// [CellularConfig::default] if unset.
    #[serde(default)]
    pub cellular: Option<CellularConfig>,
}

/// The different types of supported noise functions. All of these are
/// seedable and, except for Worley, multi-fractal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseFnType {
    BasicMulti,
    Billow,
    Fbm,
    HybridMulti,
    RidgedMulti,
    /// Cellular noise. See [CellularConfig].
    Worley,
}

/// Domain warping: each sample point is pushed by
/// `amplitude * warp_noise(point * frequency)` along each axis.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
pub struct DomainWarpConfig {
    #[validate(range(min = 0.0))]
    pub amplitude: f64,
    #[validate(range(min = 0.0))]
    pub frequency: f64,
}

/// Settings for cellular (Worley) noise
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellularConfig {
    pub distance: CellularDistance,
    pub return_type: CellularReturn,
}

/// The distance metric used to find the nearest cell point
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellularDistance {
    Euclidean,
    Manhattan,
    Chebyshev,
}

impl Default for CellularDistance {
    fn default() -> Self {
        Self::Euclidean
    }
}

/// What a cellular function outputs: the distance to the nearest cell point,
/// or a constant value per cell
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellularReturn {
    Distance,
    Value,
}

impl Default for CellularReturn {
    fn default() -> Self {
        Self::Distance
    }
}

/// Configuration for how height biases the moisture and temperature
/// channels. Both bands are expressed in normalized height, i.e. [0,1].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ClimateConfig {
    /// Height band where the elevation moisture bias falls off. Below the
    /// band, the bias is 1.0. Across the band it falls linearly, and above it
    /// the bias is 0.0, so high ground is dry.
    #[validate(custom = "validate_band")]
    pub moisture_falloff: NumRange,

    /// Height band where the elevation temperature term falls off, with the
    /// same shape as [Self::moisture_falloff]. High ground is cold.
    #[validate(custom = "validate_band")]
    pub temperature_falloff: NumRange,
}

impl Default for PlanetConfig {
    fn default() -> Self {
        // This should produce a nice looking planet. If you change the
        // defaults, generate a few and look at them.
        Self {
            // Danger! This means the default will vary between calls!
            seed: Seed::Int(rand::random()),

            subdivisions: 4,
            radius: 1.0,
            height: NoiseFnConfig {
                noise_type: NoiseFnType::Fbm,
                octaves: 5,
                frequency: 1.5,
                lacunarity: 2.0,
                persistence: 0.5,
                domain_warp: Some(DomainWarpConfig {
                    amplitude: 0.25,
                    frequency: 1.0,
                }),
                cellular: None,
            },
            moisture: NoiseFnConfig {
                noise_type: NoiseFnType::Fbm,
                octaves: 3,
                frequency: 2.0,
                lacunarity: 2.0,
                persistence: 0.5,
                domain_warp: None,
                cellular: None,
            },
            temperature: NoiseFnConfig {
                noise_type: NoiseFnType::Fbm,
                octaves: 2,
                frequency: 1.0,
                lacunarity: 2.0,
                persistence: 0.5,
                domain_warp: None,
                cellular: None,
            },
            detail: None,
            climate: ClimateConfig::default(),
            biomes: BiomeSet::default(),
        }
    }
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            moisture_falloff: NumRange::new(0.4, 0.9),
            temperature_falloff: NumRange::new(0.4, 0.9),
        }
    }
}

fn validate_positive(value: f64) -> Result<(), ValidationError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new("positive"))
    }
}

fn validate_band(band: &NumRange) -> Result<(), ValidationError> {
    if band.is_normalized() {
        Ok(())
    } else {
        Err(ValidationError::new("normalized_band"))
    }
}
