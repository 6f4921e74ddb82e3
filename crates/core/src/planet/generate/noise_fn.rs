use crate::{
    config::{
        CellularConfig, CellularDistance, CellularReturn, DomainWarpConfig,
        NoiseFnConfig, NoiseFnType,
    },
    planet::field::ScalarField,
    util::range::NumRange,
};
use nalgebra::Point3;
use noise::{
    core::worley::{distance_functions, ReturnType},
    BasicMulti, Billow, Fbm, HybridMulti, MultiFractal, NoiseFn, Perlin,
    RidgedMulti, Worley,
};
use rand::Rng;
use std::fmt::{self, Debug};

/// A wrapper around a noise function that makes it easy to sample for tile
/// values. This is initialized from a [NoiseFnConfig], and takes points on
/// the unit sphere. Output is always in [-1,1].
pub struct TileNoiseFn {
    /// The noise generation function
    noise_fn: Box<dyn NoiseFn<f64, 3>>,
    noise_type: NoiseFnType,
    warp: Option<DomainWarp>,
}

impl TileNoiseFn {
    /// The output range of the internal noise functions. A few of them can
    /// overshoot this a bit, so output is clamped to it.
    const OUTPUT_RANGE: NumRange = NumRange::new(-1.0, 1.0);

    /// Initialize a new function from config. Draws one seed from the RNG for
    /// the function itself, plus one more if domain warping is enabled.
    pub fn new(rng: &mut impl Rng, fn_config: &NoiseFnConfig) -> Self {
        // Gen a new seed so that we get a different one per function
        let seed: u32 = rng.gen();
        let noise_fn: Box<dyn NoiseFn<f64, 3>> = match fn_config.noise_type {
            NoiseFnType::BasicMulti => Box::new(
                BasicMulti::<Perlin>::new(seed)
                    .set_octaves(fn_config.octaves)
                    .set_frequency(fn_config.frequency)
                    .set_lacunarity(fn_config.lacunarity)
                    .set_persistence(fn_config.persistence),
            ),
            NoiseFnType::Billow => Box::new(
                Billow::<Perlin>::new(seed)
                    .set_octaves(fn_config.octaves)
                    .set_frequency(fn_config.frequency)
                    .set_lacunarity(fn_config.lacunarity)
                    .set_persistence(fn_config.persistence),
            ),
            NoiseFnType::Fbm => Box::new(
                Fbm::<Perlin>::new(seed)
                    .set_octaves(fn_config.octaves)
                    .set_frequency(fn_config.frequency)
                    .set_lacunarity(fn_config.lacunarity)
                    .set_persistence(fn_config.persistence),
            ),
            NoiseFnType::HybridMulti => Box::new(
                HybridMulti::<Perlin>::new(seed)
                    .set_octaves(fn_config.octaves)
                    .set_frequency(fn_config.frequency)
                    .set_lacunarity(fn_config.lacunarity)
                    .set_persistence(fn_config.persistence),
            ),
            NoiseFnType::RidgedMulti => Box::new(
                RidgedMulti::<Perlin>::new(seed)
                    .set_octaves(fn_config.octaves)
                    .set_frequency(fn_config.frequency)
                    .set_lacunarity(fn_config.lacunarity)
                    .set_persistence(fn_config.persistence),
            ),
            NoiseFnType::Worley => Box::new(worley(
                seed,
                fn_config.frequency,
                fn_config.cellular.unwrap_or_default(),
            )),
        };

        let warp = fn_config
            .domain_warp
            .map(|warp_config| DomainWarp::new(rng.gen(), warp_config));

        Self {
            noise_fn,
            noise_type: fn_config.noise_type,
            warp,
        }
    }

    /// Get the function output at the given point
    pub fn get(&self, point: &Point3<f64>) -> f64 {
        let point = match &self.warp {
            Some(warp) => warp.apply(point),
            None => *point,
        };
        // NaN passes through the clamp untouched, and is rejected later
        Self::OUTPUT_RANGE.clamp(self.noise_fn.get([point.x, point.y, point.z]))
    }
}

impl ScalarField for TileNoiseFn {
    fn sample(&self, position: &Point3<f64>) -> f64 {
        self.get(position)
    }
}

impl Debug for TileNoiseFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TileNoiseFn")
            .field("noise_type", &self.noise_type)
            .field("warp", &self.warp)
            .finish()
    }
}

fn worley(seed: u32, frequency: f64, cellular: CellularConfig) -> Worley {
    let worley = Worley::new(seed).set_frequency(frequency);
    let worley = match cellular.distance {
        CellularDistance::Euclidean => {
            worley.set_distance_function(distance_functions::euclidean)
        }
        CellularDistance::Manhattan => {
            worley.set_distance_function(distance_functions::manhattan)
        }
        CellularDistance::Chebyshev => {
            worley.set_distance_function(distance_functions::chebyshev)
        }
    };
    worley.set_return_type(match cellular.return_type {
        CellularReturn::Distance => ReturnType::Distance,
        CellularReturn::Value => ReturnType::Value,
    })
}

/// Offsets each sample point by a vector of three independent Perlin fields
#[derive(Clone, Debug)]
struct DomainWarp {
    offsets: [Perlin; 3],
    config: DomainWarpConfig,
}

impl DomainWarp {
    fn new(seed: u32, config: DomainWarpConfig) -> Self {
        Self {
            offsets: [
                Perlin::new(seed),
                Perlin::new(seed.wrapping_add(1)),
                Perlin::new(seed.wrapping_add(2)),
            ],
            config,
        }
    }

    fn apply(&self, point: &Point3<f64>) -> Point3<f64> {
        let input = [
            point.x * self.config.frequency,
            point.y * self.config.frequency,
            point.z * self.config.frequency,
        ];
        let [x, y, z] = &self.offsets;
        Point3::new(
            point.x + self.config.amplitude * x.get(input),
            point.y + self.config.amplitude * y.get(input),
            point.z + self.config.amplitude * z.get(input),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlanetConfig;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn noise_config(noise_type: NoiseFnType) -> NoiseFnConfig {
        NoiseFnConfig {
            noise_type,
            ..PlanetConfig::default().height
        }
    }

    fn sample_points() -> Vec<Point3<f64>> {
        (0..50)
            .map(|i| {
                let t = i as f64 * 0.37;
                Point3::from(
                    nalgebra::Vector3::new(t.cos(), (t * 1.3).sin(), t.sin())
                        .normalize(),
                )
            })
            .collect()
    }

    #[test]
    fn test_output_in_range() {
        let types = [
            NoiseFnType::BasicMulti,
            NoiseFnType::Billow,
            NoiseFnType::Fbm,
            NoiseFnType::HybridMulti,
            NoiseFnType::RidgedMulti,
            NoiseFnType::Worley,
        ];
        let mut rng = Pcg64::seed_from_u64(17);
        for &noise_type in &types {
            let noise_fn = TileNoiseFn::new(&mut rng, &noise_config(noise_type));
            for point in sample_points() {
                let value = noise_fn.sample(&point);
                assert!((-1.0..=1.0).contains(&value), "{:?}: {}", noise_type, value);
            }
        }
    }

    #[test]
    fn test_same_seed_same_output() {
        let config = noise_config(NoiseFnType::Fbm);
        let a = TileNoiseFn::new(&mut Pcg64::seed_from_u64(3), &config);
        let b = TileNoiseFn::new(&mut Pcg64::seed_from_u64(3), &config);
        for point in sample_points() {
            assert_eq!(a.get(&point), b.get(&point));
        }
    }

    #[test]
    fn test_domain_warp_changes_output() {
        let plain = NoiseFnConfig {
            domain_warp: None,
            ..noise_config(NoiseFnType::Fbm)
        };
        let warped = NoiseFnConfig {
            domain_warp: Some(DomainWarpConfig {
                amplitude: 0.5,
                frequency: 2.0,
            }),
            ..plain.clone()
        };
        let a = TileNoiseFn::new(&mut Pcg64::seed_from_u64(3), &plain);
        let b = TileNoiseFn::new(&mut Pcg64::seed_from_u64(3), &warped);
        assert!(sample_points()
            .iter()
            .any(|point| (a.get(point) - b.get(point)).abs() > 1e-9));
    }
}
