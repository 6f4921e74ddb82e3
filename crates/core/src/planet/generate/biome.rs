use crate::planet::generate::{Generate, PlanetBuilder};
use log::warn;

/// Classify every tile into a biome, using the planet's ordered rule set.
/// This has to run **after every channel has been generated**.
#[derive(Debug)]
pub struct BiomeGenerator;

impl BiomeGenerator {
    /// Lattice resolution used to look for holes in the rule set
    const COVERAGE_STEPS: usize = 10;
}

impl Generate for BiomeGenerator {
    fn generate(&self, planet: &mut PlanetBuilder<'_>) -> anyhow::Result<()> {
        let biomes = &planet.config.biomes;

        let gaps = biomes.coverage_gaps(Self::COVERAGE_STEPS);
        if !gaps.is_empty() {
            let (_, fallback) = biomes.fallback();
            warn!(
                "{} channel combinations aren't covered by any biome rule and \
                will fall back to {:?}, e.g. {:?}",
                gaps.len(),
                fallback.name,
                gaps[0]
            );
        }

        for tile in &mut planet.tiles {
            let (index, _) = biomes.classify(&tile.channels()?);
            tile.set_biome(index);
        }
        Ok(())
    }
}
