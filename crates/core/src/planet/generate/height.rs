use crate::planet::{
    field::FieldSampler,
    generate::{Generate, PlanetBuilder},
};

/// Sample raw height for every tile, then normalize the whole planet to
/// [0,1]. The lowest tile always ends up at 0 and the highest at 1.
#[derive(Debug)]
pub struct HeightGenerator;

impl Generate for HeightGenerator {
    fn generate(&self, planet: &mut PlanetBuilder<'_>) -> anyhow::Result<()> {
        let sampler = planet.sampler();
        let raw: Vec<f64> = planet
            .tiles
            .iter()
            .map(|tile| sampler.raw_height(&tile.polygon().anchor))
            .collect();
        let heights = FieldSampler::normalize_heights(&raw)?;

        for (tile, height) in planet.tiles.iter_mut().zip(heights) {
            tile.set_height(height)?;
        }
        Ok(())
    }
}
