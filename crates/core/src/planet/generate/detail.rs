use crate::planet::generate::{Generate, PlanetBuilder};

/// Fill in the optional detail channel. This is a no-op if the planet has
/// no detail field.
#[derive(Debug)]
pub struct DetailGenerator;

impl Generate for DetailGenerator {
    fn generate(&self, planet: &mut PlanetBuilder<'_>) -> anyhow::Result<()> {
        let sampler = planet.sampler();
        for tile in &mut planet.tiles {
            if let Some(detail) = sampler.detail(&tile.polygon().anchor) {
                tile.set_detail(detail)?;
            }
        }
        Ok(())
    }
}
