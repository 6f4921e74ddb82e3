use crate::planet::generate::{Generate, PlanetBuilder};

/// Generate moisture from noise, biased so that low ground is wet and high
/// ground is dry. This has to run **after height generation**.
#[derive(Debug)]
pub struct MoistureGenerator;

impl Generate for MoistureGenerator {
    fn generate(&self, planet: &mut PlanetBuilder<'_>) -> anyhow::Result<()> {
        let sampler = planet.sampler();
        for tile in &mut planet.tiles {
            let moisture =
                sampler.moisture(&tile.polygon().anchor, tile.height()?);
            tile.set_moisture(moisture)?;
        }
        Ok(())
    }
}

/// Generate temperature from latitude, height and a bit of noise. Equator
/// is warm, poles and peaks are cold. This has to run **after height
/// generation**.
#[derive(Debug)]
pub struct TemperatureGenerator;

impl Generate for TemperatureGenerator {
    fn generate(&self, planet: &mut PlanetBuilder<'_>) -> anyhow::Result<()> {
        let sampler = planet.sampler();
        for tile in &mut planet.tiles {
            let temperature =
                sampler.temperature(&tile.polygon().anchor, tile.height()?);
            tile.set_temperature(temperature)?;
        }
        Ok(())
    }
}
