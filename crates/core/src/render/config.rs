use crate::render::TileLens;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Configuration specific to visually rendering a planet. These options have
/// absolutely no bearing on planet _generation_, only on the visual
/// presentation. In other words, if you generate a planet then output to a
/// non-visual format (e.g. JSON or binary), these options will **never**
/// affect that output.
///
/// Not all render options apply to all render output formats. The
/// documentation for each field will list which formats it applies to.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RenderConfig {
    /// How far a tile is pushed outward from the sphere, relative to the
    /// planet radius, at maximum height. With a scale of 0.1 on a planet of
    /// radius 1.0, the highest tile sits at 1.1 and the lowest at 1.0. A
    /// scale of 0 renders a perfectly smooth sphere.
    ///
    /// ## Relevant Formats
    /// - STL
    #[validate(range(min = 0.0))]
    pub relief_scale: f64,

    /// A tile lens controls what information is used to determine the
    /// appearance of each tile. For example, [TileLens::Biome] means color
    /// is based entirely on biome.
    ///
    /// ## Relevant Formats
    /// - Anything that consumes [PlanetRenderer::tile_color](crate::PlanetRenderer::tile_color)
    pub tile_lens: TileLens,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            relief_scale: 0.05,
            tile_lens: TileLens::Biome,
        }
    }
}
