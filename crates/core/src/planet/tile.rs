use crate::planet::dual::TilePolygon;
use derive_more::{Display, From, Into};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use strum::{Display as StrumDisplay, EnumIter};

/// Unique identifier for a tile. This is the index of the mesh vertex that
/// the tile is anchored on, so IDs are stable for a given subdivision level
/// and tiles are always ordered by ID.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    From,
    Into,
    Serialize,
    Deserialize,
)]
#[display(fmt = "#{}", _0)]
#[serde(transparent)]
pub struct TileId(pub usize);

/// A named scalar field sampled for every tile
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, StrumDisplay)]
#[strum(serialize_all = "snake_case")]
pub enum Channel {
    Height,
    Moisture,
    Temperature,
    /// Optional fourth channel, only present if the planet config defines a
    /// detail noise function
    Detail,
}

/// The final channel values of a tile. Every value is in [0,1].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelValues {
    pub height: f64,
    pub moisture: f64,
    pub temperature: f64,
    pub detail: Option<f64>,
}

impl ChannelValues {
    pub fn new(height: f64, moisture: f64, temperature: f64) -> Self {
        Self {
            height,
            moisture,
            temperature,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: f64) -> Self {
        self.detail = Some(detail);
        self
    }

    /// Get the value of a channel. Only [Channel::Detail] can be missing.
    pub fn get(&self, channel: Channel) -> Option<f64> {
        match channel {
            Channel::Height => Some(self.height),
            Channel::Moisture => Some(self.moisture),
            Channel::Temperature => Some(self.temperature),
            Channel::Detail => self.detail,
        }
    }
}

/// A planet is covered in tiles. Each tile is the dual polygon of one vertex
/// of the subdivided icosahedron: a pentagon for the 12 original icosahedron
/// vertices and a hexagon everywhere else.
///
/// Tiles can't be constructed directly, they can only be made by the
/// generation process. See [Planet::generate](crate::Planet::generate). They
/// also can't be modified after generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub(super) polygon: TilePolygon,
    pub(super) channels: ChannelValues,
    /// Index into the planet's biome set
    pub(super) biome: usize,
}

impl Tile {
    pub fn id(&self) -> TileId {
        self.polygon.id
    }

    /// Direction from the planet center to this tile's anchor vertex. Always
    /// unit length.
    pub fn anchor(&self) -> &Vector3<f64> {
        &self.polygon.anchor
    }

    /// The anchor point scaled out to the planet radius
    pub fn center(&self) -> Point3<f64> {
        self.polygon.center()
    }

    /// Polygon corners on the sphere surface, counter-clockwise as seen from
    /// outside the planet
    pub fn corners(&self) -> &[Point3<f64>] {
        &self.polygon.corners
    }

    /// Adjacent tiles, one per polygon side. Neighbor `i` is across the side
    /// between corners `i` and `i + 1` (wrapping around).
    pub fn neighbors(&self) -> &[TileId] {
        &self.polygon.neighbors
    }

    pub fn polygon(&self) -> &TilePolygon {
        &self.polygon
    }

    /// Number of polygon sides, 5 or 6
    pub fn sides(&self) -> usize {
        self.polygon.corners.len()
    }

    pub fn is_pentagon(&self) -> bool {
        self.sides() == 5
    }

    pub fn channels(&self) -> &ChannelValues {
        &self.channels
    }

    /// Height, normalized across the whole planet to [0,1]
    pub fn height(&self) -> f64 {
        self.channels.height
    }

    pub fn moisture(&self) -> f64 {
        self.channels.moisture
    }

    pub fn temperature(&self) -> f64 {
        self.channels.temperature
    }

    pub fn detail(&self) -> Option<f64> {
        self.channels.detail
    }

    /// Index of this tile's rule in the planet's [BiomeSet](crate::BiomeSet).
    /// Use [Planet::biome_of](crate::Planet::biome_of) to get the rule
    /// itself.
    pub fn biome_index(&self) -> usize {
        self.biome
    }
}
