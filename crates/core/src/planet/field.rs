//! Scalar fields over the sphere, and the math that turns raw field samples
//! into tile channel values.

use crate::{
    config::{ClimateConfig, PlanetConfig},
    planet::generate::TileNoiseFn,
    util::range::NumRange,
};
use anyhow::bail;
use nalgebra::{Point3, Vector3};
use rand::Rng;
use std::fmt::{self, Debug};

/// A deterministic function from a point in space to a value. Implementations
/// should return values in `[-1, 1]`; anything outside that is clamped by
/// whatever consumes the value.
pub trait ScalarField {
    fn sample(&self, position: &Point3<f64>) -> f64;
}

impl<F: Fn(&Point3<f64>) -> f64> ScalarField for F {
    fn sample(&self, position: &Point3<f64>) -> f64 {
        self(position)
    }
}

/// A field with the same value everywhere
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ConstantField(pub f64);

impl ScalarField for ConstantField {
    fn sample(&self, _: &Point3<f64>) -> f64 {
        self.0
    }
}

/// The set of fields that feed every tile channel
pub struct FieldSet {
    pub height: Box<dyn ScalarField>,
    pub moisture: Box<dyn ScalarField>,
    pub temperature: Box<dyn ScalarField>,
    pub detail: Option<Box<dyn ScalarField>>,
}

impl FieldSet {
    /// Build noise-backed fields from a planet config. Each function draws
    /// its own seed from the RNG, in channel order.
    pub fn from_config(config: &PlanetConfig, rng: &mut impl Rng) -> Self {
        Self {
            height: Box::new(TileNoiseFn::new(rng, &config.height)),
            moisture: Box::new(TileNoiseFn::new(rng, &config.moisture)),
            temperature: Box::new(TileNoiseFn::new(rng, &config.temperature)),
            detail: config.detail.as_ref().map(|detail| {
                Box::new(TileNoiseFn::new(rng, detail)) as Box<dyn ScalarField>
            }),
        }
    }

    /// Constant fields for the three required channels, and no detail
    pub fn constant(height: f64, moisture: f64, temperature: f64) -> Self {
        Self {
            height: Box::new(ConstantField(height)),
            moisture: Box::new(ConstantField(moisture)),
            temperature: Box::new(ConstantField(temperature)),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl ScalarField + 'static) -> Self {
        self.detail = Some(Box::new(detail));
        self
    }
}

impl Debug for FieldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSet")
            .field("detail", &self.detail.is_some())
            .finish()
    }
}

/// Combines raw field samples with height and latitude to produce channel
/// values. All sampling is done on the unit sphere, so the planet radius
/// never affects the output.
#[derive(Debug)]
pub struct FieldSampler<'a> {
    fields: &'a FieldSet,
    climate: &'a ClimateConfig,
}

impl<'a> FieldSampler<'a> {
    /// Raw noise range that every field is expected to produce
    pub const RAW_RANGE: NumRange = NumRange::new(-1.0, 1.0);
    /// Direction of the planet's rotation axis. Latitude is measured
    /// against it.
    pub const POLAR_AXIS: [f64; 3] = [0.0, 1.0, 0.0];

    pub fn new(fields: &'a FieldSet, climate: &'a ClimateConfig) -> Self {
        Self { fields, climate }
    }

    /// Raw, un-normalized height at a point. Normalize a full set of these
    /// with [Self::normalize_heights].
    pub fn raw_height(&self, anchor: &Vector3<f64>) -> f64 {
        self.fields.height.sample(&Point3::from(*anchor))
    }

    /// Min-max normalize a full set of raw heights to [0,1]. If every height
    /// is identical there's no meaningful scale, so everything maps to 0.
    pub fn normalize_heights(raw: &[f64]) -> anyhow::Result<Vec<f64>> {
        if let Some(value) = raw.iter().find(|value| !value.is_finite()) {
            bail!("non-finite raw height {}", value);
        }
        Ok(match NumRange::from_values(raw.iter().copied()) {
            Some(range) => raw.iter().map(|&h| range.normalize(h)).collect(),
            None => Vec::new(),
        })
    }

    /// Moisture at a point, given that point's normalized height
    pub fn moisture(&self, anchor: &Vector3<f64>, height: f64) -> f64 {
        let raw = self.fields.moisture.sample(&Point3::from(*anchor));
        moisture(raw, height, &self.climate.moisture_falloff)
    }

    /// Temperature at a point, given that point's normalized height
    pub fn temperature(&self, anchor: &Vector3<f64>, height: f64) -> f64 {
        let raw = self.fields.temperature.sample(&Point3::from(*anchor));
        temperature(
            latitude_factor(anchor),
            raw,
            height,
            &self.climate.temperature_falloff,
        )
    }

    /// Detail at a point, or `None` if there's no detail field
    pub fn detail(&self, anchor: &Vector3<f64>) -> Option<f64> {
        self.fields
            .detail
            .as_ref()
            .map(|field| detail(field.sample(&Point3::from(*anchor))))
    }
}

/// 1.0 at the equator, 0.0 at the poles
pub fn latitude_factor(anchor: &Vector3<f64>) -> f64 {
    let [x, y, z] = FieldSampler::POLAR_AXIS;
    let axis = Vector3::new(x, y, z);
    match anchor.try_normalize(f64::EPSILON) {
        Some(direction) => 1.0 - direction.dot(&axis).abs().min(1.0),
        None => 0.0,
    }
}

/// 1.0 below the band, 0.0 above it, falling linearly across it
pub fn falloff(band: &NumRange, height: f64) -> f64 {
    if height <= band.min {
        1.0
    } else if height >= band.max {
        0.0
    } else {
        band.value(height).normalize().invert().inner()
    }
}

pub fn moisture(raw: f64, height: f64, band: &NumRange) -> f64 {
    let raw = FieldSampler::RAW_RANGE.clamp(raw);
    NumRange::normal_range().clamp(0.7 * raw + 0.3 * falloff(band, height))
}

pub fn temperature(latitude: f64, raw: f64, height: f64, band: &NumRange) -> f64 {
    let raw = FieldSampler::RAW_RANGE.clamp(raw);
    NumRange::normal_range()
        .clamp(0.6 * latitude + 0.3 * falloff(band, height) + 0.1 * raw)
}

/// Map raw noise from [-1,1] onto [0,1]
pub fn detail(raw: f64) -> f64 {
    FieldSampler::RAW_RANGE
        .value(raw)
        .clamp()
        .normalize()
        .inner()
}
