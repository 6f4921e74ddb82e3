use crate::NumRange;
use anyhow::Context;
use serde::{Deserialize, Serialize};

/// An RGB color. Values are stored as floats between 0 and 1 (inclusive).
/// This uses f32 because the extra precision from f64 is pointless.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color3 {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl Color3 {
    /// The valid range of values for each component in RGB
    const COMPONENT_RANGE: NumRange<f32> = NumRange::new(0.0, 1.0);

    /// Create a new RGB color with components in the range [0.0, 1.0]. Panic
    /// if any of the components are out of range
    pub fn new(red: f32, green: f32, blue: f32) -> Self {
        fn check_component(component_name: &str, value: f32) -> f32 {
            if Color3::COMPONENT_RANGE.contains(value) {
                value
            } else {
                panic!(
                    "Color component {} must be in {}, but was {}",
                    component_name,
                    Color3::COMPONENT_RANGE,
                    value
                )
            }
        }

        Self {
            red: check_component("red", red),
            green: check_component("green", green),
            blue: check_component("blue", blue),
        }
    }

    /// Create a new RGB color from integer components in the [0,255] range.
    pub const fn new_int(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
        }
    }

    /// Average a set of colors, component-wise. Returns `None` for an empty
    /// input.
    pub fn mean(colors: impl IntoIterator<Item = Color3>) -> Option<Self> {
        let (sum, count) = colors.into_iter().fold(
            ((0.0f32, 0.0f32, 0.0f32), 0usize),
            |((r, g, b), count), color| {
                ((r + color.red, g + color.green, b + color.blue), count + 1)
            },
        );
        if count == 0 {
            return None;
        }
        let n = count as f32;
        Some(Self {
            red: Self::COMPONENT_RANGE.clamp(sum.0 / n),
            green: Self::COMPONENT_RANGE.clamp(sum.1 / n),
            blue: Self::COMPONENT_RANGE.clamp(sum.2 / n),
        })
    }

    /// Check that every component is within [0,1]. Colors built with
    /// [Self::new] always are, but deserialized colors skip that check.
    pub fn check_components(&self) -> anyhow::Result<()> {
        for (name, value) in
            [("red", self.red), ("green", self.green), ("blue", self.blue)]
        {
            Self::COMPONENT_RANGE
                .ensure_contains(value)
                .with_context(|| format!("invalid {} component", name))?;
        }
        Ok(())
    }

    /// Convert this number to a set of 3 bytes: `(red, green, blue)`
    pub fn to_ints(self) -> (u8, u8, u8) {
        (
            (self.red * 255.0).round() as u8,
            (self.green * 255.0).round() as u8,
            (self.blue * 255.0).round() as u8,
        )
    }

    /// Convert this color to an HTML color code: `#rrggbb`
    pub fn to_html(self) -> String {
        let (r, g, b) = self.to_ints();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}
