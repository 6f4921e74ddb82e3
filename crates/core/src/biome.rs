//! Biome rules and the classifier that maps tile channels onto them.

use crate::{
    planet::{Channel, ChannelValues},
    render::Color3,
    util::range::NumRange,
};
use anyhow::{anyhow, bail, Context};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use strum::IntoEnumIterator;

/// What a biome looks like once it's handed off for presentation. The core
/// never interprets this, it just carries it along with the rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiomePayload {
    /// A flat color
    Color(Color3),
    /// A reference to a material defined by whatever consumes the planet
    Material(String),
}

/// A named range predicate over tile channels. A tile matches a rule when
/// every constrained channel value falls within the rule's range for that
/// channel (inclusive on both ends).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiomeRule {
    pub name: String,
    #[serde(default = "NumRange::normal_range")]
    pub height: NumRange,
    #[serde(default = "NumRange::normal_range")]
    pub moisture: NumRange,
    #[serde(default = "NumRange::normal_range")]
    pub temperature: NumRange,
    /// Constraint on the optional detail channel. `None` means the rule
    /// doesn't care about detail. If this is set, tiles without a detail
    /// value never match.
    #[serde(default)]
    pub detail: Option<NumRange>,
    pub payload: BiomePayload,
}

impl BiomeRule {
    /// Create a rule that accepts every channel value. Narrow it down with the
    /// `with_*` methods.
    pub fn new(name: impl Into<String>, payload: BiomePayload) -> Self {
        Self {
            name: name.into(),
            height: NumRange::normal_range(),
            moisture: NumRange::normal_range(),
            temperature: NumRange::normal_range(),
            detail: None,
            payload,
        }
    }

    pub fn with_height(mut self, min: f64, max: f64) -> Self {
        self.height = NumRange::new(min, max);
        self
    }

    pub fn with_moisture(mut self, min: f64, max: f64) -> Self {
        self.moisture = NumRange::new(min, max);
        self
    }

    pub fn with_temperature(mut self, min: f64, max: f64) -> Self {
        self.temperature = NumRange::new(min, max);
        self
    }

    pub fn with_detail(mut self, min: f64, max: f64) -> Self {
        self.detail = Some(NumRange::new(min, max));
        self
    }

    /// Get this rule's constraint for a channel. `None` means unconstrained.
    pub fn range(&self, channel: Channel) -> Option<NumRange> {
        match channel {
            Channel::Height => Some(self.height),
            Channel::Moisture => Some(self.moisture),
            Channel::Temperature => Some(self.temperature),
            Channel::Detail => self.detail,
        }
    }

    /// Does this rule accept the given channel values?
    pub fn matches(&self, channels: &ChannelValues) -> bool {
        Channel::iter().all(|channel| {
            match (self.range(channel), channels.get(channel)) {
                (None, _) => true,
                (Some(range), Some(value)) => range.contains(value),
                (Some(_), None) => false,
            }
        })
    }

    /// The color payload of this rule, if it has one
    pub fn color(&self) -> Option<Color3> {
        match &self.payload {
            BiomePayload::Color(color) => Some(*color),
            BiomePayload::Material(_) => None,
        }
    }
}

/// An ordered, non-empty list of biome rules. Rules are evaluated in order and
/// the first full match wins. If nothing matches, the **last** rule is used,
/// so the classifier always produces a biome.
///
/// An empty set can't be constructed (or deserialized), which is what lets
/// [BiomeSet::classify] be infallible.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<BiomeRule>", into = "Vec<BiomeRule>")]
pub struct BiomeSet {
    rules: Vec<BiomeRule>,
}

impl BiomeSet {
    /// Build a new rule set. Returns an error if there are no rules, if any
    /// rule has a range that isn't an ordered subset of [0,1], or if any
    /// color payload has a component outside [0,1].
    pub fn new(rules: Vec<BiomeRule>) -> anyhow::Result<Self> {
        if rules.is_empty() {
            bail!("biome set must contain at least one rule");
        }
        for rule in &rules {
            for channel in Channel::iter() {
                if let Some(range) = rule.range(channel) {
                    if !range.is_normalized() {
                        return Err(anyhow!(
                            "biome {:?} has invalid {} range {}; \
                            ranges must be ordered and within [0, 1]",
                            rule.name,
                            channel,
                            range
                        ));
                    }
                }
            }
            if let Some(color) = rule.color() {
                color.check_components().with_context(|| {
                    format!("biome {:?} has an invalid color", rule.name)
                })?;
            }
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[BiomeRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Always false, but clippy wants it next to `len`
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Get a rule by its index in this set
    pub fn get(&self, index: usize) -> Option<&BiomeRule> {
        self.rules.get(index)
    }

    /// Classify a set of channel values. Returns the index of the chosen rule
    /// along with the rule itself. Identical inputs always produce the same
    /// rule.
    pub fn classify(&self, channels: &ChannelValues) -> (usize, &BiomeRule) {
        self.rules
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.matches(channels))
            .unwrap_or_else(|| self.fallback())
    }

    /// The rule used when nothing else matches
    pub fn fallback(&self) -> (usize, &BiomeRule) {
        // Never empty, see the constructor
        let index = self.rules.len() - 1;
        (index, &self.rules[index])
    }

    /// Find points in the height/moisture/temperature unit cube that no rule
    /// explicitly matches, so they only get a biome via the fallback. The cube
    /// is sampled as a lattice with `steps` intervals per axis. Tiles are
    /// sampled without a detail value.
    ///
    /// This doesn't change classification at all, it's a way to catch rule
    /// sets whose ranges accidentally leave holes.
    pub fn coverage_gaps(&self, steps: usize) -> Vec<ChannelValues> {
        let steps = steps.max(1);
        let lattice = |i: usize| i as f64 / steps as f64;
        let mut gaps = Vec::new();
        for h in 0..=steps {
            for m in 0..=steps {
                for t in 0..=steps {
                    let channels =
                        ChannelValues::new(lattice(h), lattice(m), lattice(t));
                    if !self.rules.iter().any(|rule| rule.matches(&channels)) {
                        gaps.push(channels);
                    }
                }
            }
        }
        gaps
    }
}

impl TryFrom<Vec<BiomeRule>> for BiomeSet {
    type Error = anyhow::Error;

    fn try_from(rules: Vec<BiomeRule>) -> Result<Self, Self::Error> {
        Self::new(rules)
    }
}

impl From<BiomeSet> for Vec<BiomeRule> {
    fn from(set: BiomeSet) -> Self {
        set.rules
    }
}

impl Default for BiomeSet {
    fn default() -> Self {
        fn color(name: &str, color: Color3) -> BiomeRule {
            BiomeRule::new(name, BiomePayload::Color(color))
        }

        Self {
            rules: vec![
                color("ocean", Color3::new_int(20, 77, 163))
                    .with_height(0.0, 0.35),
                color("coast", Color3::new_int(32, 166, 178))
                    .with_height(0.35, 0.4),
                color("snow", Color3::new_int(191, 191, 191))
                    .with_temperature(0.0, 0.2),
                color("alpine", Color3::new_int(99, 122, 99))
                    .with_height(0.75, 1.0),
                color("desert", Color3::new_int(214, 204, 107))
                    .with_moisture(0.0, 0.2)
                    .with_temperature(0.5, 1.0),
                color("jungle", Color3::new_int(43, 179, 31))
                    .with_moisture(0.6, 1.0)
                    .with_temperature(0.6, 1.0),
                color("forest", Color3::new_int(23, 122, 0))
                    .with_moisture(0.4, 1.0),
                // Catch-all, also the fallback
                color("plains", Color3::new_int(173, 201, 115)),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str) -> BiomeRule {
        BiomeRule::new(name, BiomePayload::Material(name.into()))
    }

    #[test]
    fn test_first_match_wins() {
        let set = BiomeSet::new(vec![
            rule("low").with_height(0.0, 0.5),
            rule("wet").with_moisture(0.5, 1.0),
            rule("any"),
        ])
        .unwrap();

        // Matches both "low" and "wet", but "low" is declared first
        let (index, biome) = set.classify(&ChannelValues::new(0.2, 0.9, 0.5));
        assert_eq!(index, 0);
        assert_eq!(biome.name, "low");

        let (index, biome) = set.classify(&ChannelValues::new(0.8, 0.9, 0.5));
        assert_eq!(index, 1);
        assert_eq!(biome.name, "wet");
    }

    #[test]
    fn test_inclusive_bounds() {
        let set = BiomeSet::new(vec![
            rule("band").with_height(0.25, 0.75),
            rule("other").with_height(0.0, 0.1),
        ])
        .unwrap();
        assert_eq!(set.classify(&ChannelValues::new(0.25, 0.0, 0.0)).0, 0);
        assert_eq!(set.classify(&ChannelValues::new(0.75, 1.0, 1.0)).0, 0);
    }

    #[test]
    fn test_fallback_is_last_rule() {
        let set = BiomeSet::new(vec![
            rule("low").with_height(0.0, 0.2),
            rule("high").with_height(0.8, 1.0),
        ])
        .unwrap();
        // Nothing covers the middle, so we get the last rule even though it
        // doesn't match
        let (index, biome) = set.classify(&ChannelValues::new(0.5, 0.5, 0.5));
        assert_eq!(index, 1);
        assert_eq!(biome.name, "high");
    }

    #[test]
    fn test_deterministic() {
        let set = BiomeSet::default();
        let channels = ChannelValues::new(0.6, 0.3, 0.7);
        let first = set.classify(&channels).0;
        for _ in 0..10 {
            assert_eq!(set.classify(&channels).0, first);
        }
    }

    #[test]
    fn test_detail_constraint() {
        let set = BiomeSet::new(vec![
            rule("rocky").with_detail(0.5, 1.0),
            rule("plain"),
        ])
        .unwrap();

        // No detail value -> a detail-constrained rule can't match
        assert_eq!(set.classify(&ChannelValues::new(0.5, 0.5, 0.5)).0, 1);
        assert_eq!(
            set.classify(&ChannelValues::new(0.5, 0.5, 0.5).with_detail(0.7))
                .0,
            0
        );
        assert_eq!(
            set.classify(&ChannelValues::new(0.5, 0.5, 0.5).with_detail(0.2))
                .0,
            1
        );
    }

    #[test]
    fn test_empty_set_is_invalid() {
        assert!(BiomeSet::new(vec![]).is_err());
        assert!(serde_json::from_str::<BiomeSet>("[]").is_err());
    }

    #[test]
    fn test_invalid_range() {
        let err =
            BiomeSet::new(vec![rule("bad").with_moisture(0.8, 0.2)]).unwrap_err();
        assert!(err.to_string().contains("moisture"), "{}", err);
        assert!(BiomeSet::new(vec![rule("bad").with_height(0.0, 1.5)]).is_err());
    }

    #[test]
    fn test_invalid_color() {
        let color = Color3 {
            red: 1.5,
            green: 0.0,
            blue: 0.0,
        };
        let err = BiomeSet::new(vec![BiomeRule::new(
            "lava",
            BiomePayload::Color(color),
        )])
        .unwrap_err();
        assert!(format!("{:#}", err).contains("red"), "{:#}", err);

        // Deserialized colors go through the same check
        let result = serde_json::from_str::<BiomeSet>(
            r#"[{
                "name": "lava",
                "payload": {"color": {"red": 0.5, "green": -0.2, "blue": 0.0}}
            }]"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_coverage_gaps() {
        // The default set ends with a catch-all, so no gaps
        assert!(BiomeSet::default().coverage_gaps(10).is_empty());

        let set = BiomeSet::new(vec![
            rule("low").with_height(0.0, 0.5),
            rule("high").with_height(0.75, 1.0),
        ])
        .unwrap();
        // Lattice heights at 4 steps are 0, 0.25, 0.5, 0.75 and 1, which all
        // land in a rule, so a coarse lattice misses the hole
        assert!(set.coverage_gaps(4).is_empty());
        let gaps = set.coverage_gaps(10);
        // h = 0.6 and 0.7 are uncovered, for all 11x11 moisture/temperature
        assert_eq!(gaps.len(), 2 * 11 * 11);
        assert!(gaps.iter().all(|c| c.height > 0.5 && c.height < 0.75));
    }

    #[test]
    fn test_deserialize_rule_defaults() {
        let set: BiomeSet = serde_json::from_str(
            r#"[{
                "name": "tundra",
                "temperature": {"min": 0.0, "max": 0.3},
                "payload": {"material": "res://tundra.tres"}
            }]"#,
        )
        .unwrap();
        let rule = &set.rules()[0];
        assert_eq!(rule.height, NumRange::normal_range());
        assert_eq!(rule.temperature, NumRange::new(0.0, 0.3));
        assert_eq!(rule.detail, None);
        assert_eq!(
            rule.payload,
            BiomePayload::Material("res://tundra.tres".into())
        );
    }
}
