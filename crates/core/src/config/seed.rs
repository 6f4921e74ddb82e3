use derive_more::Display;
use serde::{
    de::{self, MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use std::{convert::TryInto, fmt};

/// RNG seed to use for all randomized processes during planet generation.
///
/// When deserializing, this type supports a few options:
/// - An integer that fits into `u64` becomes [Seed::Int]
/// - A map `{"int": "<digits>"}` also becomes [Seed::Int]. This is how
///   seeds too big for a signed 64-bit integer are written out, since TOML
///   can't hold them.
/// - Any string becomes [Seed::Text], even if it looks like a number. Text
///   is always hashed, so `"42"` and `42` are different seeds.
/// - Anything else (negative or out of range number, float, array, etc.)
///   is an error
///
/// Serialization mirrors that, so every seed survives a round trip without
/// changing variant.
#[derive(Clone, Debug, Display, PartialEq, Eq)]
pub enum Seed {
    /// An integer seed, which can be used directly
    Int(u64),
    /// A textual string, which will be hashed into a u64 before use
    Text(String),
}

impl Seed {
    /// Key used for integer seeds that don't fit in an `i64`
    const INT_KEY: &'static str = "int";

    /// Convert the seed to a `u64`, so it can actually be used in an RNG
    /// machine.
    pub fn to_u64(&self) -> u64 {
        match self {
            Self::Int(seed) => *seed,
            Self::Text(text) => Self::hash_text(text),
        }
    }

    /// Polynomial string hash: start at 23, then `hash * 31 + c` for each
    /// character, with wrapping 32-bit signed arithmetic. Collisions are
    /// acceptable, this only has to be stable across runs and platforms. The
    /// bits of the final `i32` are reinterpreted as unsigned.
    fn hash_text(text: &str) -> u64 {
        let hash = text.chars().fold(23i32, |hash, c| {
            hash.wrapping_mul(31).wrapping_add(c as i32)
        });
        u64::from(hash as u32)
    }
}

impl From<u64> for Seed {
    fn from(seed: u64) -> Self {
        Self::Int(seed)
    }
}

/// Strings are always text seeds. Use [Seed::Int] for an exact number.
impl From<&str> for Seed {
    fn from(seed: &str) -> Self {
        Self::Text(seed.into())
    }
}

impl From<&Seed> for u64 {
    fn from(seed: &Seed) -> Self {
        seed.to_u64()
    }
}

impl Serialize for Seed {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match self {
            Self::Int(seed) if *seed <= i64::MAX as u64 => {
                serializer.serialize_u64(*seed)
            }
            Self::Int(seed) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(Self::INT_KEY, &seed.to_string())?;
                map.end()
            }
            Self::Text(text) => serializer.serialize_str(text),
        }
    }
}

impl<'de> Deserialize<'de> for Seed {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        // Ints, strings and maps are all valid, so no type hint here
        deserializer.deserialize_any(SeedVisitor)
    }
}

/// Macro to make it easier to implement visit logic for different types
macro_rules! impl_visit {
    ($fname:ident, $type:ty) => {
        fn $fname<E>(self, value: $type) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            value
                .try_into()
                .map(Seed::Int)
                .map_err(|_| E::custom(format!("u64 out of range: {}", value)))
        }
    };
}

struct SeedVisitor;

impl<'de> Visitor<'de> for SeedVisitor {
    type Value = Seed;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter
            .write_str("a positive integer, a string, or {\"int\": string}")
    }

    impl_visit!(visit_u8, u8);
    impl_visit!(visit_u16, u16);
    impl_visit!(visit_u32, u32);
    impl_visit!(visit_u64, u64);
    impl_visit!(visit_u128, u128);
    impl_visit!(visit_i8, i8);
    impl_visit!(visit_i16, i16);
    impl_visit!(visit_i32, i32);
    impl_visit!(visit_i64, i64);
    impl_visit!(visit_i128, i128);

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(value.into())
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let key: String = map.next_key()?.ok_or_else(|| {
            <A::Error as de::Error>::missing_field(Seed::INT_KEY)
        })?;
        if key != Seed::INT_KEY {
            return Err(de::Error::unknown_field(&key, &[Seed::INT_KEY]));
        }
        let value: String = map.next_value()?;
        if let Some(extra) = map.next_key::<String>()? {
            return Err(de::Error::unknown_field(&extra, &[Seed::INT_KEY]));
        }
        value.parse().map(Seed::Int).map_err(|_| {
            de::Error::custom(format!("invalid integer seed: {:?}", value))
        })
    }
}
