use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer, Serialize};

/// Version of the scale-factor table below. Bump whenever a variant or a
/// recognized label changes meaning.
pub const UNIT_TABLE_VERSION: u32 = 1;

/// Scale in which a reported figure is expressed.
///
/// Closed set: anything an upstream extractor produces that is not recognized
/// is read as [`UnitTag::Base`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitTag {
    /// Single currency units / single shares
    #[default]
    Base,
    Thousands,
    Millions,
    Billions,
}

impl UnitTag {
    pub const ALL: [UnitTag; 4] = [
        UnitTag::Base,
        UnitTag::Thousands,
        UnitTag::Millions,
        UnitTag::Billions,
    ];

    /// Multiplier that converts a value in this unit into base units.
    pub fn factor(self) -> Decimal {
        match self {
            UnitTag::Base => Decimal::ONE,
            UnitTag::Thousands => dec!(1000),
            UnitTag::Millions => dec!(1000000),
            UnitTag::Billions => dec!(1000000000),
        }
    }

    /// Parse a free-form unit label. Unknown labels fall back to `Base`.
    pub fn parse_lenient(label: &str) -> UnitTag {
        let key = label.trim().to_lowercase();
        match key.as_str() {
            "" | "base" | "unit" | "units" | "円" | "株" | "yen" | "shares" => UnitTag::Base,
            "thousand" | "thousands" | "k" | "千" | "千円" | "千株" | "thousand_yen"
            | "thousand_shares" => UnitTag::Thousands,
            "million" | "millions" | "m" | "mm" | "mn" | "百万" | "百万円" | "百万株"
            | "million_yen" | "million_shares" => UnitTag::Millions,
            "billion" | "billions" | "bn" | "十億" | "十億円" | "billion_yen" => {
                UnitTag::Billions
            }
            _ => {
                tracing::debug!(label = %label, "unrecognized unit label, treating as base units");
                UnitTag::Base
            }
        }
    }
}

impl From<&str> for UnitTag {
    fn from(label: &str) -> Self {
        UnitTag::parse_lenient(label)
    }
}

impl std::fmt::Display for UnitTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitTag::Base => write!(f, "base"),
            UnitTag::Thousands => write!(f, "thousands"),
            UnitTag::Millions => write!(f, "millions"),
            UnitTag::Billions => write!(f, "billions"),
        }
    }
}

// Null, a missing key and unknown labels all deserialize to `Base`.
impl<'de> Deserialize<'de> for UnitTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label: Option<String> = Option::deserialize(deserializer)?;
        Ok(label
            .as_deref()
            .map(UnitTag::parse_lenient)
            .unwrap_or_default())
    }
}

/// Convert `value` expressed in `unit` into base units.
///
/// `None` when the scaled value does not fit in a `Decimal`. Not idempotent
/// for scaling tags: normalize each figure exactly once.
pub fn normalize(value: Decimal, unit: UnitTag) -> Option<Decimal> {
    value.checked_mul(unit.factor())
}
