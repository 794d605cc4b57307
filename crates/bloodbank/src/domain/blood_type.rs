use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// ABO blood group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AboGroup {
    A,
    B,
    AB,
    O,
}

impl AboGroup {
    pub const fn label(self) -> &'static str {
        match self {
            AboGroup::A => "A",
            AboGroup::B => "B",
            AboGroup::AB => "AB",
            AboGroup::O => "O",
        }
    }
}

/// Rhesus factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RhFactor {
    Positive,
    Negative,
}

impl RhFactor {
    pub const fn symbol(self) -> &'static str {
        match self {
            RhFactor::Positive => "+",
            RhFactor::Negative => "-",
        }
    }
}

/// Blood type keyed by ABO group and Rh factor; the primary key of the stock ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BloodType {
    pub abo: AboGroup,
    pub rh: RhFactor,
}

impl BloodType {
    pub const ALL: [BloodType; 8] = [
        BloodType::new(AboGroup::A, RhFactor::Positive),
        BloodType::new(AboGroup::A, RhFactor::Negative),
        BloodType::new(AboGroup::B, RhFactor::Positive),
        BloodType::new(AboGroup::B, RhFactor::Negative),
        BloodType::new(AboGroup::AB, RhFactor::Positive),
        BloodType::new(AboGroup::AB, RhFactor::Negative),
        BloodType::new(AboGroup::O, RhFactor::Positive),
        BloodType::new(AboGroup::O, RhFactor::Negative),
    ];

    pub const fn new(abo: AboGroup, rh: RhFactor) -> Self {
        Self { abo, rh }
    }

    pub const fn label(self) -> &'static str {
        match (self.abo, self.rh) {
            (AboGroup::A, RhFactor::Positive) => "A+",
            (AboGroup::A, RhFactor::Negative) => "A-",
            (AboGroup::B, RhFactor::Positive) => "B+",
            (AboGroup::B, RhFactor::Negative) => "B-",
            (AboGroup::AB, RhFactor::Positive) => "AB+",
            (AboGroup::AB, RhFactor::Negative) => "AB-",
            (AboGroup::O, RhFactor::Positive) => "O+",
            (AboGroup::O, RhFactor::Negative) => "O-",
        }
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raised when a label is not one of the eight conventional blood types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised blood type '{0}' (expected one of A+, A-, B+, B-, AB+, AB-, O+, O-)")]
pub struct BloodTypeParseError(pub String);

impl FromStr for BloodType {
    type Err = BloodTypeParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let (group, sign) = match trimmed.char_indices().last() {
            Some((index, sign)) => (&trimmed[..index], sign),
            None => return Err(BloodTypeParseError(raw.to_string())),
        };

        let rh = match sign {
            '+' => RhFactor::Positive,
            '-' | '\u{2212}' => RhFactor::Negative,
            _ => return Err(BloodTypeParseError(raw.to_string())),
        };

        let abo = match group.to_ascii_uppercase().as_str() {
            "A" => AboGroup::A,
            "B" => AboGroup::B,
            "AB" => AboGroup::AB,
            "O" => AboGroup::O,
            _ => return Err(BloodTypeParseError(raw.to_string())),
        };

        Ok(Self::new(abo, rh))
    }
}

impl TryFrom<String> for BloodType {
    type Error = BloodTypeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BloodType> for String {
    fn from(value: BloodType) -> Self {
        value.label().to_string()
    }
}
