use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DigitClassError {
    #[error("unknown digit class: {0}")]
    Unknown(String),
}

/// Inclusive operand range for a digit class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DigitRange {
    pub min: u64,
    pub max: u64,
}

/// Named bucket of operand magnitudes.
///
/// Each digit count comes in two flavours: "below" a power of ten and
/// "at or above" it. The wire form is the short code (`"2d<100"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DigitClass {
    #[default]
    OneDigitBelowTen,
    OneDigitFromTen,
    TwoDigitBelowHundred,
    TwoDigitFromHundred,
    ThreeDigitBelowThousand,
    ThreeDigitFromThousand,
    FourDigitBelowTenThousand,
    FourDigitFromTenThousand,
    FiveDigitBelowHundredThousand,
    FiveDigitFromHundredThousand,
}

impl DigitClass {
    pub const ALL: [DigitClass; 10] = [
        DigitClass::OneDigitBelowTen,
        DigitClass::OneDigitFromTen,
        DigitClass::TwoDigitBelowHundred,
        DigitClass::TwoDigitFromHundred,
        DigitClass::ThreeDigitBelowThousand,
        DigitClass::ThreeDigitFromThousand,
        DigitClass::FourDigitBelowTenThousand,
        DigitClass::FourDigitFromTenThousand,
        DigitClass::FiveDigitBelowHundredThousand,
        DigitClass::FiveDigitFromHundredThousand,
    ];

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            DigitClass::OneDigitBelowTen => "1d<10",
            DigitClass::OneDigitFromTen => "1d>10",
            DigitClass::TwoDigitBelowHundred => "2d<100",
            DigitClass::TwoDigitFromHundred => "2d>100",
            DigitClass::ThreeDigitBelowThousand => "3d<1000",
            DigitClass::ThreeDigitFromThousand => "3d>1000",
            DigitClass::FourDigitBelowTenThousand => "4d<10000",
            DigitClass::FourDigitFromTenThousand => "4d>10000",
            DigitClass::FiveDigitBelowHundredThousand => "5d<100000",
            DigitClass::FiveDigitFromHundredThousand => "5d>100000",
        }
    }

    #[must_use]
    pub fn display_label(self) -> &'static str {
        match self {
            DigitClass::OneDigitBelowTen => "1D < 10",
            DigitClass::OneDigitFromTen => "1D ≥ 10",
            DigitClass::TwoDigitBelowHundred => "2D < 100",
            DigitClass::TwoDigitFromHundred => "2D ≥ 100",
            DigitClass::ThreeDigitBelowThousand => "3D < 1.000",
            DigitClass::ThreeDigitFromThousand => "3D ≥ 1.000",
            DigitClass::FourDigitBelowTenThousand => "4D < 10.000",
            DigitClass::FourDigitFromTenThousand => "4D ≥ 10.000",
            DigitClass::FiveDigitBelowHundredThousand => "5D < 100.000",
            DigitClass::FiveDigitFromHundredThousand => "5D ≥ 100.000",
        }
    }

    #[must_use]
    pub fn range(self) -> DigitRange {
        let (min, max) = match self {
            DigitClass::OneDigitBelowTen => (1, 9),
            DigitClass::OneDigitFromTen | DigitClass::TwoDigitBelowHundred => (10, 99),
            DigitClass::TwoDigitFromHundred | DigitClass::ThreeDigitBelowThousand => (100, 999),
            DigitClass::ThreeDigitFromThousand | DigitClass::FourDigitBelowTenThousand => {
                (1_000, 9_999)
            }
            DigitClass::FourDigitFromTenThousand | DigitClass::FiveDigitBelowHundredThousand => {
                (10_000, 99_999)
            }
            DigitClass::FiveDigitFromHundredThousand => (100_000, 999_999),
        };
        DigitRange { min, max }
    }

    /// Perturbations used when building decoy answers, smallest first.
    #[must_use]
    pub fn decoy_offsets(self) -> [u64; 3] {
        match self {
            DigitClass::OneDigitBelowTen
            | DigitClass::OneDigitFromTen
            | DigitClass::TwoDigitBelowHundred
            | DigitClass::TwoDigitFromHundred => [1, 2, 10],
            DigitClass::ThreeDigitBelowThousand | DigitClass::ThreeDigitFromThousand => {
                [10, 20, 100]
            }
            DigitClass::FourDigitBelowTenThousand
            | DigitClass::FourDigitFromTenThousand
            | DigitClass::FiveDigitBelowHundredThousand => [100, 200, 1_000],
            DigitClass::FiveDigitFromHundredThousand => [1_000, 2_000, 10_000],
        }
    }

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL.into_iter().find(|class| class.code() == code)
    }

    /// Parse a code, falling back to `1d<10` for anything unrecognized.
    #[must_use]
    pub fn from_code_lossy(code: &str) -> Self {
        Self::from_code(code).unwrap_or_else(|| {
            tracing::debug!(code, "unknown digit class, using 1d<10");
            Self::OneDigitBelowTen
        })
    }

    /// Digits needed to write the largest operand of this class.
    #[must_use]
    pub fn max_digits(self) -> usize {
        self.range().max.to_string().len()
    }
}

impl fmt::Display for DigitClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for DigitClass {
    type Err = DigitClassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| DigitClassError::Unknown(s.to_owned()))
    }
}

impl TryFrom<String> for DigitClass {
    type Error = DigitClassError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DigitClass> for String {
    fn from(value: DigitClass) -> Self {
        value.code().to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_from_str() {
        for class in DigitClass::ALL {
            assert_eq!(class.code().parse::<DigitClass>().unwrap(), class);
        }
    }

    #[test]
    fn ranges_follow_lookup_table() {
        assert_eq!(DigitClass::OneDigitBelowTen.range(), DigitRange { min: 1, max: 9 });
        assert_eq!(
            DigitClass::FourDigitFromTenThousand.range(),
            DigitRange { min: 10_000, max: 99_999 }
        );
        for class in DigitClass::ALL {
            let range = class.range();
            assert!(range.min <= range.max, "{class}");
        }
    }

    #[test]
    fn unknown_code_falls_back_to_single_digits() {
        assert_eq!(DigitClass::from_code_lossy("7d"), DigitClass::OneDigitBelowTen);
        assert!(matches!(
            "7d".parse::<DigitClass>(),
            Err(DigitClassError::Unknown(code)) if code == "7d"
        ));
    }

    #[test]
    fn larger_classes_use_larger_offsets() {
        let small = DigitClass::OneDigitBelowTen.decoy_offsets();
        let large = DigitClass::FiveDigitFromHundredThousand.decoy_offsets();
        assert!(large[0] > small[2]);
    }

    #[test]
    fn serializes_as_code() {
        let json = serde_json::to_string(&DigitClass::ThreeDigitBelowThousand).unwrap();
        assert_eq!(json, "\"3d<1000\"");
        let back: DigitClass = serde_json::from_str("\"5d>100000\"").unwrap();
        assert_eq!(back, DigitClass::FiveDigitFromHundredThousand);
        assert!(serde_json::from_str::<DigitClass>("\"nope\"").is_err());
    }
}
