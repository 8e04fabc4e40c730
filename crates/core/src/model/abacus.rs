//! Soroban bead layout for displaying numbers.

use serde::{Deserialize, Serialize};

/// One rod of the soroban.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SorobanColumn {
    pub value: u8,
    /// The upper bead, worth five.
    pub heaven_bead: bool,
    /// The four lower beads, worth one each; set beads are pushed to the beam.
    pub earth_beads: [bool; 4],
}

impl SorobanColumn {
    #[must_use]
    pub fn from_digit(digit: u8) -> Self {
        let digit = digit.min(9);
        let ones = digit % 5;
        let mut earth_beads = [false; 4];
        for bead in earth_beads.iter_mut().take(usize::from(ones)) {
            *bead = true;
        }
        Self {
            value: digit,
            heaven_bead: digit >= 5,
            earth_beads,
        }
    }
}

/// Lay out `number` on at least `columns` rods, left-padding with zeros.
///
/// Numbers wider than `columns` get as many rods as they need.
#[must_use]
pub fn number_to_soroban(number: u64, columns: usize) -> Vec<SorobanColumn> {
    format!("{number:0>columns$}")
        .bytes()
        .map(|b| SorobanColumn::from_digit(b - b'0'))
        .collect()
}

/// Group thousands with `.` the way the drills display them, e.g. `12.345`.
#[must_use]
pub fn format_grouped(number: u64) -> String {
    let digits = number.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}
