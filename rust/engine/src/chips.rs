use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::GameError;

/// A non-negative chip amount. Removing more than is held fails and leaves
/// the balance untouched.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chips(u64);

impl Chips {
    pub const ZERO: Chips = Chips(0);

    pub const fn new(amount: u64) -> Self {
        Self(amount)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn add(&mut self, amount: u64) {
        self.0 = self.0.saturating_add(amount);
    }

    pub fn remove(&mut self, amount: u64) -> Result<(), GameError> {
        if amount > self.0 {
            return Err(GameError::InsufficientChips {
                requested: amount,
                available: self.0,
            });
        }
        self.0 -= amount;
        Ok(())
    }

    /// Compact display: `950`, `1.2K`, `3.21M`, `100B`.
    pub fn to_shorthand(self) -> String {
        shorthand(self.0)
    }
}

impl From<u64> for Chips {
    fn from(amount: u64) -> Self {
        Self(amount)
    }
}

impl fmt::Display for Chips {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn shorthand(amount: u64) -> String {
    // (unit, fractional digits kept, suffix); digits past the kept ones are truncated.
    const UNITS: [(u64, u32, char); 3] = [
        (1_000_000_000, 3, 'B'),
        (1_000_000, 2, 'M'),
        (1_000, 1, 'K'),
    ];

    let Some(&(unit, digits, suffix)) = UNITS.iter().find(|(unit, _, _)| amount >= *unit) else {
        return amount.to_string();
    };
    let whole = amount / unit;
    let frac = (amount % unit) / (unit / 10u64.pow(digits));
    let frac = format!("{:0width$}", frac, width = digits as usize);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        format!("{}{}", whole, suffix)
    } else {
        format!("{}.{}{}", whole, frac, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorthand_trims_trailing_zeros() {
        let cases = [
            (999, "999"),
            (1_000, "1K"),
            (1_200, "1.2K"),
            (1_211, "1.2K"),
            (3_000_000, "3M"),
            (3_200_000, "3.2M"),
            (3_201_000, "3.2M"),
            (3_211_000, "3.21M"),
            (3_211_020, "3.21M"),
            (100_000_000_000, "100B"),
            (999_999, "999.9K"),
        ];
        for (amount, expected) in cases {
            assert_eq!(Chips::new(amount).to_shorthand(), expected, "{}", amount);
        }
    }

    #[test]
    fn remove_never_goes_negative() {
        let mut chips = Chips::new(100);
        let err = chips.remove(101).unwrap_err();
        assert_eq!(
            err,
            GameError::InsufficientChips {
                requested: 101,
                available: 100
            }
        );
        assert_eq!(chips.get(), 100);
        chips.remove(100).unwrap();
        assert!(chips.is_zero());
    }
}
