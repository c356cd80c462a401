//! Randomness for the rules engine.
//!
//! Every random draw in the game (attack rolls, crit rolls, enemy picks,
//! loot picks, volatile level-up gains) goes through the [`Dice`] trait so
//! tests can swap in a scripted source. Ability effects describe their
//! magnitude with small dice expressions such as `2d4+1`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for dice notation parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("Invalid dice notation: {0}")]
    InvalidNotation(String),
    #[error("Invalid die size: {0}")]
    InvalidDieSize(u32),
    #[error("No dice specified")]
    NoDice,
    #[error("Dice expression too large: {0}")]
    TooLarge(String),
}

/// Source of random integers.
pub trait Dice {
    /// Uniform integer in `[low, high]`. Returns `low` when `high <= low`.
    fn roll_range(&mut self, low: i32, high: i32) -> i32;

    /// Percentile roll, 1-100 inclusive.
    fn roll_d100(&mut self) -> i32 {
        self.roll_range(1, 100)
    }

    /// Uniform index into a collection of `len` elements. `len` must be non-zero.
    fn choose_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        let high = i32::try_from(len - 1).unwrap_or(i32::MAX);
        self.roll_range(0, high).max(0) as usize
    }
}

/// [`Dice`] backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngDice<R = StdRng> {
    rng: R,
}

impl RngDice<StdRng> {
    /// Seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence, handy for scripted sessions.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> RngDice<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl Default for RngDice<StdRng> {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl<R: Rng> Dice for RngDice<R> {
    fn roll_range(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..=high)
    }
}

/// A dice expression of the form `NdM+K` (count and modifier optional).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DiceExpr {
    pub count: u32,
    pub sides: u32,
    pub modifier: i32,
}

impl DiceExpr {
    /// A constant value with no dice.
    pub fn flat(value: i32) -> Self {
        Self {
            count: 0,
            sides: 0,
            modifier: value,
        }
    }

    /// Parse a dice notation string.
    pub fn parse(notation: &str) -> Result<Self, DiceError> {
        let compact: String = notation
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        if compact.is_empty() {
            return Err(DiceError::NoDice);
        }

        let Some(d_pos) = compact.find('d') else {
            let value: i32 = compact
                .parse()
                .map_err(|_| DiceError::InvalidNotation(notation.to_string()))?;
            return Ok(Self::flat(value));
        };

        let count_str = &compact[..d_pos];
        let rest = &compact[d_pos + 1..];
        let count: u32 = if count_str.is_empty() {
            1
        } else {
            count_str
                .parse()
                .map_err(|_| DiceError::InvalidNotation(notation.to_string()))?
        };

        let (sides_str, modifier) = match rest.find(['+', '-']) {
            Some(pos) => {
                let modifier: i32 = rest[pos..]
                    .parse()
                    .map_err(|_| DiceError::InvalidNotation(notation.to_string()))?;
                (&rest[..pos], modifier)
            }
            None => (rest, 0),
        };

        let sides: u32 = sides_str
            .parse()
            .map_err(|_| DiceError::InvalidNotation(notation.to_string()))?;
        if sides < 2 {
            return Err(DiceError::InvalidDieSize(sides));
        }
        if count == 0 {
            return Err(DiceError::NoDice);
        }

        let expr = Self {
            count,
            sides,
            modifier,
        };
        expr.validate()?;
        Ok(expr)
    }

    /// Reject expressions whose extreme totals do not fit in an `i32`.
    pub fn validate(&self) -> Result<(), DiceError> {
        let fits = |total: Option<i64>| {
            total.is_some_and(|t| i32::try_from(t).is_ok())
        };
        let count = i64::from(self.count);
        let modifier = i64::from(self.modifier);
        let low = count.checked_add(modifier);
        let high = count
            .checked_mul(i64::from(self.sides))
            .and_then(|t| t.checked_add(modifier));
        if fits(low) && fits(high) {
            Ok(())
        } else {
            Err(DiceError::TooLarge(self.to_string()))
        }
    }

    /// Smallest possible total, saturating at the `i32` range.
    pub fn min(&self) -> i32 {
        saturate(i64::from(self.count).saturating_add(i64::from(self.modifier)))
    }

    /// Largest possible total, saturating at the `i32` range.
    pub fn max(&self) -> i32 {
        saturate(
            i64::from(self.count)
                .saturating_mul(i64::from(self.sides))
                .saturating_add(i64::from(self.modifier)),
        )
    }

    /// Roll the expression.
    pub fn roll(&self, dice: &mut dyn Dice) -> i32 {
        let sides = i32::try_from(self.sides).unwrap_or(i32::MAX);
        (0..self.count)
            .map(|_| dice.roll_range(1, sides))
            .fold(self.modifier, i32::saturating_add)
    }
}

fn saturate(total: i64) -> i32 {
    i32::try_from(total).unwrap_or(if total < 0 { i32::MIN } else { i32::MAX })
}

impl FromStr for DiceExpr {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiceExpr::parse(s)
    }
}

impl TryFrom<String> for DiceExpr {
    type Error = DiceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DiceExpr::parse(&value)
    }
}

impl From<DiceExpr> for String {
    fn from(expr: DiceExpr) -> Self {
        expr.to_string()
    }
}

impl fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 0 {
            return write!(f, "{}", self.modifier);
        }
        write!(f, "{}d{}", self.count, self.sides)?;
        match self.modifier {
            0 => Ok(()),
            m if m > 0 => write!(f, "+{m}"),
            m => write!(f, "{m}"),
        }
    }
}
