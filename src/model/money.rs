//! Currency amounts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul, Sub};

/// Minor units per major unit (kopecks per ruble).
const MINOR_PER_MAJOR: i64 = 100;

/// A currency amount held in minor units.
///
/// The arithmetic operators saturate at the `i64` range; use the `checked_*`
/// methods where an overflow must be reported.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "MoneyRepr", into = "MoneyRepr")]
pub struct Money {
    minor: i64,
}

impl Money {
    /// Zero.
    pub const ZERO: Money = Money { minor: 0 };

    /// Amount from whole major units, saturating.
    pub const fn from_major(major: i64) -> Self {
        Self {
            minor: major.saturating_mul(MINOR_PER_MAJOR),
        }
    }

    /// Amount from minor units.
    pub const fn from_minor(minor: i64) -> Self {
        Self { minor }
    }

    /// Amount in minor units.
    pub fn minor(self) -> i64 {
        self.minor
    }

    /// `self + rhs`, or `None` on overflow.
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.minor.checked_add(rhs.minor).map(Money::from_minor)
    }

    /// `self × qty`, or `None` on overflow.
    pub fn checked_mul(self, qty: u32) -> Option<Money> {
        self.minor.checked_mul(i64::from(qty)).map(Money::from_minor)
    }

    /// Whole major units, fraction truncated toward zero.
    pub fn whole(self) -> i64 {
        self.minor / MINOR_PER_MAJOR
    }

    /// Format with a space as group separator and no decimals: `32 151 159`.
    pub fn format_grouped(self) -> String {
        let whole = self.whole();
        let digits = whole.unsigned_abs().to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
        if whole < 0 {
            out.push('-');
        }
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(' ');
            }
            out.push(ch);
        }
        out
    }

    /// Parse a grouped amount such as `"3 800 000 ₽"`, `"1 234,50"` or `"499000"`.
    ///
    /// Spaces (including no-break and thin spaces) are group separators; a
    /// single `,` or `.` followed by one or two digits is the decimal mark.
    /// Any other trailing text (currency signs) is ignored.
    pub fn parse_grouped(s: &str) -> Option<Self> {
        let mut body = String::new();
        let mut negative = false;
        let mut seen_digit = false;
        for ch in s.trim().chars() {
            match ch {
                '-' | '−' if !seen_digit => negative = true,
                '0'..='9' => {
                    seen_digit = true;
                    body.push(ch);
                }
                ',' | '.' if seen_digit => body.push('.'),
                ' ' | '\u{a0}' | '\u{202f}' | '\u{2009}' => {}
                _ if seen_digit => break,
                _ => return None,
            }
        }
        if !seen_digit {
            return None;
        }

        let (int_part, frac_part) = match body.split_once('.') {
            Some((i, f)) if (1..=2).contains(&f.len()) && !f.contains('.') => (i, f),
            Some(_) => return None,
            None => (body.as_str(), ""),
        };

        let major: i64 = int_part.parse().ok()?;
        let mut frac: i64 = if frac_part.is_empty() {
            0
        } else {
            frac_part.parse().ok()?
        };
        if frac_part.len() == 1 {
            frac *= 10;
        }
        let minor = major.checked_mul(MINOR_PER_MAJOR)?.checked_add(frac)?;
        Some(Self {
            minor: if negative { -minor } else { minor },
        })
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_grouped())
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money::from_minor(self.minor.saturating_add(rhs.minor))
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money::from_minor(self.minor.saturating_sub(rhs.minor))
    }
}

impl Mul<u32> for Money {
    type Output = Money;

    fn mul(self, qty: u32) -> Money {
        Money::from_minor(self.minor.saturating_mul(i64::from(qty)))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

/// Accepted spellings of an amount in spec files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum MoneyRepr {
    Whole(i64),
    Fractional(f64),
    Text(String),
}

impl TryFrom<MoneyRepr> for Money {
    type Error = String;

    fn try_from(repr: MoneyRepr) -> Result<Self, Self::Error> {
        match repr {
            MoneyRepr::Whole(major) => major
                .checked_mul(MINOR_PER_MAJOR)
                .map(Money::from_minor)
                .ok_or_else(|| format!("amount out of range: {}", major)),
            MoneyRepr::Fractional(value) if value.is_finite() => {
                Ok(Money::from_minor((value * MINOR_PER_MAJOR as f64).round() as i64))
            }
            MoneyRepr::Fractional(value) => Err(format!("invalid amount: {}", value)),
            MoneyRepr::Text(s) => {
                Money::parse_grouped(&s).ok_or_else(|| format!("invalid amount: {:?}", s))
            }
        }
    }
}

impl From<Money> for MoneyRepr {
    fn from(m: Money) -> Self {
        if m.minor % MINOR_PER_MAJOR == 0 {
            MoneyRepr::Whole(m.whole())
        } else {
            MoneyRepr::Fractional(m.minor as f64 / MINOR_PER_MAJOR as f64)
        }
    }
}
