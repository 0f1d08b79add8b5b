use bigdecimal::{BigDecimal, One, Zero};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{AddAssign, SubAssign};
use std::str::FromStr;

use super::codec::FormatError;

/// An exact decimal quantity of currency
///
/// Amounts travel as decimal strings so that values such as `0.1` survive
/// serialization without binary rounding. The text form keeps the digits and
/// exponent it was parsed from (`1.50`, `1E+2` and `-0` stay as written),
/// while comparisons are numeric.
#[derive(Debug, Clone)]
pub struct Amount {
    value: BigDecimal,
    // `BigDecimal` has no signed zero, so `-0` is tracked here
    negative_zero: bool,
}

impl Amount {
    fn from_decimal(value: BigDecimal) -> Self {
        Amount {
            value,
            negative_zero: false,
        }
    }

    pub fn zero() -> Self {
        Amount::from_decimal(BigDecimal::zero())
    }

    pub fn one() -> Self {
        Amount::from_decimal(BigDecimal::one())
    }
}

impl Default for Amount {
    fn default() -> Self {
        Amount::zero()
    }
}

impl PartialEq for Amount {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Amount {}

impl PartialOrd for Amount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Amount {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl Hash for Amount {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state)
    }
}

impl FromStr for Amount {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let value = BigDecimal::from_str(text)
            .map_err(|e| FormatError::InvalidDecimal(format!("{s:?}: {e}")))?;

        Ok(Amount {
            negative_zero: value.is_zero() && text.starts_with('-'),
            value,
        })
    }
}

/// Decimal text in the notation existing chains were hashed with
///
/// Plain notation while the exponent is not positive and the adjusted
/// exponent is at least -6, otherwise one leading digit and `E±n`.
impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (int_val, scale) = self.value.as_bigint_and_exponent();
        let text = int_val.to_string();
        let (negative, digits) = match text.strip_prefix('-') {
            Some(digits) => (true, digits),
            None => (self.negative_zero, text.as_str()),
        };

        let exponent = -scale;
        let left_digits = exponent + digits.len() as i64;
        let dot_place = if exponent <= 0 && left_digits > -6 {
            left_digits
        } else {
            1
        };

        if negative {
            f.write_str("-")?;
        }
        if dot_place <= 0 {
            write!(f, "0.{}{}", "0".repeat(dot_place.unsigned_abs() as usize), digits)?;
        } else if dot_place >= digits.len() as i64 {
            let padding = (dot_place - digits.len() as i64) as usize;
            write!(f, "{}{}", digits, "0".repeat(padding))?;
        } else {
            let (integer, fraction) = digits.split_at(dot_place as usize);
            write!(f, "{integer}.{fraction}")?;
        }
        if left_digits != dot_place {
            write!(f, "E{:+}", left_digits - dot_place)?;
        }
        Ok(())
    }
}

impl<'a> AddAssign<&'a Amount> for Amount {
    fn add_assign(&mut self, rhs: &'a Amount) {
        *self = Amount::from_decimal(&self.value + &rhs.value);
    }
}

impl<'a> SubAssign<&'a Amount> for Amount {
    fn sub_assign(&mut self, rhs: &'a Amount) {
        *self = Amount::from_decimal(&self.value - &rhs.value);
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(de::Error::custom)
    }
}
