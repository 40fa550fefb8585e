use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Mul, Neg, Sub},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const KRW_CURRENCY_CODE: &str = "KRW";
pub const KRW_CURRENCY_CODE_LOWER: &str = "krw";

//--------------------------------------        Krw          ---------------------------------------------------------
/// An amount of Korean won. The won has no minor unit in practice, so amounts are plain
/// signed integers.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Krw(i64);

op!(binary Krw, Add, add);
op!(binary Krw, Sub, sub);
op!(inplace Krw, AddAssign, add_assign);
op!(unary Krw, Neg, neg);

impl Mul<i64> for Krw {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Sum for Krw {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in won: {0}")]
pub struct KrwConversionError(String);

impl From<i64> for Krw {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Krw {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Krw {}

impl TryFrom<u64> for Krw {
    type Error = KrwConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(KrwConversionError(format!("Value {} is too large to convert to Krw", value)))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Krw {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "₩{}", group_digits(self.0))
    }
}

impl Krw {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

fn group_digits(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    let offset = digits.len() % 3;
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - offset) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod test {
    use super::Krw;

    #[test]
    fn arithmetic() {
        let a = Krw::from(500_000);
        let b = Krw::from(50_000);
        assert_eq!(a + b, Krw::from(550_000));
        assert_eq!(a - b, Krw::from(450_000));
        assert_eq!(b * 11, Krw::from(550_000));
        assert_eq!(-b, Krw::from(-50_000));
        let total: Krw = [a, b, b].into_iter().sum();
        assert_eq!(total, Krw::from(600_000));
    }

    #[test]
    fn display_groups_digits() {
        assert_eq!(Krw::from(0).to_string(), "₩0");
        assert_eq!(Krw::from(999).to_string(), "₩999");
        assert_eq!(Krw::from(550_000).to_string(), "₩550,000");
        assert_eq!(Krw::from(1_234_567).to_string(), "₩1,234,567");
        assert_eq!(Krw::from(-45_000).to_string(), "₩-45,000");
    }

    #[test]
    fn positivity() {
        assert!(Krw::from(1).is_positive());
        assert!(!Krw::from(0).is_positive());
        assert!(!Krw::from(-100).is_positive());
    }

    #[test]
    fn serde_is_transparent() {
        let amount = Krw::from(500_000);
        assert_eq!(serde_json::to_string(&amount).unwrap(), "500000");
        let back: Krw = serde_json::from_str("500000").unwrap();
        assert_eq!(back, amount);
    }
}
