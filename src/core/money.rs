//! Fixed-point monetary amounts and percentages.
//!
//! Both types hold an `i64` count of hundredths: cents for [`Money`],
//! hundredths of a percent for [`Percentage`]. Decimal strings are only
//! produced or parsed at the boundary (`FromStr`, `Display`, serde).

use super::error::EngineError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

const SCALE: u32 = 2;

/// 100.00% expressed in hundredths of a percent.
const WHOLE_PERCENT: i64 = 10_000;

/// Below this magnitude a two-place decimal has at most 15 significant
/// digits, so it survives a trip through `f64` unchanged.
const MAX_EXACT_FLOAT: f64 = 1e13;

/// Exact monetary amount in minor units (cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    pub fn from_major(major: i64) -> Result<Self, EngineError> {
        major
            .checked_mul(100)
            .map(Money)
            .ok_or(EngineError::Overflow)
    }

    /// Convert a decimal amount, rejecting anything finer than a cent.
    pub fn from_decimal(value: Decimal) -> Result<Self, EngineError> {
        to_hundredths(value).map(Money)
    }

    pub fn minor_units(self) -> i64 {
        self.0
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, SCALE)
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Money) -> Result<Money, EngineError> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or(EngineError::Overflow)
    }

    pub fn checked_sub(self, other: Money) -> Result<Money, EngineError> {
        self.0
            .checked_sub(other.0)
            .map(Money)
            .ok_or(EngineError::Overflow)
    }

    /// `self × rate / 100`, rounded half away from zero to the cent.
    ///
    /// For the non-negative amounts the engine taxes this is the usual
    /// round-half-up.
    pub fn apply_rate(self, rate: Percentage) -> Result<Money, EngineError> {
        let product = i128::from(self.0) * i128::from(rate.0);
        let denominator = i128::from(WHOLE_PERCENT);
        let quotient = product / denominator;
        let remainder = product % denominator;
        let rounded = if remainder.abs() * 2 >= denominator {
            quotient + product.signum()
        } else {
            quotient
        };
        i64::try_from(rounded)
            .map(Money)
            .map_err(|_| EngineError::Overflow)
    }

    /// Exact sum of a sequence of amounts, failing on overflow.
    pub fn sum<I>(amounts: I) -> Result<Money, EngineError>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, |total, amount| total.checked_add(amount))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl FromStr for Money {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::from_decimal(parse_decimal(s)?)
    }
}

/// Rate expressed in percent with two decimal places, e.g. `11.00`.
///
/// Always within `0.00..=100.00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Percentage(i64);

impl Percentage {
    pub const ZERO: Percentage = Percentage(0);
    pub const HUNDRED: Percentage = Percentage(WHOLE_PERCENT);

    pub fn from_hundredths(hundredths: i64) -> Result<Self, EngineError> {
        if (0..=WHOLE_PERCENT).contains(&hundredths) {
            Ok(Percentage(hundredths))
        } else {
            Err(EngineError::InvalidRate {
                rate: Decimal::new(hundredths, SCALE),
            })
        }
    }

    pub fn from_decimal(value: Decimal) -> Result<Self, EngineError> {
        let hundredths = to_hundredths(value)?;
        Percentage::from_hundredths(hundredths)
    }

    pub fn hundredths(self) -> i64 {
        self.0
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, SCALE)
    }

    /// `100 − self`, the share left after applying this rate.
    pub fn complement(self) -> Percentage {
        Percentage(WHOLE_PERCENT - self.0)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl FromStr for Percentage {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches('%');
        Percentage::from_decimal(parse_decimal(trimmed)?)
    }
}

fn parse_decimal(s: &str) -> Result<Decimal, EngineError> {
    Decimal::from_str(s.trim()).map_err(|_| EngineError::InvalidAmount {
        value: s.to_string(),
    })
}

fn to_hundredths(value: Decimal) -> Result<i64, EngineError> {
    if value.normalize().scale() > SCALE {
        return Err(EngineError::ExcessPrecision { value });
    }
    value
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.to_i64())
        .ok_or(EngineError::Overflow)
}

macro_rules! decimal_string_serde {
    ($ty:ident) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                deserializer.deserialize_any(DecimalVisitor::<$ty>(PhantomData))
            }
        }

        impl JsonSchema for $ty {
            fn schema_name() -> String {
                stringify!($ty).to_string()
            }

            fn json_schema(gen: &mut SchemaGenerator) -> Schema {
                String::json_schema(gen)
            }
        }
    };
}

decimal_string_serde!(Money);
decimal_string_serde!(Percentage);

/// Accepts decimal strings and JSON numbers. Numbers are re-read from their
/// shortest decimal rendering; floats too large to carry every cent exactly
/// are rejected.
struct DecimalVisitor<T>(PhantomData<T>);

impl<'de, T> Visitor<'de> for DecimalVisitor<T>
where
    T: FromStr<Err = EngineError>,
{
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a decimal with at most two decimal places")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<T, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<T, E> {
        self.visit_str(&v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<T, E> {
        self.visit_str(&v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<T, E> {
        if !v.is_finite() || v.abs() >= MAX_EXACT_FLOAT {
            return Err(E::custom(format!(
                "{} cannot be read exactly as a number, write it as a string",
                v
            )));
        }
        self.visit_str(&v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    fn pct(s: &str) -> Percentage {
        s.parse().unwrap()
    }

    #[test]
    fn parse_and_display_keep_two_places() {
        assert_eq!(money("1100").to_string(), "1100.00");
        assert_eq!(money("0.5").minor_units(), 50);
        assert_eq!(money("-12.34").to_string(), "-12.34");
        assert_eq!(pct("11").to_string(), "11.00");
        assert_eq!(pct("5.5%").hundredths(), 550);
    }

    #[test]
    fn sub_cent_amounts_rejected() {
        assert_eq!(
            Money::from_decimal(dec!(1.005)),
            Err(EngineError::ExcessPrecision { value: dec!(1.005) })
        );
        // trailing zeros are not extra precision
        assert_eq!(Money::from_decimal(dec!(1.500)).unwrap(), money("1.50"));
    }

    #[test]
    fn rates_outside_zero_to_hundred_rejected() {
        assert!(matches!(
            "100.01".parse::<Percentage>(),
            Err(EngineError::InvalidRate { .. })
        ));
        assert!(matches!(
            "-1".parse::<Percentage>(),
            Err(EngineError::InvalidRate { .. })
        ));
        assert_eq!(pct("100"), Percentage::HUNDRED);
    }

    #[test]
    fn apply_rate_rounds_half_up() {
        // 0.05 × 10% = 0.005 -> 0.01
        assert_eq!(money("0.05").apply_rate(pct("10")).unwrap(), money("0.01"));
        // 0.04 × 10% = 0.004 -> 0.00
        assert_eq!(money("0.04").apply_rate(pct("10")).unwrap(), Money::ZERO);
        assert_eq!(
            money("10000").apply_rate(pct("11")).unwrap(),
            money("1100")
        );
        assert_eq!(money("-0.05").apply_rate(pct("10")).unwrap(), money("-0.01"));
    }

    #[test]
    fn complement_of_deduction() {
        assert_eq!(pct("34").complement(), pct("66"));
        assert_eq!(Percentage::ZERO.complement(), Percentage::HUNDRED);
    }

    #[test]
    fn overflow_is_reported() {
        let max = Money::from_minor(i64::MAX);
        assert_eq!(max.checked_add(Money::from_minor(1)), Err(EngineError::Overflow));
        assert_eq!(Money::from_major(i64::MAX), Err(EngineError::Overflow));
        assert_eq!(
            Money::sum([max, Money::from_minor(1)]),
            Err(EngineError::Overflow)
        );
    }

    #[test]
    fn serde_uses_decimal_strings() {
        let parsed: Money = serde_json::from_str("\"1000.50\"").unwrap();
        assert_eq!(parsed, money("1000.50"));
        let from_number: Money = serde_json::from_str("1000.5").unwrap();
        assert_eq!(from_number, money("1000.50"));
        let from_int: Percentage = serde_json::from_str("20").unwrap();
        assert_eq!(from_int, pct("20"));
        assert_eq!(serde_json::to_string(&money("3")).unwrap(), "\"3.00\"");
        assert!(serde_json::from_str::<Money>("\"1.001\"").is_err());
    }

    #[test]
    fn large_amounts_need_strings() {
        assert!(serde_json::from_str::<Money>("1234567890123456.78").is_err());
        let quoted: Money = serde_json::from_str("\"1234567890123456.78\"").unwrap();
        assert_eq!(quoted.to_string(), "1234567890123456.78");

        let largest: Money = serde_json::from_str("9999999999999.99").unwrap();
        assert_eq!(largest.minor_units(), 999_999_999_999_999);
        // integers never go through a float
        let whole: Money = serde_json::from_str("12345678901234567").unwrap();
        assert_eq!(whole.to_string(), "12345678901234567.00");
    }
}
