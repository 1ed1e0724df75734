//! Human-readable order numbers.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`OrderNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderNumberError {
    /// The input does not start with `ORD`.
    #[error("order number must start with {prefix}")]
    MissingPrefix {
        /// Required prefix.
        prefix: &'static str,
    },
    /// The part after the prefix is not a positive number.
    #[error("order number must end with at least {min} digits")]
    InvalidDigits {
        /// Minimum number of digits.
        min: usize,
    },
}

/// A human-readable order identifier such as `ORD000123`.
///
/// Values are produced from a database sequence, so they are unique even
/// when orders are placed concurrently. The numeric part is zero-padded to
/// six digits and grows past that width once the sequence exceeds 999999.
///
/// ```
/// use bazaar_core::OrderNumber;
///
/// assert_eq!(OrderNumber::from_sequence(123).as_str(), "ORD000123");
/// assert_eq!(OrderNumber::from_sequence(1_234_567).as_str(), "ORD1234567");
/// assert!(OrderNumber::parse("ORD000123").is_ok());
/// assert!(OrderNumber::parse("000123").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Prefix shared by every order number.
    pub const PREFIX: &'static str = "ORD";

    /// Minimum width of the numeric part.
    pub const MIN_DIGITS: usize = 6;

    /// Format a sequence value as an order number.
    #[must_use]
    pub fn from_sequence(value: i64) -> Self {
        Self(format!(
            "{}{:0width$}",
            Self::PREFIX,
            value,
            width = Self::MIN_DIGITS
        ))
    }

    /// Parse and validate an order number.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix is missing or the numeric part is not at
    /// least six ASCII digits.
    pub fn parse(s: &str) -> Result<Self, OrderNumberError> {
        let digits = s
            .strip_prefix(Self::PREFIX)
            .ok_or(OrderNumberError::MissingPrefix {
                prefix: Self::PREFIX,
            })?;

        if digits.len() < Self::MIN_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OrderNumberError::InvalidDigits {
                min: Self::MIN_DIGITS,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the order number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for OrderNumber {
    type Err = OrderNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for OrderNumber {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for OrderNumber {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for OrderNumber {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_sequence_pads_to_six_digits() {
        assert_eq!(OrderNumber::from_sequence(1).as_str(), "ORD000001");
        assert_eq!(OrderNumber::from_sequence(999_999).as_str(), "ORD999999");
    }

    #[test]
    fn test_from_sequence_grows_past_width() {
        assert_eq!(OrderNumber::from_sequence(1_000_000).as_str(), "ORD1000000");
    }

    #[test]
    fn test_parse_rejects_missing_prefix() {
        assert_eq!(
            OrderNumber::parse("XYZ000001"),
            Err(OrderNumberError::MissingPrefix { prefix: "ORD" })
        );
    }

    #[test]
    fn test_parse_rejects_short_or_non_numeric() {
        assert!(OrderNumber::parse("ORD123").is_err());
        assert!(OrderNumber::parse("ORD00012a").is_err());
        assert!(OrderNumber::parse("ORD").is_err());
    }

    #[test]
    fn test_generated_numbers_parse() {
        for value in [1, 42, 123_456, 9_876_543] {
            let number = OrderNumber::from_sequence(value);
            assert_eq!(OrderNumber::parse(number.as_str()), Ok(number));
        }
    }
}
