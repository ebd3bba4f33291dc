//! Arbitrary-precision balance amounts.
//!
//! `spec.md` §9 is explicit: "Arbitrary-precision integers for balances.
//! Required; do not use fixed-width 64-bit integers for amounts." Balances
//! are stored and transmitted as decimal-string-encoded [`num_bigint::BigUint`]
//! values — the same convention `spec.md` §4.3 already uses for instruction
//! amount fields ("An amount is written as a decimal string").

use num_bigint::BigUint;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Amount(pub BigUint);

impl Amount {
    pub fn zero() -> Self {
        Self(BigUint::from(0u32))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == BigUint::from(0u32)
    }

    pub fn checked_add(&self, other: &Amount) -> Amount {
        Amount(&self.0 + &other.0)
    }

    /// `None` if `other > self` (balances never go negative).
    pub fn checked_sub(&self, other: &Amount) -> Option<Amount> {
        if other.0 > self.0 {
            None
        } else {
            Some(Amount(&self.0 - &other.0))
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({})", self.0)
    }
}

impl FromStr for Amount {
    type Err = num_bigint::ParseBigIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Amount(BigUint::from_str(s)?))
    }
}

impl From<u64> for Amount {
    fn from(v: u64) -> Self {
        Amount(BigUint::from(v))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        BigUint::from_str(&s)
            .map(Amount)
            .map_err(|e| D::Error::custom(format!("invalid amount: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_sub() {
        let a = Amount::from_str("100").unwrap();
        let b = Amount::from_str("40").unwrap();
        assert_eq!(a.checked_add(&b).to_string(), "140");
        assert_eq!(a.checked_sub(&b).unwrap().to_string(), "60");
        assert!(b.checked_sub(&a).is_none());
    }

    #[test]
    fn arbitrary_precision_survives_round_trip() {
        let huge = "123456789012345678901234567890";
        let a = Amount::from_str(huge).unwrap();
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, format!("\"{huge}\""));
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }
}
