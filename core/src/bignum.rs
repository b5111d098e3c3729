use bincode::de::{BorrowDecoder, Decoder};
use bincode::enc::Encoder;
use bincode::error::{DecodeError, EncodeError};
use bincode::{BorrowDecode, Decode, Encode};
use num_bigint::BigUint;
use num_traits::Zero;
#[cfg(feature = "json")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[cfg(feature = "json")]
use crate::serde::biguint_serde;
use crate::{EscrowError, Result};

/// A 256-bit unsigned asset quantity.
///
/// Wraps [`BigUint`] so we can implement bincode traits and enforce the width.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(BigUint);

impl Amount {
    pub const BITS: u64 = 256;

    /// Wraps `value`, rejecting anything wider than 256 bits.
    pub fn new(value: BigUint) -> Result<Self> {
        if value.bits() > Self::BITS {
            return Err(EscrowError::AmountOverflow);
        }
        Ok(Self(value))
    }

    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    /// Convert Self directly from an `u64`.
    pub fn from_u64(n: u64) -> Self {
        Self(BigUint::from(n))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    /// Sum, or `None` if it would exceed 256 bits.
    pub fn checked_add(&self, other: &Amount) -> Option<Amount> {
        Self::new(&self.0 + &other.0).ok()
    }

    /// Difference, or `None` if `other > self`.
    pub fn checked_sub(&self, other: &Amount) -> Option<Amount> {
        (self.0 >= other.0).then(|| Self(&self.0 - &other.0))
    }
}

impl From<u64> for Amount {
    fn from(n: u64) -> Self {
        Self::from_u64(n)
    }
}

impl From<u128> for Amount {
    fn from(n: u128) -> Self {
        Self(BigUint::from(n))
    }
}

impl TryFrom<BigUint> for Amount {
    type Error = EscrowError;

    fn try_from(value: BigUint) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for BigUint {
    fn from(v: Amount) -> BigUint {
        v.0
    }
}

impl std::str::FromStr for Amount {
    type Err = EscrowError;

    fn from_str(s: &str) -> Result<Self> {
        let value = BigUint::parse_bytes(s.as_bytes(), 10)
            .ok_or_else(|| EscrowError::InvalidAmount(s.to_string()))?;
        Self::new(value)
    }
}

impl Encode for Amount {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> std::result::Result<(), EncodeError> {
        let s = self.0.to_str_radix(10);
        s.encode(encoder)
    }
}

impl<Context> Decode<Context> for Amount {
    fn decode<D: Decoder<Context = Context>>(
        decoder: &mut D,
    ) -> std::result::Result<Self, DecodeError> {
        let s = String::decode(decoder)?;
        BigUint::parse_bytes(s.as_bytes(), 10)
            .and_then(|v| Amount::new(v).ok())
            .ok_or_else(|| DecodeError::OtherString("amount parse error".into()))
    }
}

impl<'de, Context> BorrowDecode<'de, Context> for Amount {
    fn borrow_decode<D: BorrowDecoder<'de, Context = Context>>(
        decoder: &mut D,
    ) -> std::result::Result<Self, DecodeError> {
        Self::decode(decoder)
    }
}

impl std::fmt::Display for Amount {
    /// Print the inner BigUint as a decimal string.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_str_radix(10))
    }
}

#[cfg(feature = "json")]
impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        biguint_serde::serialize(&self.0, s)
    }
}

#[cfg(feature = "json")]
impl<'de> Deserialize<'de> for Amount {
    /// Parses a decimal string, rejecting values wider than 256 bits.
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = biguint_serde::deserialize(d)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}
