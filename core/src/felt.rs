//! Field elements: the scalar type shared by commitments and hint chunks.

use std::sync::OnceLock;

use bincode::de::{BorrowDecoder, Decoder};
use bincode::error::DecodeError;
use bincode::{BorrowDecode, Decode, Encode};
use num_bigint::BigUint;
use num_traits::One;
#[cfg(feature = "json")]
use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};

use crate::{EscrowError, Result};

/// Domain tag prepended to every compression-function input.
const HASH2_DOMAIN: &[u8] = b"stash.hash2.v1";

/// An element of the prime field of order `2^251 + 17 * 2^192 + 1`,
/// stored as 32 big-endian bytes.
///
/// Every byte string of at most [`Felt::MAX_SHORT_BYTES`] bytes, read as a
/// big-endian integer, is a valid element. Decoding (JSON or bincode)
/// rejects byte strings at or above the modulus.
#[cfg_attr(feature = "json", derive(Serialize))]
#[cfg_attr(feature = "json", serde(transparent))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Encode)]
pub struct Felt(#[cfg_attr(feature = "json", serde(with = "hex::serde"))] [u8; 32]);

impl Felt {
    /// The largest byte count that always fits below the field modulus.
    pub const MAX_SHORT_BYTES: usize = 31;

    pub const ZERO: Felt = Felt([0u8; 32]);

    pub fn from_u64(n: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&n.to_be_bytes());
        Self(bytes)
    }

    /// Interprets up to 31 bytes as a big-endian integer.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::InputTooLong`] for longer inputs.
    pub fn from_short_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > Self::MAX_SHORT_BYTES {
            return Err(EscrowError::InputTooLong {
                len: bytes.len(),
                max: Self::MAX_SHORT_BYTES,
            });
        }
        let mut out = [0u8; 32];
        out[32 - bytes.len()..].copy_from_slice(bytes);
        Ok(Self(out))
    }

    /// Converts a short UTF-8 string (at most 31 bytes) into a field element.
    pub fn from_short_str(text: &str) -> Result<Self> {
        Self::from_short_bytes(text.as_bytes())
    }

    /// Reduces an arbitrary integer modulo the field order.
    pub fn from_biguint_reduced(n: &BigUint) -> Self {
        Self::pad(&(n % modulus()).to_bytes_be())
    }

    /// Accepts an integer only if it is already a canonical field element.
    pub fn try_from_biguint(n: &BigUint) -> Result<Self> {
        if n >= modulus() {
            return Err(EscrowError::InvalidFelt(n.to_str_radix(10)));
        }
        Ok(Self::pad(&n.to_bytes_be()))
    }

    /// Accepts 32 big-endian bytes only if they encode a canonical element.
    pub fn from_bytes_be(bytes: [u8; 32]) -> Result<Self> {
        Self::try_from_biguint(&BigUint::from_bytes_be(&bytes))
    }

    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Minimal big-endian encoding, leading zero bytes stripped.
    pub fn to_short_bytes(&self) -> &[u8] {
        let start = self.0.iter().position(|b| *b != 0).unwrap_or(32);
        &self.0[start..]
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    fn pad(be: &[u8]) -> Self {
        let mut out = [0u8; 32];
        out[32 - be.len()..].copy_from_slice(be);
        Self(out)
    }
}

/// Two-input compression function: `SHA-256(domain || a || b) mod P`.
pub fn hash2(a: &Felt, b: &Felt) -> Felt {
    let mut hasher = Sha256::new();
    hasher.update(HASH2_DOMAIN);
    hasher.update(a.as_bytes());
    hasher.update(b.as_bytes());
    let digest = hasher.finalize();
    Felt::from_biguint_reduced(&BigUint::from_bytes_be(&digest))
}

fn modulus() -> &'static BigUint {
    static MODULUS: OnceLock<BigUint> = OnceLock::new();
    MODULUS.get_or_init(|| {
        (BigUint::one() << 251usize) + (BigUint::from(17u32) << 192usize) + BigUint::one()
    })
}

impl From<u64> for Felt {
    fn from(n: u64) -> Self {
        Self::from_u64(n)
    }
}

impl<Context> Decode<Context> for Felt {
    fn decode<D: Decoder<Context = Context>>(
        decoder: &mut D,
    ) -> std::result::Result<Self, DecodeError> {
        let bytes = <[u8; 32]>::decode(decoder)?;
        Felt::from_bytes_be(bytes).map_err(|e| DecodeError::OtherString(e.to_string()))
    }
}

impl<'de, Context> BorrowDecode<'de, Context> for Felt {
    fn borrow_decode<D: BorrowDecoder<'de, Context = Context>>(
        decoder: &mut D,
    ) -> std::result::Result<Self, DecodeError> {
        Self::decode(decoder)
    }
}

#[cfg(feature = "json")]
impl<'de> Deserialize<'de> for Felt {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let bytes: [u8; 32] = hex::serde::deserialize(d)?;
        Felt::from_bytes_be(bytes).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Felt {
    /// Print the element as a decimal integer.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_biguint().to_str_radix(10))
    }
}

impl std::fmt::LowerHex for Felt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl std::str::FromStr for Felt {
    type Err = EscrowError;

    /// Parses a decimal integer, or a hex integer prefixed with `0x`.
    fn from_str(s: &str) -> Result<Self> {
        let parsed = match s.strip_prefix("0x") {
            Some(hex) => BigUint::parse_bytes(hex.as_bytes(), 16),
            None => BigUint::parse_bytes(s.as_bytes(), 10),
        };
        let n = parsed.ok_or_else(|| EscrowError::InvalidFelt(s.to_string()))?;
        Self::try_from_biguint(&n)
    }
}

#[cfg(test)]
mod tests {
    use core::str::FromStr as _;

    use super::*;

    #[test]
    fn short_string_is_big_endian() {
        let felt = Felt::from_short_str("loc").unwrap();
        let expected = (u64::from(b'l') << 16) | (u64::from(b'o') << 8) | u64::from(b'c');
        assert_eq!(felt, Felt::from_u64(expected));
        assert_eq!(felt.to_short_bytes(), b"loc");
    }

    #[test]
    fn short_string_limit() {
        let max = "a".repeat(31);
        assert!(Felt::from_short_str(&max).is_ok());

        let too_long = "a".repeat(32);
        assert_eq!(
            Felt::from_short_str(&too_long),
            Err(EscrowError::InputTooLong { len: 32, max: 31 })
        );
    }

    #[test]
    fn parse_and_display() {
        let felt = Felt::from_str("123").unwrap();
        assert_eq!(felt, Felt::from_u64(123));
        assert_eq!(felt.to_string(), "123");
        assert_eq!(Felt::from_str("0x7b").unwrap(), felt);
        assert_eq!(format!("{:x}", felt), format!("0x{}7b", "0".repeat(62)));

        assert!(Felt::from_str("not-a-number").is_err());
    }

    #[test]
    fn rejects_non_canonical() {
        let p = modulus().clone();
        assert!(Felt::try_from_biguint(&p).is_err());
        assert_eq!(Felt::from_biguint_reduced(&p), Felt::ZERO);
        assert_eq!(
            Felt::from_biguint_reduced(&(p + BigUint::one())),
            Felt::from_u64(1)
        );
    }

    #[test]
    fn decoding_rejects_non_canonical() {
        let mut p = [0u8; 32];
        let be = modulus().to_bytes_be();
        p[32 - be.len()..].copy_from_slice(&be);
        assert!(Felt::from_bytes_be(p).is_err());

        let config = bincode::config::standard();
        let bytes = bincode::encode_to_vec(p, config).unwrap();
        assert!(bincode::decode_from_slice::<Felt, _>(&bytes, config).is_err());

        let one = Felt::from_u64(1);
        let bytes = bincode::encode_to_vec(one, config).unwrap();
        let (decoded, _): (Felt, usize) = bincode::decode_from_slice(&bytes, config).unwrap();
        assert_eq!(decoded, one);
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_rejects_non_canonical() {
        let felt = Felt::from_u64(0x7b);
        let json = serde_json::to_string(&felt).unwrap();
        assert_eq!(json, format!("\"{}7b\"", "0".repeat(62)));
        assert_eq!(serde_json::from_str::<Felt>(&json).unwrap(), felt);

        let max = format!("\"{}\"", "ff".repeat(32));
        assert!(serde_json::from_str::<Felt>(&max).is_err());
    }

    #[test]
    fn hash2_is_deterministic_and_ordered() {
        let a = Felt::from_u64(1);
        let b = Felt::from_u64(2);
        assert_eq!(hash2(&a, &b), hash2(&a, &b));
        assert_ne!(hash2(&a, &b), hash2(&b, &a));
        assert!(hash2(&a, &b).to_biguint() < *modulus());
    }
}
