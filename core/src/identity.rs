//! Opaque 32-byte identities for accounts and token types.

use bincode::{Decode, Encode};
#[cfg(feature = "json")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "json")]
use serde_with::{hex::Hex, As};

use crate::error::IdentityError;
use crate::EscrowError;

/// Identity of a party as resolved by the authentication layer.
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "json", serde(transparent))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub struct Account(#[cfg_attr(feature = "json", serde(with = "As::<Hex>"))] [u8; 32]);

/// Identifier of a fungible asset type.
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "json", serde(transparent))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub struct TokenId(#[cfg_attr(feature = "json", serde(with = "As::<Hex>"))] [u8; 32]);

impl Account {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl TokenId {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for Account {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<[u8; 32]> for TokenId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl std::fmt::Display for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl std::str::FromStr for Account {
    type Err = EscrowError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(parse_id(s)?))
    }
}

impl std::str::FromStr for TokenId {
    type Err = EscrowError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(parse_id(s)?))
    }
}

/// Parses an optionally `0x`-prefixed hex string of at most 32 bytes,
/// left-padding shorter values with zeros.
fn parse_id(s: &str) -> Result<[u8; 32], IdentityError> {
    let s = s.trim();
    let digits = s.strip_prefix("0x").unwrap_or(s);
    if digits.is_empty() {
        return Err(IdentityError::EmptyIdentity);
    }
    let digits = if digits.len() % 2 == 1 {
        format!("0{digits}")
    } else {
        digits.to_string()
    };
    let bytes = hex::decode(&digits)?;
    if bytes.len() > 32 {
        return Err(IdentityError::TooLong(bytes.len()));
    }
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use core::str::FromStr as _;

    use super::*;

    #[test]
    fn parse_short_hex() {
        let account = Account::from_str("0xdeadbeef").unwrap();
        let mut expected = [0u8; 32];
        expected[28..].copy_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(account, Account::new(expected));

        let token = TokenId::from_str("abc").unwrap();
        assert_eq!(token.as_bytes()[30..], [0x0a, 0xbc]);
    }

    #[test]
    fn display_round_trips() {
        let account = Account::new([7u8; 32]);
        assert_eq!(Account::from_str(&account.to_string()).unwrap(), account);
    }

    #[test]
    fn invalid_identities() {
        assert_eq!(
            Account::from_str("0x"),
            Err(EscrowError::Identity(IdentityError::EmptyIdentity))
        );
        assert!(matches!(
            Account::from_str("0xzz"),
            Err(EscrowError::Identity(IdentityError::Hex(_)))
        ));
        assert_eq!(
            TokenId::from_str(&"ab".repeat(33)),
            Err(EscrowError::Identity(IdentityError::TooLong(33)))
        );
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_is_hex_string() {
        let account = Account::new([0xab; 32]);
        let json = serde_json::to_string(&account).unwrap();
        assert_eq!(json, format!("\"{}\"", "ab".repeat(32)));
        assert_eq!(serde_json::from_str::<Account>(&json).unwrap(), account);

        let token: TokenId = serde_json::from_str(&format!("\"{}\"", "01".repeat(32))).unwrap();
        assert_eq!(token, TokenId::new([1u8; 32]));
        assert!(serde_json::from_str::<TokenId>("[1,2,3]").is_err());
    }
}
