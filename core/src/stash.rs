//! Stash records and the keys they are stored under.

use bincode::{Decode, Encode};
#[cfg(feature = "json")]
use serde::{Deserialize, Serialize};

use crate::felt::Felt;
use crate::identity::{Account, TokenId};
use crate::{Amount, Result};

/// Where a depositor hides a stash: a short name or a pre-hashed key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// At most 31 bytes, converted to a field element big-endian.
    Name(String),
    /// Already a field element.
    Key(Felt),
}

impl Location {
    /// Resolves the storage key component for this location.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EscrowError::InputTooLong`] for names over 31 bytes.
    pub fn to_felt(&self) -> Result<Felt> {
        match self {
            Self::Name(name) => Felt::from_short_str(name),
            Self::Key(key) => Ok(*key),
        }
    }
}

impl From<&str> for Location {
    fn from(value: &str) -> Self {
        Self::Name(value.to_string())
    }
}

impl From<String> for Location {
    fn from(value: String) -> Self {
        Self::Name(value)
    }
}

impl From<Felt> for Location {
    fn from(value: Felt) -> Self {
        Self::Key(value)
    }
}

/// Registry key of a stash.
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub struct StashKey {
    pub location: Felt,
    pub hint_id: u64,
}

impl StashKey {
    pub fn new(location: Felt, hint_id: u64) -> Self {
        Self { location, hint_id }
    }
}

impl std::fmt::Display for StashKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:x}#{}", self.location, self.hint_id)
    }
}

/// Lifecycle of a stash.
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StashState {
    /// Funds are locked; awaiting a claim with the right keys.
    Unclaimed,
    /// Keys were revealed and funds released. Terminal.
    Claimed,
}

/// One escrowed deposit guarded by a commitment.
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Stash {
    pub location: Felt,
    /// Shared with the hint store.
    pub hint_id: u64,
    /// Asset locked in the stash.
    pub token: TokenId,
    pub amount: Amount,
    /// Hash chain over the secret keys.
    pub commitment: Felt,
    /// Who funded it.
    pub owner: Account,
    pub claimed: bool,
}

impl Stash {
    pub fn key(&self) -> StashKey {
        StashKey::new(self.location, self.hint_id)
    }

    pub fn state(&self) -> StashState {
        if self.claimed {
            StashState::Claimed
        } else {
            StashState::Unclaimed
        }
    }
}

/// Hint chunks stored under a hint id. Empty when no hint was given.
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default, Encode, Decode)]
pub struct HintRecord {
    pub hint_id: u64,
    pub chunks: Vec<Felt>,
}
