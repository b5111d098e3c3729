//! Append-only storage of stashes and hints, plus the id counter.

use std::collections::BTreeMap;

use bincode::{Decode, Encode};
#[cfg(feature = "json")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::felt::Felt;
use crate::stash::{HintRecord, Stash, StashKey};
use crate::{EscrowError, Result};

/// Stash and hint storage owned by the escrow service.
///
/// Records are never removed. The only mutation of an existing stash is
/// [`StashRegistry::mark_claimed`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StashRegistry {
    next_id: u64,
    stashes: BTreeMap<StashKey, Stash>,
    hints: BTreeMap<u64, Vec<Felt>>,
}

/// Serializable image of a [`StashRegistry`].
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode)]
pub struct RegistrySnapshot {
    pub next_id: u64,
    pub stashes: Vec<Stash>,
    pub hints: Vec<HintRecord>,
}

impl StashRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next unused id and advances the counter.
    pub fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        debug!(id, "allocated hint id");
        id
    }

    /// The id the next [`StashRegistry::allocate_id`] call will return.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Inserts a new stash.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::DuplicateKey`] if a stash already exists at `key`.
    pub fn put(&mut self, key: StashKey, stash: Stash) -> Result<()> {
        if self.stashes.contains_key(&key) {
            return Err(EscrowError::DuplicateKey);
        }
        self.stashes.insert(key, stash);
        Ok(())
    }

    pub fn get(&self, key: &StashKey) -> Result<&Stash> {
        self.stashes.get(key).ok_or(EscrowError::NotFound)
    }

    pub fn contains(&self, key: &StashKey) -> bool {
        self.stashes.contains_key(key)
    }

    /// Flips `claimed` to true.
    ///
    /// # Errors
    ///
    /// [`EscrowError::NotFound`] if absent, [`EscrowError::AlreadyClaimed`]
    /// if the flag is already set.
    pub fn mark_claimed(&mut self, key: &StashKey) -> Result<()> {
        let stash = self.stashes.get_mut(key).ok_or(EscrowError::NotFound)?;
        if stash.claimed {
            return Err(EscrowError::AlreadyClaimed);
        }
        stash.claimed = true;
        Ok(())
    }

    /// Stores the hint chunks for `hint_id`, even when empty.
    pub fn put_hint(&mut self, hint_id: u64, chunks: Vec<Felt>) -> Result<()> {
        if self.hints.contains_key(&hint_id) {
            return Err(EscrowError::DuplicateKey);
        }
        self.hints.insert(hint_id, chunks);
        Ok(())
    }

    pub fn has_hint(&self, hint_id: u64) -> bool {
        self.hints.contains_key(&hint_id)
    }

    /// Hint chunks for `hint_id`; empty if none were stored.
    pub fn hint(&self, hint_id: u64) -> &[Felt] {
        self.hints.get(&hint_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.stashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stashes.is_empty()
    }

    /// Stashes in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Stash> {
        self.stashes.values()
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            next_id: self.next_id,
            stashes: self.stashes.values().cloned().collect(),
            hints: self
                .hints
                .iter()
                .map(|(hint_id, chunks)| HintRecord {
                    hint_id: *hint_id,
                    chunks: chunks.clone(),
                })
                .collect(),
        }
    }

    /// Rebuilds a registry, rejecting duplicates and ids the counter has not
    /// reached yet.
    pub fn from_snapshot(snapshot: RegistrySnapshot) -> Result<Self> {
        let mut registry = Self {
            next_id: snapshot.next_id,
            ..Self::default()
        };
        for record in snapshot.hints {
            registry.check_allocated(record.hint_id)?;
            registry.put_hint(record.hint_id, record.chunks)?;
        }
        for stash in snapshot.stashes {
            registry.check_allocated(stash.hint_id)?;
            registry.put(stash.key(), stash)?;
        }
        Ok(registry)
    }

    /// Encodes a snapshot with the standard bincode configuration.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::encode_to_vec(self.snapshot(), bincode::config::standard())
            .map_err(|e| EscrowError::Snapshot(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (snapshot, _): (RegistrySnapshot, usize) =
            bincode::decode_from_slice(bytes, bincode::config::standard())
                .map_err(|e| EscrowError::Snapshot(e.to_string()))?;
        Self::from_snapshot(snapshot)
    }

    fn check_allocated(&self, hint_id: u64) -> Result<()> {
        if hint_id >= self.next_id {
            return Err(EscrowError::Snapshot(format!(
                "id {hint_id} not yet allocated (next id {})",
                self.next_id
            )));
        }
        Ok(())
    }
}
