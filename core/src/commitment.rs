//! Hash-chain commitments over ordered secret keys.
//!
//! The committed data is `[n, k1, ..., kn]`, folded from the right:
//! `h(n, h(k1, ... h(k(n-1), kn)))`. Prefixing the count binds the length,
//! folding binds the order.

use subtle::ConstantTimeEq;

use crate::felt::{hash2, Felt};
use crate::{EscrowError, Result};

/// Commits to an ordered list of short secret strings.
///
/// # Errors
///
/// Returns [`EscrowError::InputTooLong`] if any key exceeds 31 bytes.
///
/// # Example
///
/// ```
/// use stash_core::commitment::commit;
///
/// let c = commit(&["key1", "key2", "key3"]).unwrap();
/// assert_eq!(c, commit(&["key1", "key2", "key3"]).unwrap());
/// assert_ne!(c, commit(&["key3", "key2", "key1"]).unwrap());
/// ```
pub fn commit<S: AsRef<str>>(keys: &[S]) -> Result<Felt> {
    let felts = keys
        .iter()
        .map(|k| Felt::from_short_str(k.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    Ok(commit_felts(&felts))
}

/// Commits to keys that are already field elements.
pub fn commit_felts(keys: &[Felt]) -> Felt {
    let len = Felt::from_u64(keys.len() as u64);
    let tail = keys.iter().rev().fold(None, |acc: Option<Felt>, key| {
        Some(match acc {
            None => *key,
            Some(acc) => hash2(key, &acc),
        })
    });
    match tail {
        None => len,
        Some(tail) => hash2(&len, &tail),
    }
}

/// Recomputes the commitment for `keys` and compares it to `expected`
/// in constant time.
pub fn verify<S: AsRef<str>>(keys: &[S], expected: &Felt) -> Result<()> {
    let computed = commit(keys)?;
    computed
        .as_bytes()
        .ct_eq(expected.as_bytes())
        .unwrap_u8()
        .eq(&1)
        .then_some(())
        .ok_or(EscrowError::KeyMismatch)
}
