//! Service configuration and JSON file I/O for configs and registry snapshots.

#[cfg(feature = "json")]
use std::fs::File;
#[cfg(feature = "json")]
use std::path::Path;

#[cfg(feature = "json")]
use anyhow::Context;
#[cfg(feature = "json")]
use serde::de::DeserializeOwned;
#[cfg(feature = "json")]
use serde::{Deserialize, Serialize};

use crate::identity::Account;
#[cfg(feature = "json")]
use crate::registry::{RegistrySnapshot, StashRegistry};

/// Settings for a [`crate::StashService`].
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscrowConfig {
    /// Account that holds deposited funds until they are claimed.
    pub custody: Account,
}

/// Reads a JSON-encoded file from the given `path` and deserializes into type `T`.
///
/// # Errors
///
/// Returns an `anyhow::Error` if the file cannot be opened, read, or parsed.
#[cfg(feature = "json")]
pub fn load_escrow_data<P, T>(path: P) -> anyhow::Result<T>
where
    P: AsRef<Path>,
    T: DeserializeOwned,
{
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("loading escrow data: {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("parsing JSON from {:?}", path))
}

/// Writes `data` (serializable) as pretty-printed JSON to the given `path`.
///
/// # Errors
///
/// Returns an `anyhow::Error` if the file cannot be created or data cannot be serialized.
#[cfg(feature = "json")]
pub fn save_escrow_data<P, T>(path: P, data: &T) -> anyhow::Result<()>
where
    P: AsRef<Path>,
    T: Serialize,
{
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("creating file {:?}", path))?;
    serde_json::to_writer_pretty(file, data)
        .with_context(|| format!("serializing to JSON to {:?}", path))
}

/// Loads a registry from a JSON snapshot, validating its records.
#[cfg(feature = "json")]
pub fn load_registry<P: AsRef<Path>>(path: P) -> anyhow::Result<StashRegistry> {
    let snapshot: RegistrySnapshot = load_escrow_data(&path)?;
    StashRegistry::from_snapshot(snapshot)
        .with_context(|| format!("restoring registry from {:?}", path.as_ref()))
}

#[cfg(feature = "json")]
pub fn save_registry<P: AsRef<Path>>(path: P, registry: &StashRegistry) -> anyhow::Result<()> {
    save_escrow_data(path, &registry.snapshot())
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::felt::Felt;
    use crate::identity::TokenId;
    use crate::stash::Stash;
    use crate::Amount;

    #[test]
    fn config_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("escrow_config.json");
        std::fs::write(&path, format!("{{\"custody\": \"{}\"}}", "ab".repeat(32))).unwrap();

        let config: EscrowConfig = load_escrow_data(&path).unwrap();
        assert_eq!(config.custody, Account::new([0xab; 32]));

        let copy = dir.path().join("copy.json");
        save_escrow_data(&copy, &config).unwrap();
        assert_eq!(load_escrow_data::<_, EscrowConfig>(&copy).unwrap(), config);
    }

    #[test]
    fn missing_or_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        let err = load_escrow_data::<_, EscrowConfig>(&missing).unwrap_err();
        assert!(err.to_string().contains("loading escrow data"));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{\"custody\": 42}").unwrap();
        let err = load_escrow_data::<_, EscrowConfig>(&bad).unwrap_err();
        assert!(err.to_string().contains("parsing JSON"));
    }

    #[test]
    fn registry_snapshot_file() {
        let mut registry = StashRegistry::new();
        let id = registry.allocate_id();
        registry
            .put_hint(id, vec![Felt::from_short_str("under the oak").unwrap()])
            .unwrap();
        let stash = Stash {
            location: Felt::from_short_str("park").unwrap(),
            hint_id: id,
            token: TokenId::new([4u8; 32]),
            amount: Amount::from_u64(123),
            commitment: Felt::from_u64(77),
            owner: Account::new([5u8; 32]),
            claimed: false,
        };
        registry.put(stash.key(), stash).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");
        save_registry(&path, &registry).unwrap();
        assert_eq!(load_registry(&path).unwrap(), registry);
    }
}
