//! Commitment-guarded escrow.
//!
//! A depositor locks a fungible asset behind the hash chain of an ordered
//! list of secret keys, optionally with a public hint. Whoever later reveals
//! the same keys in the same order claims the stash, exactly once.

/// 256-bit asset quantities
pub mod bignum;
/// Ordered key-list hash chains
pub mod commitment;
/// Text to field-element chunks and back
pub mod codec;
pub mod error;
/// Field elements and the compression function
pub mod felt;
/// Accounts and token identifiers
pub mod identity;
/// Configuration and JSON file I/O
pub mod interface;
/// Asset ledger interface and an in-memory ledger
pub mod ledger;
/// Stash and hint storage
pub mod registry;
/// Stash records and keys
pub mod stash;
/// Create, claim and inspect stashes
pub mod service;

pub mod auth;
mod serde;

pub use auth::{Authenticator, Credentials, StaticAuthenticator};
pub use bignum::Amount;
pub use error::EscrowError;
pub use felt::Felt;
pub use identity::{Account, TokenId};
pub use interface::EscrowConfig;
pub use ledger::{Ledger, MemoryLedger};
pub use registry::{RegistrySnapshot, StashRegistry};
pub use service::StashService;
pub use stash::{HintRecord, Location, Stash, StashKey, StashState};

pub type Result<T> = std::result::Result<T, EscrowError>;
