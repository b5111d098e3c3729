use thiserror::Error;

/// Stash-related errors.
///
/// A deposit the ledger refuses surfaces as either [`EscrowError::InsufficientFunds`]
/// or [`EscrowError::InsufficientAllowance`]; both mean the funds could not be pulled.
#[derive(Debug, Error, PartialEq)]
pub enum EscrowError {
    /// The depositor's balance cannot cover the deposit.
    #[error("insufficient funds")]
    InsufficientFunds,

    /// The depositor has not authorized the escrow to move enough funds.
    #[error("insufficient allowance")]
    InsufficientAllowance,

    /// No stash exists at the requested location and hint id.
    #[error("stash not found")]
    NotFound,

    /// The stash was already claimed.
    #[error("stash already claimed")]
    AlreadyClaimed,

    /// The supplied keys do not reproduce the stored commitment.
    #[error("keys do not match commitment")]
    KeyMismatch,

    /// A single field exceeds the chunk limit.
    #[error("input too long: {len} bytes (max {max})")]
    InputTooLong { len: usize, max: usize },

    /// A record already exists at the given key.
    #[error("duplicate key")]
    DuplicateKey,

    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("at least one key is required")]
    NoKeys,

    #[error("amount exceeds 256 bits")]
    AmountOverflow,

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid field element: {0}")]
    InvalidFelt(String),

    #[error("codec error: {0}")]
    Codec(CodecError),

    #[error("identity error: {0}")]
    Identity(IdentityError),

    #[error("authentication error: {0}")]
    Auth(AuthError),

    #[error("snapshot error: {0}")]
    Snapshot(String),
}

/// Errors from the text chunk codec.
#[derive(Debug, Error, PartialEq)]
pub enum CodecError {
    #[error("text contains a NUL byte")]
    NulByte,

    #[error("chunk {0} does not fit in 31 bytes")]
    ChunkTooWide(usize),

    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// Errors that might occur while parsing an account or token id.
#[derive(Debug, Error, PartialEq)]
pub enum IdentityError {
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("cannot parse identity from empty string")]
    EmptyIdentity,

    #[error("identity longer than 32 bytes: {0}")]
    TooLong(usize),
}

/// Failures reported by an asset ledger.
#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("insufficient balance")]
    InsufficientBalance,

    #[error("insufficient allowance")]
    InsufficientAllowance,

    #[error("balance overflow")]
    Overflow,
}

/// Failures reported by a caller authenticator.
#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    #[error("unknown credentials")]
    UnknownCredentials,

    #[error("stale nonce: got {got}, expected > {last}")]
    StaleNonce { got: u64, last: u64 },
}

impl From<CodecError> for EscrowError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

impl From<IdentityError> for EscrowError {
    fn from(value: IdentityError) -> Self {
        Self::Identity(value)
    }
}

impl From<AuthError> for EscrowError {
    fn from(value: AuthError) -> Self {
        Self::Auth(value)
    }
}

impl From<LedgerError> for EscrowError {
    fn from(value: LedgerError) -> Self {
        match value {
            LedgerError::InsufficientBalance => Self::InsufficientFunds,
            LedgerError::InsufficientAllowance => Self::InsufficientAllowance,
            LedgerError::Overflow => Self::AmountOverflow,
        }
    }
}
