//! The asset ledger the escrow moves funds through.

mod memory;

pub use memory::MemoryLedger;

use crate::error::LedgerError;
use crate::identity::{Account, TokenId};
use crate::Amount;

/// Fungible-asset ledger consulted by the escrow service.
///
/// Implementors must make each transfer all-or-nothing: a failed call
/// leaves every balance and allowance untouched.
pub trait Ledger {
    /// Balance of `account` in `token`.
    fn balance_of(&self, token: &TokenId, account: &Account) -> Amount;

    /// Move `amount` from `from` to `to` on behalf of `spender`, consuming
    /// allowance that `from` granted to `spender`.
    ///
    /// # Errors
    /// - [`LedgerError::InsufficientAllowance`] if the allowance is too small
    /// - [`LedgerError::InsufficientBalance`] if `from` cannot cover `amount`
    fn transfer_from(
        &mut self,
        token: &TokenId,
        spender: &Account,
        from: &Account,
        to: &Account,
        amount: &Amount,
    ) -> Result<(), LedgerError>;

    /// Move `amount` from `from` to `to`, where `from` is the acting party.
    ///
    /// # Errors
    /// - [`LedgerError::InsufficientBalance`] if `from` cannot cover `amount`
    fn transfer(
        &mut self,
        token: &TokenId,
        from: &Account,
        to: &Account,
        amount: &Amount,
    ) -> Result<(), LedgerError>;
}
