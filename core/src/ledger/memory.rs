use std::collections::HashMap;

use crate::error::LedgerError;
use crate::identity::{Account, TokenId};
use crate::ledger::Ledger;
use crate::Amount;

/// In-memory multi-token ledger with allowance semantics.
///
/// Backs tests and embedders that keep balances locally.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    balances: HashMap<(TokenId, Account), Amount>,
    allowances: HashMap<(TokenId, Account, Account), Amount>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits `amount` of `token` to `to` out of thin air.
    pub fn mint(
        &mut self,
        token: &TokenId,
        to: &Account,
        amount: &Amount,
    ) -> Result<(), LedgerError> {
        let balance = self.balance_of(token, to);
        let updated = balance.checked_add(amount).ok_or(LedgerError::Overflow)?;
        self.balances.insert((*token, *to), updated);
        Ok(())
    }

    /// Sets (not adds to) the allowance `owner` grants `spender`.
    pub fn approve(
        &mut self,
        token: &TokenId,
        owner: &Account,
        spender: &Account,
        amount: Amount,
    ) {
        self.allowances.insert((*token, *owner, *spender), amount);
    }

    pub fn allowance(&self, token: &TokenId, owner: &Account, spender: &Account) -> Amount {
        self.allowances
            .get(&(*token, *owner, *spender))
            .cloned()
            .unwrap_or_default()
    }

    /// Computes both post-transfer balances without writing them.
    fn settle(
        &self,
        token: &TokenId,
        from: &Account,
        to: &Account,
        amount: &Amount,
    ) -> Result<(Amount, Amount), LedgerError> {
        let from_after = self
            .balance_of(token, from)
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance)?;
        if from == to {
            return Ok((from_after, self.balance_of(token, to)));
        }
        let to_after = self
            .balance_of(token, to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        Ok((from_after, to_after))
    }

    fn apply(
        &mut self,
        token: &TokenId,
        from: &Account,
        to: &Account,
        balances: (Amount, Amount),
    ) {
        if from == to {
            return;
        }
        let (from_after, to_after) = balances;
        self.balances.insert((*token, *from), from_after);
        self.balances.insert((*token, *to), to_after);
    }
}

impl Ledger for MemoryLedger {
    fn balance_of(&self, token: &TokenId, account: &Account) -> Amount {
        self.balances
            .get(&(*token, *account))
            .cloned()
            .unwrap_or_default()
    }

    fn transfer_from(
        &mut self,
        token: &TokenId,
        spender: &Account,
        from: &Account,
        to: &Account,
        amount: &Amount,
    ) -> Result<(), LedgerError> {
        let remaining = self
            .allowance(token, from, spender)
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientAllowance)?;
        let balances = self.settle(token, from, to, amount)?;
        self.allowances.insert((*token, *from, *spender), remaining);
        self.apply(token, from, to, balances);
        Ok(())
    }

    fn transfer(
        &mut self,
        token: &TokenId,
        from: &Account,
        to: &Account,
        amount: &Amount,
    ) -> Result<(), LedgerError> {
        let balances = self.settle(token, from, to, amount)?;
        self.apply(token, from, to, balances);
        Ok(())
    }
}
