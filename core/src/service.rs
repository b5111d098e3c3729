//! Escrow service: create and claim stashes atomically against a ledger.

use tracing::{info, warn};

use crate::codec;
use crate::commitment;
use crate::felt::Felt;
use crate::identity::{Account, TokenId};
use crate::interface::EscrowConfig;
use crate::ledger::Ledger;
use crate::registry::StashRegistry;
use crate::stash::{Location, Stash, StashKey};
use crate::{Amount, EscrowError, Result};

/// Orchestrates stash creation and claiming.
///
/// Every operation either completes or returns an error having changed
/// nothing: all validation happens before the first ledger call, and the
/// registry is only written after the ledger call succeeds.
#[derive(Debug)]
pub struct StashService<L: Ledger> {
    config: EscrowConfig,
    registry: StashRegistry,
    ledger: L,
}

impl<L: Ledger> StashService<L> {
    pub fn new(config: EscrowConfig, ledger: L) -> Self {
        Self::with_registry(config, ledger, StashRegistry::new())
    }

    /// Resumes over a previously persisted registry.
    pub fn with_registry(config: EscrowConfig, ledger: L, registry: StashRegistry) -> Self {
        Self {
            config,
            registry,
            ledger,
        }
    }

    pub fn config(&self) -> &EscrowConfig {
        &self.config
    }

    pub fn custody(&self) -> &Account {
        &self.config.custody
    }

    pub fn registry(&self) -> &StashRegistry {
        &self.registry
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn into_parts(self) -> (EscrowConfig, L, StashRegistry) {
        (self.config, self.ledger, self.registry)
    }

    /// Locks `amount` of `token` behind the hash chain of `keys`.
    ///
    /// Pulls the funds from `caller` into custody (the caller must have
    /// approved the custody account), then records the stash and its hint.
    ///
    /// # Returns
    /// The hint id assigned to the new stash.
    ///
    /// # Errors
    /// - [`EscrowError::NoKeys`] if `keys` is empty
    /// - [`EscrowError::InputTooLong`] for a key or location name over 31 bytes
    /// - see [`StashService::create_stash_with_commitment`]
    pub fn create_stash<S: AsRef<str>>(
        &mut self,
        caller: &Account,
        location: impl Into<Location>,
        token: &TokenId,
        amount: Amount,
        keys: &[S],
        hint: &str,
    ) -> Result<u64> {
        if keys.is_empty() {
            return Err(EscrowError::NoKeys);
        }
        let commitment = commitment::commit(keys)?;
        self.create_stash_with_commitment(caller, location, token, amount, commitment, hint)
    }

    /// Same as [`StashService::create_stash`] for a depositor who computed
    /// the commitment off-line and never reveals the keys at creation.
    ///
    /// # Errors
    /// - [`EscrowError::NoKeys`] if `commitment` is the commitment to no keys
    /// - [`EscrowError::ZeroAmount`] if `amount` is zero
    /// - [`EscrowError::Codec`] if `hint` cannot be chunked
    /// - [`EscrowError::InsufficientAllowance`] / [`EscrowError::InsufficientFunds`]
    ///   if the ledger refuses the deposit
    pub fn create_stash_with_commitment(
        &mut self,
        caller: &Account,
        location: impl Into<Location>,
        token: &TokenId,
        amount: Amount,
        commitment: Felt,
        hint: &str,
    ) -> Result<u64> {
        if commitment == commitment::commit_felts(&[]) {
            return Err(EscrowError::NoKeys);
        }
        if amount.is_zero() {
            return Err(EscrowError::ZeroAmount);
        }
        let location = location.into().to_felt()?;
        let chunks = codec::encode(hint)?;

        let hint_id = self.registry.next_id();
        let key = StashKey::new(location, hint_id);
        if self.registry.contains(&key) || self.registry.has_hint(hint_id) {
            return Err(EscrowError::DuplicateKey);
        }

        let custody = self.config.custody;
        self.ledger
            .transfer_from(token, &custody, caller, &custody, &amount)
            .map_err(|e| {
                warn!(%caller, %token, %amount, error = %e, "deposit refused by ledger");
                EscrowError::from(e)
            })?;

        let hint_id = self.registry.allocate_id();
        self.registry.put_hint(hint_id, chunks)?;
        self.registry.put(
            key,
            Stash {
                location,
                hint_id,
                token: *token,
                amount: amount.clone(),
                commitment,
                owner: *caller,
                claimed: false,
            },
        )?;

        info!(%key, %token, %amount, owner = %caller, "stash created");
        Ok(hint_id)
    }

    /// Releases the stash at `(location, hint_id)` to `caller` if `keys`
    /// reproduce its commitment.
    ///
    /// The stash is marked claimed only after the outbound transfer succeeds.
    ///
    /// # Errors
    /// - [`EscrowError::NoKeys`] if `keys` is empty
    /// - [`EscrowError::NotFound`] if no such stash exists
    /// - [`EscrowError::AlreadyClaimed`] if it was claimed before
    /// - [`EscrowError::KeyMismatch`] if `keys` are wrong
    /// - [`EscrowError::InputTooLong`] if a key is over 31 bytes
    /// - [`EscrowError::InsufficientFunds`] if custody cannot pay out
    pub fn claim_stash<S: AsRef<str>>(
        &mut self,
        caller: &Account,
        location: impl Into<Location>,
        hint_id: u64,
        keys: &[S],
    ) -> Result<()> {
        if keys.is_empty() {
            return Err(EscrowError::NoKeys);
        }
        let key = StashKey::new(location.into().to_felt()?, hint_id);
        let stash = self.registry.get(&key)?;
        if stash.claimed {
            warn!(%key, claimer = %caller, "claim on already claimed stash");
            return Err(EscrowError::AlreadyClaimed);
        }
        if let Err(e) = commitment::verify(keys, &stash.commitment) {
            warn!(%key, claimer = %caller, error = %e, "claim rejected");
            return Err(e);
        }

        let (token, amount) = (stash.token, stash.amount.clone());
        let custody = self.config.custody;
        self.ledger
            .transfer(&token, &custody, caller, &amount)
            .map_err(|e| {
                warn!(%key, %token, %amount, error = %e, "payout refused by ledger");
                EscrowError::from(e)
            })?;
        self.registry.mark_claimed(&key)?;

        info!(%key, %token, %amount, claimer = %caller, "stash claimed");
        Ok(())
    }

    /// Returns the stash at `(location, hint_id)` with its decoded hint.
    pub fn get_stash(
        &self,
        location: impl Into<Location>,
        hint_id: u64,
    ) -> Result<(Stash, String)> {
        let key = StashKey::new(location.into().to_felt()?, hint_id);
        let stash = self.registry.get(&key)?;
        let hint = codec::decode(self.registry.hint(hint_id))?;
        Ok((stash.clone(), hint))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryLedger;
    use crate::stash::StashState;

    const TOKEN: TokenId = TokenId::new([0xaa; 32]);
    const ALICE: Account = Account::new([1u8; 32]);
    const BOB: Account = Account::new([2u8; 32]);
    const CUSTODY: Account = Account::new([0xee; 32]);

    fn service(approved: u64) -> StashService<MemoryLedger> {
        let mut ledger = MemoryLedger::new();
        ledger.mint(&TOKEN, &ALICE, &Amount::from_u64(10_000)).unwrap();
        ledger.approve(&TOKEN, &ALICE, &CUSTODY, Amount::from_u64(approved));
        StashService::new(EscrowConfig { custody: CUSTODY }, ledger)
    }

    #[test]
    fn create_then_get() {
        let mut svc = service(123);
        let keys = ["key1", "key2", "key3"];
        let id = svc
            .create_stash(&ALICE, "loc", &TOKEN, Amount::from_u64(123), &keys, "")
            .unwrap();
        assert_eq!(id, 0);

        let (stash, hint) = svc.get_stash("loc", id).unwrap();
        assert_eq!(stash.amount, Amount::from_u64(123));
        assert_eq!(stash.owner, ALICE);
        assert_eq!(stash.state(), StashState::Unclaimed);
        assert_eq!(stash.commitment, commitment::commit(&["key1", "key2", "key3"]).unwrap());
        assert_eq!(hint, "");
        assert_eq!(svc.ledger().balance_of(&TOKEN, &CUSTODY), Amount::from_u64(123));
    }

    #[test]
    fn precondition_failures_leave_no_trace() {
        let mut svc = service(1_000);
        let no_keys: [&str; 0] = [];
        assert_eq!(
            svc.create_stash(&ALICE, "loc", &TOKEN, Amount::from_u64(5), &no_keys, ""),
            Err(EscrowError::NoKeys)
        );
        assert_eq!(
            svc.create_stash(&ALICE, "loc", &TOKEN, Amount::zero(), &["k"], ""),
            Err(EscrowError::ZeroAmount)
        );
        let long = "x".repeat(32);
        assert_eq!(
            svc.create_stash(&ALICE, long.as_str(), &TOKEN, Amount::from_u64(5), &["k"], ""),
            Err(EscrowError::InputTooLong { len: 32, max: 31 })
        );
        assert_eq!(
            svc.create_stash(&ALICE, "loc", &TOKEN, Amount::from_u64(5), &[long.as_str()], ""),
            Err(EscrowError::InputTooLong { len: 32, max: 31 })
        );

        assert!(svc.registry().is_empty());
        assert_eq!(svc.registry().next_id(), 0);
        assert!(svc.ledger().balance_of(&TOKEN, &CUSTODY).is_zero());
    }

    #[test]
    fn claim_pays_out_once() {
        let mut svc = service(500);
        let keys = ["north", "east", "south"];
        let id = svc
            .create_stash(&ALICE, "cave", &TOKEN, Amount::from_u64(500), &keys, "look up")
            .unwrap();

        svc.claim_stash(&BOB, "cave", id, &keys).unwrap();
        assert_eq!(svc.ledger().balance_of(&TOKEN, &BOB), Amount::from_u64(500));
        assert!(svc.ledger().balance_of(&TOKEN, &CUSTODY).is_zero());
        assert!(svc.get_stash("cave", id).unwrap().0.claimed);

        assert_eq!(
            svc.claim_stash(&BOB, "cave", id, &keys),
            Err(EscrowError::AlreadyClaimed)
        );
        assert_eq!(
            svc.claim_stash(&ALICE, "cave", id, &["wrong"]),
            Err(EscrowError::AlreadyClaimed)
        );
    }

    #[test]
    fn failed_payout_does_not_mark_claimed() {
        let mut svc = service(40);
        let id = svc
            .create_stash(&ALICE, "vault", &TOKEN, Amount::from_u64(40), &["k"], "")
            .unwrap();

        // Drain custody behind the service's back.
        svc.ledger_mut()
            .transfer(&TOKEN, &CUSTODY, &ALICE, &Amount::from_u64(40))
            .unwrap();

        assert_eq!(
            svc.claim_stash(&BOB, "vault", id, &["k"]),
            Err(EscrowError::InsufficientFunds)
        );
        assert!(!svc.get_stash("vault", id).unwrap().0.claimed);
    }

    #[test]
    fn precomputed_commitment() {
        let mut svc = service(10);
        let commitment = commitment::commit(&["a", "b"]).unwrap();
        let amount = Amount::from_u64(10);
        let id = svc
            .create_stash_with_commitment(&ALICE, "spot", &TOKEN, amount, commitment, "")
            .unwrap();
        svc.claim_stash(&BOB, "spot", id, &["a", "b"]).unwrap();
        assert_eq!(svc.ledger().balance_of(&TOKEN, &BOB), Amount::from_u64(10));
    }

    #[test]
    fn empty_key_list_never_commits_or_claims() {
        let mut svc = service(100);
        let empty = commitment::commit_felts(&[]);
        let amount = Amount::from_u64(100);
        assert_eq!(
            svc.create_stash_with_commitment(&ALICE, "loc", &TOKEN, amount, empty, ""),
            Err(EscrowError::NoKeys)
        );
        assert!(svc.registry().is_empty());

        let id = svc
            .create_stash(&ALICE, "loc", &TOKEN, Amount::from_u64(100), &["k"], "")
            .unwrap();
        let no_keys: [&str; 0] = [];
        assert_eq!(
            svc.claim_stash(&BOB, "loc", id, &no_keys),
            Err(EscrowError::NoKeys)
        );
        assert!(!svc.get_stash("loc", id).unwrap().0.claimed);
        assert!(svc.ledger().balance_of(&TOKEN, &BOB).is_zero());
        assert_eq!(svc.ledger().balance_of(&TOKEN, &CUSTODY), Amount::from_u64(100));
    }

    #[test]
    fn over_long_claim_key_is_rejected() {
        let mut svc = service(70);
        let id = svc
            .create_stash(&ALICE, "dock", &TOKEN, Amount::from_u64(70), &["k"], "")
            .unwrap();

        let long = "k".repeat(32);
        assert_eq!(
            svc.claim_stash(&BOB, "dock", id, &[long.as_str()]),
            Err(EscrowError::InputTooLong { len: 32, max: 31 })
        );
        assert!(!svc.get_stash("dock", id).unwrap().0.claimed);
        assert!(svc.ledger().balance_of(&TOKEN, &BOB).is_zero());
        assert_eq!(svc.ledger().balance_of(&TOKEN, &ALICE), Amount::from_u64(9_930));
        assert_eq!(svc.ledger().balance_of(&TOKEN, &CUSTODY), Amount::from_u64(70));
    }

    #[test]
    fn location_by_key() {
        let mut svc = service(10);
        let location = Felt::from_u64(0xdead_beef);
        let id = svc
            .create_stash(&ALICE, location, &TOKEN, Amount::from_u64(10), &["k"], "hint")
            .unwrap();
        let (stash, hint) = svc.get_stash(location, id).unwrap();
        assert_eq!(stash.location, location);
        assert_eq!(hint, "hint");
    }
}
