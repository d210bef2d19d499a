use std::collections::BTreeMap;

use anchor_lang::prelude::*;

use crate::errors::VaultError;
use crate::state::{HolderQueue, InsertionPolicy, LockedBatch};

/// Per-holder append-only log of locked batches, claimed strictly oldest first.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct LockedBatchLedger {
    queues: BTreeMap<Pubkey, HolderQueue>,
    policy: InsertionPolicy,
    insertion_closed: bool,
}

/// Batch at a holder's cursor that has passed its unlock time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Claimable {
    pub index: u64,
    pub batch: LockedBatch,
}

impl LockedBatchLedger {
    pub fn new(policy: InsertionPolicy) -> Self {
        Self {
            queues: BTreeMap::new(),
            policy,
            insertion_closed: false,
        }
    }

    pub fn append(&mut self, holder: Pubkey, amount: u128, unlock_timestamp: i64) -> std::result::Result<u64, VaultError> {
        if amount == 0 {
            return Err(VaultError::ZeroAmount);
        }
        let queue = self.queues.entry(holder).or_default();
        queue.batches.push(LockedBatch {
            holder,
            amount,
            unlock_timestamp,
            claimed: false,
        });
        Ok(queue.batches.len() as u64 - 1)
    }

    /// Batches ever appended for `holder`, claimed or not.
    pub fn length(&self, holder: &Pubkey) -> u64 {
        self.queues.get(holder).map_or(0, |q| q.batches.len() as u64)
    }

    pub fn cursor(&self, holder: &Pubkey) -> u64 {
        self.queues.get(holder).map_or(0, |q| q.cursor)
    }

    pub fn batch(&self, holder: &Pubkey, index: u64) -> std::result::Result<&LockedBatch, VaultError> {
        self.queues
            .get(holder)
            .and_then(|q| q.batches.get(index as usize))
            .ok_or(VaultError::BatchNotFound)
    }

    pub fn unclaimed_total(&self, holder: &Pubkey) -> u128 {
        self.queues.get(holder).map_or(0, |q| {
            q.batches
                .iter()
                .skip(q.cursor as usize)
                .map(|b| b.amount)
                .sum()
        })
    }

    /// Oldest unclaimed batch, provided it is unlocked at `now`.
    pub fn peek_claimable(&self, holder: &Pubkey, now: i64) -> std::result::Result<Claimable, VaultError> {
        let queue = self.queues.get(holder).ok_or(VaultError::NothingToClaim)?;
        let batch = queue
            .batches
            .get(queue.cursor as usize)
            .ok_or(VaultError::NothingToClaim)?;
        if now < batch.unlock_timestamp {
            return Err(VaultError::StillLocked);
        }
        Ok(Claimable {
            index: queue.cursor,
            batch: batch.clone(),
        })
    }

    /// Marks the batch at the cursor claimed and moves past it.
    pub fn advance_claim(&mut self, holder: &Pubkey) -> std::result::Result<LockedBatch, VaultError> {
        let queue = self.queues.get_mut(holder).ok_or(VaultError::NothingToClaim)?;
        let batch = queue
            .batches
            .get_mut(queue.cursor as usize)
            .ok_or(VaultError::NothingToClaim)?;
        batch.claimed = true;
        let claimed = batch.clone();
        queue.cursor += 1;
        Ok(claimed)
    }

    pub fn insertion_closed(&self) -> bool {
        self.insertion_closed
    }

    /// Appends migrated batches. All tuples are validated before any is written.
    pub fn bulk_insert(
        &mut self,
        holders: &[Pubkey],
        amounts: &[u128],
        timestamps: &[i64],
    ) -> std::result::Result<usize, VaultError> {
        if self.insertion_closed {
            return Err(VaultError::BatchInsertionClosed);
        }
        if holders.len() != amounts.len() || holders.len() != timestamps.len() {
            return Err(VaultError::ArrayLengthMismatch);
        }
        for (holder, amount) in holders.iter().zip(amounts) {
            if *holder == Pubkey::default() {
                return Err(VaultError::ZeroAddress);
            }
            if *amount == 0 {
                return Err(VaultError::ZeroAmount);
            }
        }

        for ((holder, amount), ts) in holders.iter().zip(amounts).zip(timestamps) {
            self.append(*holder, *amount, *ts)?;
        }
        Ok(holders.len())
    }

    /// One-way latch.
    pub fn finish_insertion(&mut self) {
        self.insertion_closed = true;
    }

    /// Hook for administrative mutations other than insertion itself.
    pub fn note_admin_mutation(&mut self) {
        if self.policy == InsertionPolicy::CloseOnAdminMutation {
            self.insertion_closed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_queue_invariant(ledger: &LockedBatchLedger, holder: &Pubkey) {
        let cursor = ledger.cursor(holder);
        let len = ledger.length(holder);
        assert!(cursor <= len);
        for i in 0..len {
            let b = ledger.batch(holder, i).unwrap();
            assert_eq!(b.claimed, i < cursor, "batch {} claimed flag vs cursor {}", i, cursor);
        }
    }

    #[test]
    fn append_rejects_zero_amount() {
        let mut ledger = LockedBatchLedger::default();
        let h = Pubkey::new_unique();
        assert!(matches!(ledger.append(h, 0, 10), Err(VaultError::ZeroAmount)));
        assert_eq!(ledger.length(&h), 0);
    }

    #[test]
    fn peek_on_empty_queue() {
        let ledger = LockedBatchLedger::default();
        let h = Pubkey::new_unique();
        assert!(matches!(ledger.peek_claimable(&h, 0), Err(VaultError::NothingToClaim)));
    }

    #[test]
    fn maturity_is_inclusive() {
        let mut ledger = LockedBatchLedger::default();
        let h = Pubkey::new_unique();
        ledger.append(h, 5, 100).unwrap();
        assert!(matches!(ledger.peek_claimable(&h, 99), Err(VaultError::StillLocked)));
        assert_eq!(ledger.peek_claimable(&h, 100).unwrap().index, 0);
    }

    #[test]
    fn claims_are_fifo_even_when_newer_matures_first() {
        let mut ledger = LockedBatchLedger::default();
        let h = Pubkey::new_unique();
        ledger.append(h, 10, 1_000).unwrap();
        ledger.append(h, 20, 500).unwrap();

        // newer batch is mature, older is not: still blocked
        assert!(matches!(ledger.peek_claimable(&h, 600), Err(VaultError::StillLocked)));

        let first = ledger.peek_claimable(&h, 1_000).unwrap();
        assert_eq!(first.index, 0);
        assert_eq!(first.batch.amount, 10);
        assert_eq!(ledger.advance_claim(&h).unwrap().amount, 10);
        check_queue_invariant(&ledger, &h);

        assert_eq!(ledger.peek_claimable(&h, 1_000).unwrap().batch.amount, 20);
        ledger.advance_claim(&h).unwrap();
        check_queue_invariant(&ledger, &h);
        assert!(matches!(ledger.peek_claimable(&h, 9_999), Err(VaultError::NothingToClaim)));
    }

    #[test]
    fn both_matured_first_comes_first() {
        let mut ledger = LockedBatchLedger::default();
        let h = Pubkey::new_unique();
        let t = 1_000;
        ledger.append(h, 7, t).unwrap();
        ledger.append(h, 9, t + 500).unwrap();

        let c = ledger.peek_claimable(&h, t + 500).unwrap();
        assert_eq!(c.index, 0);
        assert_eq!(c.batch.amount, 7);
    }

    #[test]
    fn holders_are_isolated() {
        let mut ledger = LockedBatchLedger::default();
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        ledger.append(a, 1, 0).unwrap();
        ledger.append(b, 2, 0).unwrap();
        ledger.append(b, 3, 0).unwrap();

        ledger.advance_claim(&a).unwrap();
        assert_eq!(ledger.cursor(&a), 1);
        assert_eq!(ledger.cursor(&b), 0);
        assert_eq!(ledger.unclaimed_total(&b), 5);
        check_queue_invariant(&ledger, &a);
        check_queue_invariant(&ledger, &b);
    }

    #[test]
    fn bulk_insert_validates_everything_first() {
        let mut ledger = LockedBatchLedger::default();
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();

        assert!(matches!(
            ledger.bulk_insert(&[a, b], &[1], &[0, 0]),
            Err(VaultError::ArrayLengthMismatch)
        ));
        assert!(matches!(
            ledger.bulk_insert(&[a, b], &[1, 0], &[0, 0]),
            Err(VaultError::ZeroAmount)
        ));
        assert!(matches!(
            ledger.bulk_insert(&[a, Pubkey::default()], &[1, 1], &[0, 0]),
            Err(VaultError::ZeroAddress)
        ));
        assert_eq!(ledger.length(&a), 0);

        assert_eq!(ledger.bulk_insert(&[a, b, a], &[1, 2, 3], &[10, 20, 30]).unwrap(), 3);
        assert_eq!(ledger.length(&a), 2);
        assert_eq!(ledger.batch(&a, 1).unwrap().unlock_timestamp, 30);
    }

    #[test]
    fn migrated_and_purchased_batches_interleave() {
        let mut ledger = LockedBatchLedger::default();
        let h = Pubkey::new_unique();
        ledger.append(h, 1, 0).unwrap();
        ledger.bulk_insert(&[h], &[2], &[0]).unwrap();
        ledger.append(h, 3, 0).unwrap();
        let amounts: Vec<u128> = (0..3).map(|i| ledger.batch(&h, i).unwrap().amount).collect();
        assert_eq!(amounts, vec![1, 2, 3]);
    }

    #[test]
    fn finish_latch_is_permanent() {
        let mut ledger = LockedBatchLedger::default();
        let h = Pubkey::new_unique();
        ledger.finish_insertion();
        assert!(matches!(
            ledger.bulk_insert(&[h], &[1], &[0]),
            Err(VaultError::BatchInsertionClosed)
        ));
        assert_eq!(ledger.length(&h), 0);
        assert!(ledger.insertion_closed());
    }

    #[test]
    fn strict_policy_closes_on_admin_mutation() {
        let mut relaxed = LockedBatchLedger::new(InsertionPolicy::ExplicitLatch);
        relaxed.note_admin_mutation();
        assert!(!relaxed.insertion_closed());

        let mut strict = LockedBatchLedger::new(InsertionPolicy::CloseOnAdminMutation);
        strict.note_admin_mutation();
        assert!(strict.insertion_closed());
    }

    #[test]
    fn batch_lookup_out_of_range() {
        let ledger = LockedBatchLedger::default();
        assert!(matches!(
            ledger.batch(&Pubkey::new_unique(), 0),
            Err(VaultError::BatchNotFound)
        ));
    }
}
