use anchor_lang::prelude::*;

use crate::interfaces::{FeeSink, LiquidityPool, PriceOracle, TokenLedger};
use crate::vault::LiquidVault;

impl<T, P, O, F> LiquidVault<T, P, O, F>
where
    T: TokenLedger,
    P: LiquidityPool,
    O: PriceOracle,
    F: FeeSink,
{
    /// Copies unclaimed batches over from a previous vault. The LP itself is moved separately.
    pub fn insert_unclaimed_batch_for(
        &mut self,
        caller: Pubkey,
        holders: &[Pubkey],
        amounts: &[u128],
        timestamps: &[i64],
    ) -> Result<usize> {
        self.only_admin(&caller)?;
        let inserted = self.ledger.bulk_insert(holders, amounts, timestamps)?;

        for ((holder, amount), ts) in holders.iter().zip(amounts).zip(timestamps) {
            emit!(BatchInserted {
                holder: *holder,
                amount: *amount,
                unlock_timestamp: *ts,
            });
        }
        msg!("inserted {} migrated batches", inserted);
        Ok(inserted)
    }

    /// Closes manual insertion for good.
    pub fn finish_batch_insertion(&mut self, caller: Pubkey) -> Result<()> {
        self.only_admin(&caller)?;
        self.ledger.finish_insertion();

        emit!(BatchInsertionFinished { admin: caller });
        Ok(())
    }
}

#[event]
pub struct BatchInserted {
    pub holder: Pubkey,
    pub amount: u128,
    pub unlock_timestamp: i64,
}

#[event]
pub struct BatchInsertionFinished {
    pub admin: Pubkey,
}
