use anchor_lang::prelude::*;

use crate::constants::BURN_ADDRESS;
use crate::curves;
use crate::errors::VaultError;
use crate::interfaces::{FeeSink, LiquidityPool, PriceOracle, TokenLedger};
use crate::vault::LiquidVault;

impl<T, P, O, F> LiquidVault<T, P, O, F>
where
    T: TokenLedger,
    P: LiquidityPool,
    O: PriceOracle,
    F: FeeSink,
{
    /// Releases the caller's oldest batch once it is unlocked. The exit fee is split
    /// between the burn address and the fee sink by `black_hole_share`.
    pub fn claim(&mut self, caller: Pubkey, now: i64) -> Result<LpClaimed> {
        let cfg = self.seeded_config()?;

        let claimable = self.ledger.peek_claimable(&caller, now)?;
        let amount = claimable.batch.amount;
        require!(
            self.pool.units_balance_of(&self.key) >= amount,
            VaultError::InsufficientPoolBalance
        );

        // tier from the average the refresh below will produce; nothing is written yet
        let average = self.oracle.preview(now).ok().or(self.last_price_average);
        let tier = self.exit_tier(average)?;
        let exit_fee = curves::fee_from_per_mille(amount, tier)?;
        let burned = curves::fee_from_per_mille(exit_fee, cfg.black_hole_share)?;
        let redistributed = exit_fee.checked_sub(burned).ok_or(VaultError::MathOverflow)?;
        let payout = amount.checked_sub(exit_fee).ok_or(VaultError::MathOverflow)?;

        // ledger settles before any unit leaves the vault
        self.ledger.advance_claim(&caller)?;

        if burned > 0 {
            self.pool.transfer_units(&self.key, &BURN_ADDRESS, burned)?;
        }
        if redistributed > 0 {
            self.pool.transfer_units(&self.key, &cfg.fee_sink, redistributed)?;
        }
        if payout > 0 {
            self.pool.transfer_units(&self.key, &caller, payout)?;
        }
        self.refresh_price_average(now);

        let event = LpClaimed {
            holder: caller,
            amount,
            payout,
            exit_fee,
            burned,
            redistributed,
            batch_index: claimable.index,
            exit_tier_per_mille: tier,
        };
        emit!(event.clone());
        Ok(event)
    }

    /// Best-effort oracle refresh. A stale oracle never blocks a claim.
    fn refresh_price_average(&mut self, now: i64) {
        if let Err(e) = self.oracle.update(now) {
            msg!("oracle update skipped: {}", e);
        }
        if let Ok(avg) = self.oracle.consult() {
            self.last_price_average = Some(avg);
        }
    }
}

#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LpClaimed {
    pub holder: Pubkey,
    pub amount: u128,
    pub payout: u128,
    pub exit_fee: u128,
    pub burned: u128,
    pub redistributed: u128,
    pub batch_index: u64,
    pub exit_tier_per_mille: u64,
}
