use anchor_lang::prelude::*;

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
    /// Pairs `value` with vault tokens, deposits both into the pool and locks the LP for `caller`.
    pub fn purchase(&mut self, caller: Pubkey, value: u128, now: i64) -> Result<LpQueued> {
        require!(value > 0, VaultError::ZeroValueInput);
        require!(!self.purchases_disabled, VaultError::PurchasesDisabled);
        self.purchase_lp(caller, value, now)
    }

    /// Admin path that ignores the purchases-disabled flag.
    pub(crate) fn admin_purchase(&mut self, caller: Pubkey, value: u128, now: i64) -> Result<LpQueued> {
        self.only_admin(&caller)?;
        require!(value > 0, VaultError::ZeroValueInput);
        self.purchase_lp(caller, value, now)
    }

    fn purchase_lp(&mut self, holder: Pubkey, value: u128, now: i64) -> Result<LpQueued> {
        let cfg = self.seeded_config()?;

        let fee_per_mille =
            curves::buy_pressure_per_mille(&self.buy_pressure, self.pool.reserves().token_reserve)?;
        let fee = curves::fee_from_per_mille(value, fee_per_mille)?;
        let net_value = value.checked_sub(fee).ok_or(VaultError::MathOverflow)?;

        let token_amount = self.pool.quote_paired_amount(net_value)?;
        require!(
            self.token.balance_of(&self.key) >= token_amount,
            VaultError::InsufficientVaultTokenBalance
        );

        if fee > 0 {
            self.fee_sink.deposit(&holder, fee)?;
        }
        self.token.transfer(&self.key, &cfg.pool, token_amount)?;
        let lp_amount = self.pool.add_liquidity(&self.key, net_value, token_amount, now)?;

        let lock_period = self.lock_period_for(self.pool.reserves())?;
        let unlock_timestamp = now.checked_add(lock_period).ok_or(VaultError::MathOverflow)?;
        let index = self.ledger.append(holder, lp_amount, unlock_timestamp)?;

        msg!(
            "queued {} LP for {} until {} (batch {})",
            lp_amount,
            holder,
            unlock_timestamp,
            index
        );

        let event = LpQueued {
            holder,
            lp_amount,
            token_amount,
            net_value,
            fee,
            timestamp: now,
            lock_period,
            unlock_timestamp,
        };
        emit!(event.clone());
        Ok(event)
    }
}

#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LpQueued {
    pub holder: Pubkey,
    pub lp_amount: u128,
    pub token_amount: u128,
    pub net_value: u128,
    pub fee: u128,
    pub timestamp: i64,
    pub lock_period: i64,
    pub unlock_timestamp: i64,
}
