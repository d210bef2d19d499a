use anchor_lang::prelude::*;

use crate::curves;
use crate::errors::VaultError;
use crate::fixed_point::Fixed;
use crate::interfaces::{FeeSink, LiquidityPool, PoolReserves, PriceOracle, TokenLedger};
use crate::ledger::LockedBatchLedger;
use crate::state::*;

/// Liquidity lock vault over injected token, pool, oracle and fee-sink collaborators.
///
/// Operations live in `instructions/*`; this file holds the struct, guards and views.
pub struct LiquidVault<T, P, O, F> {
    pub(crate) key: Pubkey,
    pub(crate) authority: AccessRole,
    pub(crate) config: Option<VaultConfig>,

    pub(crate) lock_time: LockTimeCalibration,
    pub(crate) buy_pressure: BuyPressureCalibration,
    pub(crate) lock_percentage: LockPercentageCalibration,

    pub(crate) force_unlock: bool,
    pub(crate) purchases_disabled: bool,

    // last successful oracle consult, reused while the oracle has no fresh average
    pub(crate) last_price_average: Option<Fixed>,

    pub(crate) ledger: LockedBatchLedger,

    pub(crate) token: T,
    pub(crate) pool: P,
    pub(crate) oracle: O,
    pub(crate) fee_sink: F,
}

impl<T, P, O, F> LiquidVault<T, P, O, F>
where
    T: TokenLedger,
    P: LiquidityPool,
    O: PriceOracle,
    F: FeeSink,
{
    pub fn new(
        key: Pubkey,
        owner: Pubkey,
        token: T,
        pool: P,
        oracle: O,
        fee_sink: F,
        policy: InsertionPolicy,
    ) -> Self {
        Self {
            key,
            authority: AccessRole::Owner { owner },
            config: None,
            lock_time: LockTimeCalibration::default(),
            buy_pressure: BuyPressureCalibration::default(),
            lock_percentage: LockPercentageCalibration::default(),
            force_unlock: false,
            purchases_disabled: false,
            last_price_average: None,
            ledger: LockedBatchLedger::new(policy),
            token,
            pool,
            oracle,
            fee_sink,
        }
    }

    // -------------------------
    // Guards
    // -------------------------

    pub(crate) fn only_admin(&self, caller: &Pubkey) -> Result<()> {
        require_keys_eq!(self.authority.admin(), *caller, VaultError::Unauthorized);
        Ok(())
    }

    pub(crate) fn seeded_config(&self) -> Result<VaultConfig> {
        Ok(self.config.ok_or(VaultError::NotSeeded)?)
    }

    // -------------------------
    // Views
    // -------------------------

    pub fn key(&self) -> Pubkey {
        self.key
    }

    pub fn authority(&self) -> AccessRole {
        self.authority
    }

    pub fn config(&self) -> Option<VaultConfig> {
        self.config
    }

    pub fn lock_time_calibration(&self) -> LockTimeCalibration {
        self.lock_time
    }

    pub fn buy_pressure_calibration(&self) -> BuyPressureCalibration {
        self.buy_pressure
    }

    pub fn lock_percentage_calibration(&self) -> LockPercentageCalibration {
        self.lock_percentage
    }

    pub fn force_unlock_enabled(&self) -> bool {
        self.force_unlock
    }

    pub fn purchases_disabled(&self) -> bool {
        self.purchases_disabled
    }

    /// Lock period a purchase would get against the current reserves.
    pub fn lock_period(&self) -> Result<i64> {
        self.lock_period_for(self.pool.reserves())
    }

    pub(crate) fn lock_period_for(&self, reserves: PoolReserves) -> Result<i64> {
        if self.force_unlock {
            return Ok(0);
        }
        curves::lock_duration(&self.lock_time, reserves.paired_reserve, reserves.token_reserve)
    }

    pub fn buy_pressure_fee_per_mille(&self) -> Result<u64> {
        curves::buy_pressure_per_mille(&self.buy_pressure, self.pool.reserves().token_reserve)
    }

    /// Exit-fee tier from current spot against the oracle average (or its last known value).
    pub fn lock_percentage_per_mille(&self) -> Result<u64> {
        let average = self.oracle.consult().ok().or(self.last_price_average);
        self.exit_tier(average)
    }

    pub(crate) fn exit_tier(&self, average: Option<Fixed>) -> Result<u64> {
        let r = self.pool.reserves();
        let spot = curves::spot_price(r.paired_reserve, r.token_reserve)?;
        let deviation = curves::price_deviation(spot, average)?;
        curves::lock_percentage_per_mille(&self.lock_percentage, deviation)
    }

    /// Tokens the vault would pair with `value` after the buy-pressure fee.
    pub fn quote_tokens_required(&self, value: u128) -> Result<u128> {
        let fee = curves::fee_from_per_mille(value, self.buy_pressure_fee_per_mille()?)?;
        let net = value.checked_sub(fee).ok_or(VaultError::MathOverflow)?;
        self.pool.quote_paired_amount(net)
    }

    pub fn locked_batch_count(&self, holder: &Pubkey) -> u64 {
        self.ledger.length(holder)
    }

    pub fn locked_batch(&self, holder: &Pubkey, index: u64) -> Result<LockedBatch> {
        Ok(self.ledger.batch(holder, index)?.clone())
    }

    /// Index of the holder's oldest unclaimed batch.
    pub fn claim_cursor(&self, holder: &Pubkey) -> u64 {
        self.ledger.cursor(holder)
    }

    pub fn batch_insertion_finished(&self) -> bool {
        self.ledger.insertion_closed()
    }

    /// LP units the vault itself holds.
    pub fn pool_units_held(&self) -> u128 {
        self.pool.units_balance_of(&self.key)
    }

    pub fn token_balance(&self) -> u128 {
        self.token.balance_of(&self.key)
    }
}
