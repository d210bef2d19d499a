use anchor_lang::prelude::*;

use crate::fixed_point::Fixed;

/// Protocol token ledger.
pub trait TokenLedger {
    fn key(&self) -> Pubkey;
    fn balance_of(&self, owner: &Pubkey) -> u128;
    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u128) -> Result<()>;
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolReserves {
    pub token_reserve: u128,
    pub paired_reserve: u128,
    pub last_update: i64,
}

/// AMM pool together with its router: reserves, quoting, deposits and LP-unit transfers.
pub trait LiquidityPool {
    fn key(&self) -> Pubkey;
    fn router(&self) -> Pubkey;
    fn reserves(&self) -> PoolReserves;

    /// Token amount that pairs with `value_in` at the current pool price.
    fn quote_paired_amount(&self, value_in: u128) -> Result<u128>;

    /// Deposits `value_in` paired units plus `token_in` tokens already sent to the pool,
    /// minting LP units to `provider`. Returns the units minted.
    fn add_liquidity(&mut self, provider: &Pubkey, value_in: u128, token_in: u128, now: i64) -> Result<u128>;

    fn units_balance_of(&self, owner: &Pubkey) -> u128;
    fn transfer_units(&mut self, from: &Pubkey, to: &Pubkey, amount: u128) -> Result<()>;

    /// Paired-per-token price (WAD) integrated over seconds up to `now`.
    fn price_cumulative(&self, now: i64) -> Result<u128>;
}

/// Receives the buy-pressure share of incoming value.
pub trait FeeSink {
    fn key(&self) -> Pubkey;
    fn deposit(&mut self, from: &Pubkey, value: u128) -> Result<()>;
}

pub trait PriceOracle {
    fn key(&self) -> Pubkey;
    fn update(&mut self, now: i64) -> Result<()>;
    /// Average paired-per-token price over the most recent completed window.
    fn consult(&self) -> Result<Fixed>;
    /// What `consult` would return after an `update(now)`, leaving the oracle untouched.
    fn preview(&self, now: i64) -> Result<Fixed>;
}
