//! Shared-handle fakes for the vault's collaborators. Clones observe the same state.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use anchor_lang::prelude::*;

use crate::constants::WAD;
use crate::errors::{error_code_of, VaultError};
use crate::fixed_point::mul_div_u128;
use crate::interfaces::{FeeSink, LiquidityPool, PoolReserves, PriceOracle, TokenLedger};
use crate::oracle::TwapOracle;
use crate::state::{InsertionPolicy, VaultConfig};
use crate::vault::LiquidVault;

pub(crate) const NOW: i64 = 1_000_000;

/// Anchor error code carried by a failed result.
pub(crate) fn code<T>(res: Result<T>) -> u32 {
    match res {
        Ok(_) => panic!("expected an error"),
        Err(e) => error_code_of(&e).unwrap_or(0),
    }
}

// -------------------------
// Token
// -------------------------
pub(crate) struct TokenState {
    key: Pubkey,
    balances: BTreeMap<Pubkey, u128>,
}

#[derive(Clone)]
pub(crate) struct FakeToken(Rc<RefCell<TokenState>>);

impl FakeToken {
    pub fn new() -> Self {
        FakeToken(Rc::new(RefCell::new(TokenState {
            key: Pubkey::new_unique(),
            balances: BTreeMap::new(),
        })))
    }

    pub fn mint(&self, owner: &Pubkey, amount: u128) {
        *self.0.borrow_mut().balances.entry(*owner).or_default() += amount;
    }
}

impl TokenLedger for FakeToken {
    fn key(&self) -> Pubkey {
        self.0.borrow().key
    }

    fn balance_of(&self, owner: &Pubkey) -> u128 {
        self.0.borrow().balances.get(owner).copied().unwrap_or(0)
    }

    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u128) -> Result<()> {
        let mut st = self.0.borrow_mut();
        let have = st.balances.get(from).copied().unwrap_or(0);
        require!(have >= amount, VaultError::InsufficientVaultTokenBalance);
        st.balances.insert(*from, have - amount);
        *st.balances.entry(*to).or_default() += amount;
        Ok(())
    }
}

// -------------------------
// Pool
// -------------------------
pub(crate) struct PoolState {
    key: Pubkey,
    router: Pubkey,
    reserves: PoolReserves,
    cumulative: u128,
    units: BTreeMap<Pubkey, u128>,
    total_units: u128,
}

impl PoolState {
    fn spot_raw(&self) -> u128 {
        if self.reserves.token_reserve == 0 {
            return 0;
        }
        mul_div_u128(self.reserves.paired_reserve, WAD, self.reserves.token_reserve).unwrap_or(0)
    }

    fn accumulate(&mut self, now: i64) {
        let elapsed = (now - self.reserves.last_update).max(0) as u128;
        let accrued = self.spot_raw() * elapsed;
        self.cumulative += accrued;
        self.reserves.last_update = now;
    }
}

#[derive(Clone)]
pub(crate) struct FakePool(Rc<RefCell<PoolState>>);

impl FakePool {
    pub fn new(now: i64) -> Self {
        FakePool(Rc::new(RefCell::new(PoolState {
            key: Pubkey::new_unique(),
            router: Pubkey::new_unique(),
            reserves: PoolReserves {
                last_update: now,
                ..Default::default()
            },
            cumulative: 0,
            units: BTreeMap::new(),
            total_units: 0,
        })))
    }

    /// Replaces both reserves at `at`, as a swap or an outside deposit would.
    pub fn seed_reserves(&self, token_reserve: u128, paired_reserve: u128, at: i64) {
        let mut st = self.0.borrow_mut();
        st.accumulate(at);
        st.reserves.token_reserve = token_reserve;
        st.reserves.paired_reserve = paired_reserve;
    }

    pub fn mint_units(&self, owner: &Pubkey, amount: u128) {
        let mut st = self.0.borrow_mut();
        *st.units.entry(*owner).or_default() += amount;
        st.total_units += amount;
    }

    pub fn total_units(&self) -> u128 {
        self.0.borrow().total_units
    }
}

impl LiquidityPool for FakePool {
    fn key(&self) -> Pubkey {
        self.0.borrow().key
    }

    fn router(&self) -> Pubkey {
        self.0.borrow().router
    }

    fn reserves(&self) -> PoolReserves {
        self.0.borrow().reserves
    }

    fn quote_paired_amount(&self, value_in: u128) -> Result<u128> {
        let r = self.0.borrow().reserves;
        require!(
            r.token_reserve != 0 && r.paired_reserve != 0,
            VaultError::ReservesUnavailable
        );
        Ok(mul_div_u128(value_in, r.token_reserve, r.paired_reserve).ok_or(VaultError::MathOverflow)?)
    }

    fn add_liquidity(&mut self, provider: &Pubkey, value_in: u128, token_in: u128, now: i64) -> Result<u128> {
        let mut st = self.0.borrow_mut();
        st.accumulate(now);
        let minted = if st.total_units == 0 {
            value_in
        } else {
            let by_value = mul_div_u128(value_in, st.total_units, st.reserves.paired_reserve).unwrap_or(0);
            let by_token = mul_div_u128(token_in, st.total_units, st.reserves.token_reserve).unwrap_or(0);
            by_value.min(by_token)
        };
        st.reserves.paired_reserve += value_in;
        st.reserves.token_reserve += token_in;
        *st.units.entry(*provider).or_default() += minted;
        st.total_units += minted;
        Ok(minted)
    }

    fn units_balance_of(&self, owner: &Pubkey) -> u128 {
        self.0.borrow().units.get(owner).copied().unwrap_or(0)
    }

    fn transfer_units(&mut self, from: &Pubkey, to: &Pubkey, amount: u128) -> Result<()> {
        let mut st = self.0.borrow_mut();
        let have = st.units.get(from).copied().unwrap_or(0);
        require!(have >= amount, VaultError::InsufficientPoolBalance);
        st.units.insert(*from, have - amount);
        *st.units.entry(*to).or_default() += amount;
        Ok(())
    }

    fn price_cumulative(&self, now: i64) -> Result<u128> {
        let st = self.0.borrow();
        let elapsed = (now - st.reserves.last_update).max(0) as u128;
        Ok(st.cumulative + st.spot_raw() * elapsed)
    }
}

// -------------------------
// Fee sink
// -------------------------
pub(crate) struct SinkState {
    key: Pubkey,
    received: u128,
}

#[derive(Clone)]
pub(crate) struct FakeSink(Rc<RefCell<SinkState>>);

impl FakeSink {
    pub fn new() -> Self {
        FakeSink(Rc::new(RefCell::new(SinkState {
            key: Pubkey::new_unique(),
            received: 0,
        })))
    }

    pub fn received(&self) -> u128 {
        self.0.borrow().received
    }
}

impl FeeSink for FakeSink {
    fn key(&self) -> Pubkey {
        self.0.borrow().key
    }

    fn deposit(&mut self, _from: &Pubkey, value: u128) -> Result<()> {
        self.0.borrow_mut().received += value;
        Ok(())
    }
}

// -------------------------
// Harness
// -------------------------
pub(crate) type TestVault = LiquidVault<FakeToken, FakePool, TwapOracle<FakePool>, FakeSink>;

/// Vault wired to fresh fakes: 100k tokens against 500 paired in the pool, 1M tokens in the vault.
pub(crate) struct Harness {
    pub vault: TestVault,
    pub token: FakeToken,
    pub pool: FakePool,
    pub sink: FakeSink,
    pub owner: Pubkey,
    pub treasury: Pubkey,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_policy(InsertionPolicy::ExplicitLatch)
    }

    pub fn with_policy(policy: InsertionPolicy) -> Self {
        let mut h = Self::unseeded(policy);
        let cfg = h.config();
        let owner = h.owner;
        h.vault.seed(owner, cfg).unwrap();
        h
    }

    pub fn unseeded(policy: InsertionPolicy) -> Self {
        let token = FakeToken::new();
        let pool = FakePool::new(0);
        let sink = FakeSink::new();
        pool.seed_reserves(100_000 * WAD, 500 * WAD, 0);
        pool.mint_units(&Pubkey::new_unique(), 500 * WAD);

        let key = Pubkey::new_unique();
        token.mint(&key, 1_000_000 * WAD);

        let owner = Pubkey::new_unique();
        let oracle = TwapOracle::new(Pubkey::new_unique(), pool.clone());
        let vault = LiquidVault::new(
            key,
            owner,
            token.clone(),
            pool.clone(),
            oracle,
            sink.clone(),
            policy,
        );
        Harness {
            vault,
            token,
            pool,
            sink,
            owner,
            treasury: Pubkey::new_unique(),
        }
    }

    pub fn config(&self) -> VaultConfig {
        VaultConfig {
            token: self.token.key(),
            pool: self.pool.key(),
            router: self.pool.router(),
            fee_sink: self.sink.key(),
            treasury: self.treasury,
            oracle: self.vault.oracle.key(),
            black_hole_share: 10,
        }
    }
}
