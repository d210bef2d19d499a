use anchor_lang::prelude::*;

use crate::constants::ORACLE_PERIOD;
use crate::errors::VaultError;
use crate::fixed_point::Fixed;
use crate::interfaces::{LiquidityPool, PriceOracle};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Checkpoint {
    pub price_cumulative: u128,
    pub timestamp: i64,
}

/// Time-weighted average price over the last two pool samples.
pub struct TwapOracle<P: LiquidityPool> {
    key: Pubkey,
    pool: P,
    period: i64,
    previous: Option<Checkpoint>,
    latest: Option<Checkpoint>,
}

impl<P: LiquidityPool> TwapOracle<P> {
    pub fn new(key: Pubkey, pool: P) -> Self {
        Self::with_period(key, pool, ORACLE_PERIOD)
    }

    pub fn with_period(key: Pubkey, pool: P, period: i64) -> Self {
        Self {
            key,
            pool,
            period,
            previous: None,
            latest: None,
        }
    }

    pub fn latest(&self) -> Option<Checkpoint> {
        self.latest
    }
}

impl<P: LiquidityPool> PriceOracle for TwapOracle<P> {
    fn key(&self) -> Pubkey {
        self.key
    }

    fn update(&mut self, now: i64) -> Result<()> {
        if let Some(last) = self.latest {
            let elapsed = now.checked_sub(last.timestamp).ok_or(VaultError::MathOverflow)?;
            require!(elapsed >= self.period, VaultError::OracleUpdatePeriodNotElapsed);
        }

        let checkpoint = Checkpoint {
            price_cumulative: self.pool.price_cumulative(now)?,
            timestamp: now,
        };
        self.previous = self.latest.replace(checkpoint);

        msg!("oracle checkpoint at {}", now);
        Ok(())
    }

    fn consult(&self) -> Result<Fixed> {
        match (self.previous, self.latest) {
            (Some(first), Some(last)) => window_average(first, last),
            _ => err!(VaultError::OracleNotYetUpdated),
        }
    }

    fn preview(&self, now: i64) -> Result<Fixed> {
        let last = match self.latest {
            Some(last) => last,
            None => return err!(VaultError::OracleNotYetUpdated),
        };
        let elapsed = now.checked_sub(last.timestamp).ok_or(VaultError::MathOverflow)?;
        if elapsed < self.period {
            return self.consult();
        }
        let next = Checkpoint {
            price_cumulative: self.pool.price_cumulative(now)?,
            timestamp: now,
        };
        window_average(last, next)
    }
}

fn window_average(first: Checkpoint, last: Checkpoint) -> Result<Fixed> {
    let elapsed = last
        .timestamp
        .checked_sub(first.timestamp)
        .filter(|dt| *dt > 0)
        .ok_or(VaultError::MathOverflow)?;
    let delta = last
        .price_cumulative
        .checked_sub(first.price_cumulative)
        .ok_or(VaultError::MathOverflow)?;
    let average = delta / elapsed as u128;
    Ok(Fixed::from_raw(
        i128::try_from(average).map_err(|_| VaultError::MathOverflow)?,
    ))
}
