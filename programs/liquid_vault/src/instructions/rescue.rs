use anchor_lang::prelude::*;

use crate::curves;
use crate::errors::VaultError;
use crate::interfaces::{FeeSink, LiquidityPool, PriceOracle, TokenLedger};
use crate::state::{AccessRole, RescuePhase, RescueSnapshot};
use crate::vault::LiquidVault;

use super::purchase::LpQueued;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PurchaseQuote {
    pub fee_per_mille: u64,
    pub fee: u128,
    pub net_value: u128,
    pub token_amount: u128,
}

/// Emergency drain session over a vault that has delegated its admin role to `key`.
///
/// The controller borrows the vault for the whole session. Dropping it without
/// `release_ownership` leaves the vault delegated.
pub struct RescueController<'v, T, P, O, F> {
    key: Pubkey,
    vault: &'v mut LiquidVault<T, P, O, F>,
    funded: u128,
    phase: RescuePhase,
    snapshot: Option<RescueSnapshot>,
}

impl<'v, T, P, O, F> RescueController<'v, T, P, O, F>
where
    T: TokenLedger,
    P: LiquidityPool,
    O: PriceOracle,
    F: FeeSink,
{
    /// Attaches to a vault whose authority already names `key` as rescue controller.
    pub fn new(key: Pubkey, vault: &'v mut LiquidVault<T, P, O, F>) -> Result<Self> {
        match vault.authority() {
            AccessRole::RescueController { controller, .. } => {
                require_keys_eq!(controller, key, VaultError::Unauthorized);
            }
            AccessRole::Owner { .. } => return err!(VaultError::Unauthorized),
        }

        Ok(Self {
            key,
            vault,
            funded: 0,
            phase: RescuePhase::Idle,
            snapshot: None,
        })
    }

    pub fn key(&self) -> Pubkey {
        self.key
    }

    pub fn phase(&self) -> RescuePhase {
        self.phase
    }

    pub fn snapshot(&self) -> Option<RescueSnapshot> {
        self.snapshot
    }

    pub fn funded(&self) -> u128 {
        self.funded
    }

    /// Holder operations keep working through this handle during the session.
    pub fn vault(&mut self) -> &mut LiquidVault<T, P, O, F> {
        &mut *self.vault
    }

    // -------------------------
    // Session
    // -------------------------

    /// Funds the controller with the value its single purchase will spend.
    pub fn seed(&mut self, value: u128) -> Result<()> {
        require!(self.phase == RescuePhase::Idle, VaultError::InvalidRescuePhase);
        require!(value > 0, VaultError::ZeroValueInput);
        self.vault.seeded_config()?;

        self.funded = value;
        self.phase = RescuePhase::Seeded;

        emit!(RescueSeeded {
            controller: self.key,
            vault: self.vault.key(),
            value,
        });
        Ok(())
    }

    /// Freezes config and calibrations, then closes public purchases.
    pub fn capture_config(&mut self, now: i64) -> Result<RescueSnapshot> {
        require!(self.phase == RescuePhase::Seeded, VaultError::InvalidRescuePhase);
        let config = self.vault.seeded_config()?;

        let snapshot = RescueSnapshot {
            config,
            lock_time: self.vault.lock_time_calibration(),
            buy_pressure: self.vault.buy_pressure_calibration(),
            lock_percentage: self.vault.lock_percentage_calibration(),
            force_unlock: self.vault.force_unlock_enabled(),
            captured_at: now,
        };
        self.vault.set_purchases_disabled(self.key, true)?;

        self.snapshot = Some(snapshot);
        self.phase = RescuePhase::ConfigCaptured;

        msg!("rescue {} captured config at {}", self.key, now);
        emit!(RescueConfigCaptured {
            controller: self.key,
            force_unlock: snapshot.force_unlock,
            captured_at: now,
        });
        Ok(snapshot)
    }

    // -------------------------
    // Captured math
    // -------------------------

    /// Lock period the captured calibration gives against current reserves.
    pub fn projected_lock_period(&self) -> Result<i64> {
        let snapshot = self.captured()?;
        if snapshot.force_unlock {
            return Ok(0);
        }
        let r = self.vault.pool.reserves();
        curves::lock_duration(&snapshot.lock_time, r.paired_reserve, r.token_reserve)
    }

    /// Fee split and token pairing a purchase of `value` gets under the captured buy-pressure curve.
    pub fn projected_purchase(&self, value: u128) -> Result<PurchaseQuote> {
        let snapshot = self.captured()?;
        let fee_per_mille = curves::buy_pressure_per_mille(
            &snapshot.buy_pressure,
            self.vault.pool.reserves().token_reserve,
        )?;
        let fee = curves::fee_from_per_mille(value, fee_per_mille)?;
        let net_value = value.checked_sub(fee).ok_or(VaultError::MathOverflow)?;
        let token_amount = self.vault.pool.quote_paired_amount(net_value)?;
        Ok(PurchaseQuote {
            fee_per_mille,
            fee,
            net_value,
            token_amount,
        })
    }

    /// Exit fee on `amount` under the captured lock-percentage curve and the last known average.
    pub fn projected_exit_fee(&self, amount: u128) -> Result<u128> {
        let snapshot = self.captured()?;
        let r = self.vault.pool.reserves();
        let spot = curves::spot_price(r.paired_reserve, r.token_reserve)?;
        let average = self.vault.oracle.consult().ok().or(self.vault.last_price_average);
        let deviation = curves::price_deviation(spot, average)?;
        let tier = curves::lock_percentage_per_mille(&snapshot.lock_percentage, deviation)?;
        curves::fee_from_per_mille(amount, tier)
    }

    // -------------------------
    // Drain
    // -------------------------

    /// Spends the funded value on one batch owned by the controller.
    ///
    /// The captured config and quote are checked first, so a swapped collaborator or a
    /// vault short of tokens fails before anything moves.
    pub fn admin_purchase(&mut self, now: i64) -> Result<LpQueued> {
        let snapshot = self.captured()?;
        let value = self.funded;
        require!(value > 0, VaultError::ZeroValueInput);
        require!(
            self.vault.config() == Some(snapshot.config),
            VaultError::CollaboratorMismatch
        );
        let quote = self.projected_purchase(value)?;
        require!(
            self.vault.token_balance() >= quote.token_amount,
            VaultError::InsufficientVaultTokenBalance
        );

        let queued = self.vault.admin_purchase(self.key, value, now)?;
        self.funded = 0;
        self.phase = RescuePhase::Draining;
        Ok(queued)
    }

    /// Claims up to `iterations` of the controller's own batches and returns how many were claimed.
    ///
    /// Once the controller's queue is exhausted, the rest of the vault's pool units are swept
    /// to the controller. Other holders' batches are left as recorded.
    pub fn claim(&mut self, iterations: u32, now: i64) -> Result<u32> {
        self.captured()?;

        let mut processed = 0u32;
        while processed < iterations {
            match self.vault.ledger.peek_claimable(&self.key, now) {
                Ok(_) => {}
                Err(VaultError::NothingToClaim) => break,
                Err(VaultError::StillLocked) if processed > 0 => break,
                Err(e) => return Err(e.into()),
            }
            self.vault.claim(self.key, now)?;
            processed += 1;
        }

        let exhausted = matches!(
            self.vault.ledger.peek_claimable(&self.key, now),
            Err(VaultError::NothingToClaim)
        );
        let swept = if exhausted {
            self.vault.sweep_pool_units(self.key, self.key)?
        } else {
            0
        };

        if processed > 0 || swept > 0 {
            self.phase = RescuePhase::Draining;
            emit!(RescueDrained {
                controller: self.key,
                batches: processed,
                swept,
                cursor: self.vault.claim_cursor(&self.key),
            });
        }
        Ok(processed)
    }

    /// Moves every pool unit the controller holds to `dest`.
    pub fn withdraw_to(&mut self, dest: Pubkey) -> Result<RescueWithdrawn> {
        self.not_released()?;
        require!(dest != Pubkey::default(), VaultError::ZeroAddress);

        let amount = self.vault.pool.units_balance_of(&self.key);
        if amount > 0 {
            self.vault.pool.transfer_units(&self.key, &dest, amount)?;
        }

        let event = RescueWithdrawn {
            controller: self.key,
            destination: dest,
            amount,
        };
        emit!(event.clone());
        Ok(event)
    }

    /// Hands the admin role back to the owner that delegated it. The session is over afterwards.
    pub fn release_ownership(&mut self) -> Result<()> {
        self.not_released()?;
        self.vault.return_ownership(self.key)?;
        self.phase = RescuePhase::Released;

        emit!(RescueReleased {
            controller: self.key,
            admin: self.vault.authority().admin(),
        });
        Ok(())
    }

    pub fn withdraw_and_release(&mut self, dest: Pubkey) -> Result<RescueWithdrawn> {
        let withdrawn = self.withdraw_to(dest)?;
        self.release_ownership()?;
        Ok(withdrawn)
    }

    fn not_released(&self) -> Result<()> {
        require!(self.phase != RescuePhase::Released, VaultError::InvalidRescuePhase);
        Ok(())
    }

    fn captured(&self) -> Result<RescueSnapshot> {
        match self.phase {
            RescuePhase::ConfigCaptured | RescuePhase::Draining => {
                Ok(self.snapshot.ok_or(VaultError::ConfigNotCaptured)?)
            }
            _ => err!(VaultError::ConfigNotCaptured),
        }
    }
}

#[event]
pub struct RescueSeeded {
    pub controller: Pubkey,
    pub vault: Pubkey,
    pub value: u128,
}

#[event]
pub struct RescueConfigCaptured {
    pub controller: Pubkey,
    pub force_unlock: bool,
    pub captured_at: i64,
}

#[event]
pub struct RescueDrained {
    pub controller: Pubkey,
    pub batches: u32,
    pub swept: u128,
    pub cursor: u64,
}

#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RescueWithdrawn {
    pub controller: Pubkey,
    pub destination: Pubkey,
    pub amount: u128,
}

#[event]
pub struct RescueReleased {
    pub controller: Pubkey,
    pub admin: Pubkey,
}
