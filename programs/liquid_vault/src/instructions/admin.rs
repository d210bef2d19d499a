use anchor_lang::prelude::*;

use crate::constants::PER_MILLE;
use crate::errors::VaultError;
use crate::interfaces::{FeeSink, LiquidityPool, PriceOracle, TokenLedger};
use crate::state::{
    AccessRole, BuyPressureCalibration, LockPercentageCalibration, LockTimeCalibration, VaultConfig,
};
use crate::vault::LiquidVault;

impl<T, P, O, F> LiquidVault<T, P, O, F>
where
    T: TokenLedger,
    P: LiquidityPool,
    O: PriceOracle,
    F: FeeSink,
{
    /// One-time wiring of collaborator addresses. Every mutating operation needs it.
    pub fn seed(&mut self, caller: Pubkey, config: VaultConfig) -> Result<VaultSeeded> {
        self.only_admin(&caller)?;
        require!(self.config.is_none(), VaultError::AlreadySeeded);
        for key in config.keys() {
            require!(key != Pubkey::default(), VaultError::ZeroAddress);
        }
        require!(config.black_hole_share as u128 <= PER_MILLE, VaultError::InvalidShare);
        require_keys_eq!(config.token, self.token.key(), VaultError::CollaboratorMismatch);
        require_keys_eq!(config.pool, self.pool.key(), VaultError::CollaboratorMismatch);
        require_keys_eq!(config.router, self.pool.router(), VaultError::CollaboratorMismatch);
        require_keys_eq!(config.oracle, self.oracle.key(), VaultError::CollaboratorMismatch);
        require_keys_eq!(config.fee_sink, self.fee_sink.key(), VaultError::CollaboratorMismatch);

        self.config = Some(config);

        let event = VaultSeeded {
            vault: self.key,
            token: config.token,
            pool: config.pool,
            treasury: config.treasury,
            oracle: config.oracle,
        };
        emit!(event.clone());
        Ok(event)
    }

    // -------------------------
    // Calibration (no bounds checks; the lock floor and fee ceilings still apply at evaluation)
    // -------------------------

    pub fn unsafe_calibrate_lock_duration(
        &mut self,
        caller: Pubkey,
        calibration: LockTimeCalibration,
    ) -> Result<()> {
        self.only_admin(&caller)?;
        self.lock_time = calibration;
        self.ledger.note_admin_mutation();

        msg!("lock duration recalibrated, min lock {}", calibration.min_lock_time);
        emit!(LockDurationCalibrated { calibration });
        Ok(())
    }

    pub fn unsafe_calibrate_buy_pressure(
        &mut self,
        caller: Pubkey,
        calibration: BuyPressureCalibration,
    ) -> Result<()> {
        self.only_admin(&caller)?;
        self.buy_pressure = calibration;
        self.ledger.note_admin_mutation();

        emit!(BuyPressureCalibrated { calibration });
        Ok(())
    }

    pub fn unsafe_calibrate_lock_percentage(
        &mut self,
        caller: Pubkey,
        calibration: LockPercentageCalibration,
    ) -> Result<()> {
        self.only_admin(&caller)?;
        self.lock_percentage = calibration;
        self.ledger.note_admin_mutation();

        emit!(LockPercentageCalibrated { calibration });
        Ok(())
    }

    // -------------------------
    // Flags
    // -------------------------

    pub fn set_force_unlock(&mut self, caller: Pubkey, enabled: bool) -> Result<()> {
        self.only_admin(&caller)?;
        self.force_unlock = enabled;
        self.ledger.note_admin_mutation();

        emit!(ForceUnlockSet { enabled });
        Ok(())
    }

    pub fn set_purchases_disabled(&mut self, caller: Pubkey, disabled: bool) -> Result<()> {
        self.only_admin(&caller)?;
        self.purchases_disabled = disabled;
        self.ledger.note_admin_mutation();

        emit!(PurchasesDisabledSet { disabled });
        Ok(())
    }

    // -------------------------
    // Collaborator swaps
    // -------------------------

    /// Replaces the price oracle; the cached average belonged to the old one.
    pub fn set_oracle(&mut self, caller: Pubkey, oracle: O) -> Result<()> {
        self.only_admin(&caller)?;
        let mut cfg = self.seeded_config()?;
        require!(oracle.key() != Pubkey::default(), VaultError::ZeroAddress);

        cfg.oracle = oracle.key();
        self.oracle = oracle;
        self.config = Some(cfg);
        self.last_price_average = None;
        self.ledger.note_admin_mutation();
        Ok(())
    }

    pub fn set_fee_sink(&mut self, caller: Pubkey, fee_sink: F) -> Result<()> {
        self.only_admin(&caller)?;
        let mut cfg = self.seeded_config()?;
        require!(fee_sink.key() != Pubkey::default(), VaultError::ZeroAddress);

        cfg.fee_sink = fee_sink.key();
        self.fee_sink = fee_sink;
        self.config = Some(cfg);
        self.ledger.note_admin_mutation();
        Ok(())
    }

    /// Changes how much of each exit fee is burned.
    pub fn set_black_hole_share(&mut self, caller: Pubkey, share: u64) -> Result<()> {
        self.only_admin(&caller)?;
        let mut cfg = self.seeded_config()?;
        require!(share as u128 <= PER_MILLE, VaultError::InvalidShare);

        cfg.black_hole_share = share;
        self.config = Some(cfg);
        self.ledger.note_admin_mutation();

        emit!(BlackHoleShareSet { share });
        Ok(())
    }

    // -------------------------
    // Treasury
    // -------------------------

    pub fn flush_to_treasury(&mut self, caller: Pubkey, amount: u128) -> Result<TreasuryFlushed> {
        self.only_admin(&caller)?;
        let cfg = self.seeded_config()?;
        require!(
            self.token.balance_of(&self.key) >= amount,
            VaultError::InsufficientVaultTokenBalance
        );

        self.ledger.note_admin_mutation();
        self.token.transfer(&self.key, &cfg.treasury, amount)?;

        let event = TreasuryFlushed {
            treasury: cfg.treasury,
            amount,
        };
        emit!(event.clone());
        Ok(event)
    }

    /// Moves the vault's whole pool-unit balance to `dest` under a delegated rescue role.
    /// Holder batches stay as recorded.
    pub(crate) fn sweep_pool_units(&mut self, caller: Pubkey, dest: Pubkey) -> Result<u128> {
        self.only_admin(&caller)?;
        require!(self.authority.is_rescue(), VaultError::Unauthorized);
        require!(dest != Pubkey::default(), VaultError::ZeroAddress);

        let amount = self.pool.units_balance_of(&self.key);
        if amount > 0 {
            self.pool.transfer_units(&self.key, &dest, amount)?;
        }
        msg!("swept {} pool units to {}", amount, dest);
        Ok(amount)
    }

    // -------------------------
    // Ownership
    // -------------------------

    pub fn transfer_ownership(&mut self, caller: Pubkey, new_owner: Pubkey) -> Result<()> {
        self.only_admin(&caller)?;
        require!(new_owner != Pubkey::default(), VaultError::ZeroAddress);

        self.authority = AccessRole::Owner { owner: new_owner };
        self.ledger.note_admin_mutation();

        emit!(OwnershipTransferred {
            previous: caller,
            admin: new_owner,
        });
        Ok(())
    }

    /// Hands privileged access to a rescue controller until it returns it.
    pub fn delegate_to_rescue(&mut self, caller: Pubkey, controller: Pubkey) -> Result<()> {
        self.only_admin(&caller)?;
        require!(controller != Pubkey::default(), VaultError::ZeroAddress);
        require!(!self.authority.is_rescue(), VaultError::InvalidRescuePhase);

        self.authority = AccessRole::RescueController {
            controller,
            owner: caller,
        };
        self.ledger.note_admin_mutation();

        emit!(OwnershipTransferred {
            previous: caller,
            admin: controller,
        });
        Ok(())
    }

    pub fn return_ownership(&mut self, caller: Pubkey) -> Result<()> {
        let owner = match self.authority {
            AccessRole::RescueController { controller, owner } => {
                require_keys_eq!(controller, caller, VaultError::Unauthorized);
                owner
            }
            AccessRole::Owner { .. } => return err!(VaultError::Unauthorized),
        };

        self.authority = AccessRole::Owner { owner };
        self.ledger.note_admin_mutation();

        emit!(OwnershipTransferred {
            previous: caller,
            admin: owner,
        });
        Ok(())
    }
}

#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VaultSeeded {
    pub vault: Pubkey,
    pub token: Pubkey,
    pub pool: Pubkey,
    pub treasury: Pubkey,
    pub oracle: Pubkey,
}

#[event]
pub struct LockDurationCalibrated {
    pub calibration: LockTimeCalibration,
}

#[event]
pub struct BuyPressureCalibrated {
    pub calibration: BuyPressureCalibration,
}

#[event]
pub struct LockPercentageCalibrated {
    pub calibration: LockPercentageCalibration,
}

#[event]
pub struct ForceUnlockSet {
    pub enabled: bool,
}

#[event]
pub struct PurchasesDisabledSet {
    pub disabled: bool,
}

#[event]
pub struct BlackHoleShareSet {
    pub share: u64,
}

#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreasuryFlushed {
    pub treasury: Pubkey,
    pub amount: u128,
}

#[event]
pub struct OwnershipTransferred {
    pub previous: Pubkey,
    pub admin: Pubkey,
}
