use anchor_lang::prelude::*;

use crate::constants::*;
use crate::fixed_point::Fixed;

#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Debug, PartialEq, Eq)]
pub struct LockedBatch {
    pub holder: Pubkey,
    pub amount: u128,
    pub unlock_timestamp: i64,
    pub claimed: bool,
}

/// One holder's batches in claim order.
///
/// Every batch below `cursor` is claimed; every batch at or above it is not.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct HolderQueue {
    pub batches: Vec<LockedBatch>,
    pub cursor: u64,
}

#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Debug, PartialEq, Eq)]
pub struct VaultConfig {
    pub token: Pubkey,
    pub pool: Pubkey,
    pub router: Pubkey,
    pub fee_sink: Pubkey,
    pub treasury: Pubkey,
    pub oracle: Pubkey,
    /// Per-mille of every exit fee that is burned; the rest goes to the fee sink.
    pub black_hole_share: u64,
}

impl VaultConfig {
    pub fn keys(&self) -> [Pubkey; 6] {
        [
            self.token,
            self.pool,
            self.router,
            self.fee_sink,
            self.treasury,
            self.oracle,
        ]
    }
}

// -------------------------
// Calibrations
// -------------------------

/// Two linear regimes over pool health (`paired² / token`, whole paired units).
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct LockTimeCalibration {
    pub scaling_wet: Fixed,
    pub shift_wet: Fixed,
    pub scaling_dry: Fixed,
    pub shift_dry: Fixed,
    /// Health at or below this evaluates the wet regime.
    pub regime_threshold: Fixed,
    /// Health is clamped to this bound before evaluation.
    pub max_health: Fixed,
    /// Seconds.
    pub min_lock_time: i64,
}

impl Default for LockTimeCalibration {
    fn default() -> Self {
        Self {
            scaling_wet: Fixed::from_int(DEFAULT_SCALING_WET),
            shift_wet: Fixed::from_int(DEFAULT_SHIFT_WET),
            scaling_dry: Fixed::from_int(DEFAULT_SCALING_DRY),
            shift_dry: Fixed::from_raw(DEFAULT_SHIFT_DRY_RAW),
            regime_threshold: Fixed::from_raw(DEFAULT_REGIME_THRESHOLD_RAW),
            max_health: Fixed::from_int(DEFAULT_MAX_HEALTH),
            min_lock_time: DEFAULT_MIN_LOCK_TIME,
        }
    }
}

/// Fee percent as `a·x³ + b·x² + c·x + d` over token depth in whole tokens.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuyPressureCalibration {
    pub a: Fixed,
    pub b: Fixed,
    pub c: Fixed,
    pub d: Fixed,
    /// Token reserve (base units) beyond which the fee no longer moves.
    pub max_reserves: u128,
}

impl Default for BuyPressureCalibration {
    fn default() -> Self {
        Self {
            a: Fixed::from_raw(DEFAULT_BUY_PRESSURE_A_RAW),
            b: Fixed::from_raw(DEFAULT_BUY_PRESSURE_B_RAW),
            c: Fixed::from_raw(DEFAULT_BUY_PRESSURE_C_RAW),
            d: Fixed::from_raw(DEFAULT_BUY_PRESSURE_D_RAW),
            max_reserves: DEFAULT_MAX_RESERVES,
        }
    }
}

/// Exit-fee tier in percent: `clamp(d0 + beta·max(0, deviation - p0), 0, d_max)`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct LockPercentageCalibration {
    pub d_max: Fixed,
    pub p0: Fixed,
    pub d0: Fixed,
    pub beta: Fixed,
}

impl Default for LockPercentageCalibration {
    fn default() -> Self {
        Self {
            d_max: Fixed::from_int(DEFAULT_D_MAX),
            p0: Fixed::from_raw(DEFAULT_P0_RAW),
            d0: Fixed::from_raw(DEFAULT_D0_RAW),
            beta: Fixed::from_raw(DEFAULT_BETA_RAW),
        }
    }
}

// -------------------------
// Access / migration
// -------------------------

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InsertionPolicy {
    /// Closed only by `finish_batch_insertion`.
    #[default]
    ExplicitLatch,
    /// Also closed by any other administrative mutation.
    CloseOnAdminMutation,
}

/// Who may call privileged operations.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessRole {
    Owner { owner: Pubkey },
    /// Temporarily held by a rescue controller; `owner` gets it back on release.
    RescueController { controller: Pubkey, owner: Pubkey },
}

impl AccessRole {
    pub fn admin(&self) -> Pubkey {
        match self {
            AccessRole::Owner { owner } => *owner,
            AccessRole::RescueController { controller, .. } => *controller,
        }
    }

    pub fn is_rescue(&self) -> bool {
        matches!(self, AccessRole::RescueController { .. })
    }
}

// -------------------------
// Rescue
// -------------------------

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RescuePhase {
    Idle,
    Seeded,
    ConfigCaptured,
    Draining,
    Released,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RescueSnapshot {
    pub config: VaultConfig,
    pub lock_time: LockTimeCalibration,
    pub buy_pressure: BuyPressureCalibration,
    pub lock_percentage: LockPercentageCalibration,
    pub force_unlock: bool,
    pub captured_at: i64,
}
