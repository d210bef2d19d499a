use anchor_lang::prelude::*;

// ---------------
// Fixed point
// ---------------
/// 10^18, the scale of `Fixed` and of one whole token / paired unit.
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// Fees and tiers are reported in parts per thousand.
pub const PER_MILLE: u128 = 1_000;

/// Hard ceiling for both the buy-pressure fee and the exit-fee tier, in percent.
pub const MAX_FEE_PERCENT: i64 = 40;

// Exit fees are sent here and leave circulating LP supply.
pub const BURN_ADDRESS: Pubkey = Pubkey::new_from_array([0u8; 32]);

// ---------------
// Lock duration
// ---------------
pub const SECONDS_PER_DAY: i64 = 86_400;
pub const DEFAULT_MIN_LOCK_TIME: i64 = SECONDS_PER_DAY;

pub const DEFAULT_SCALING_WET: i64 = -2_543_780;
pub const DEFAULT_SHIFT_WET: i64 = 7_776_000;
pub const DEFAULT_SCALING_DRY: i64 = -1_683_876;
// 7_612_435.5
pub const DEFAULT_SHIFT_DRY_RAW: i128 = 7_612_435_500_000_000_000_000_000;
// 0.15 paired units of health
pub const DEFAULT_REGIME_THRESHOLD_RAW: i128 = 150_000_000_000_000_000;
pub const DEFAULT_MAX_HEALTH: i64 = 10_000;

// ---------------
// Buy pressure
// ---------------
// IEEE-754 binary128 encodings of the launch calibration (fee in percent).
pub const BUY_PRESSURE_A_BITS: u128 = 0xbfcb59e05f1e2674d208f2461d9cb64e;
pub const BUY_PRESSURE_B_BITS: u128 = 0x3fde33dcfe54a3802b3e313af8e0e525;
pub const BUY_PRESSURE_C_BITS: u128 = 0x3ff164840e1719f7f8ca8198f1d3ed52;

pub const DEFAULT_BUY_PRESSURE_A_RAW: i128 = -300;
pub const DEFAULT_BUY_PRESSURE_B_RAW: i128 = 140_000_000;
pub const DEFAULT_BUY_PRESSURE_C_RAW: i128 = 85_000_000_000_000;
pub const DEFAULT_BUY_PRESSURE_D_RAW: i128 = 0;
pub const DEFAULT_MAX_RESERVES: u128 = 500_000 * WAD;

// ---------------
// Lock percentage
// ---------------
pub const LOCK_PERCENTAGE_P0_BITS: u128 = 0x3ff7cac083126e978d4fdf3b645a1cac;
pub const LOCK_PERCENTAGE_D0_BITS: u128 = 0x40004000000000000000000000000000;
pub const LOCK_PERCENTAGE_BETA_BITS: u128 = 0x40061db6db6db5a1484ad8a787aa1421;

pub const DEFAULT_D_MAX: i64 = 10;
pub const DEFAULT_P0_RAW: i128 = 7_000_000_000_000_000;
pub const DEFAULT_D0_RAW: i128 = 400_000_000_000_000_000;
pub const DEFAULT_BETA_RAW: i128 = 142_857_142_857_000_000_000;

// ---------------
// Oracle
// ---------------
/// Minimum spacing between two TWAP checkpoints, in seconds.
pub const ORACLE_PERIOD: i64 = 1_800;
