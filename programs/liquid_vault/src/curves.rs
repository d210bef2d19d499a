use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::VaultError;
use crate::fixed_point::{mul_div_u128, Fixed};
use crate::state::{BuyPressureCalibration, LockPercentageCalibration, LockTimeCalibration};

// -------------------------
// Lock duration
// -------------------------

/// Pool health `paired² / token` in whole paired units, clamped to `max_health`.
pub fn pool_health(paired_reserve: u128, token_reserve: u128, max_health: Fixed) -> Result<Fixed> {
    require!(
        paired_reserve != 0 && token_reserve != 0,
        VaultError::ReservesUnavailable
    );
    // raw WAD value of paired²/(token·WAD) is paired²/token in base units
    let health = mul_div_u128(paired_reserve, paired_reserve, token_reserve)
        .and_then(|raw| i128::try_from(raw).ok())
        .map(Fixed::from_raw);
    Ok(match health {
        Some(h) if h <= max_health => h,
        _ => max_health,
    })
}

/// Lock period in seconds for the given reserves. Never below `min_lock_time`.
///
/// Out-of-range curve values saturate: negative ones land on the floor, positive ones on `i64::MAX`.
pub fn lock_duration(
    cal: &LockTimeCalibration,
    paired_reserve: u128,
    token_reserve: u128,
) -> Result<i64> {
    let x = pool_health(paired_reserve, token_reserve, cal.max_health)?;

    let (scaling, shift) = if x <= cal.regime_threshold {
        (cal.scaling_wet, cal.shift_wet)
    } else {
        (cal.scaling_dry, cal.shift_dry)
    };

    let seconds = scaling.saturating_mul(x).saturating_add(shift).floor();
    let seconds = i64::try_from(seconds).unwrap_or(if seconds < 0 { i64::MIN } else { i64::MAX });
    Ok(seconds.max(cal.min_lock_time))
}

// -------------------------
// Buy pressure
// -------------------------

/// Buy-pressure fee in per-mille for the given token reserve (base units), within `[0, 400]`.
pub fn buy_pressure_per_mille(cal: &BuyPressureCalibration, token_reserve: u128) -> Result<u64> {
    let depth = Fixed::from_ratio(token_reserve.min(cal.max_reserves), WAD).unwrap_or(Fixed::MAX);
    let percent = Fixed::horner(&[cal.a, cal.b, cal.c, cal.d], depth)
        .clamp_to(Fixed::ZERO, Fixed::from_int(MAX_FEE_PERCENT));
    percent_to_per_mille(percent)
}

/// `floor(value · per_mille / 1000)`.
pub fn fee_from_per_mille(value: u128, per_mille: u64) -> Result<u128> {
    Ok(mul_div_u128(value, per_mille as u128, PER_MILLE).ok_or(VaultError::MathOverflow)?)
}

// -------------------------
// Lock percentage
// -------------------------

/// Spot price of one token in paired units.
pub fn spot_price(paired_reserve: u128, token_reserve: u128) -> Result<Fixed> {
    require!(
        paired_reserve != 0 && token_reserve != 0,
        VaultError::ReservesUnavailable
    );
    Fixed::from_ratio(paired_reserve, token_reserve)
}

/// Relative drift `|spot - twap| / twap`. A missing or zero average means no drift.
pub fn price_deviation(spot: Fixed, twap: Option<Fixed>) -> Result<Fixed> {
    match twap {
        Some(avg) if avg > Fixed::ZERO => {
            let drift = spot.checked_sub(avg)?.abs()?;
            Ok(drift.checked_div(avg).unwrap_or(Fixed::MAX))
        }
        _ => Ok(Fixed::ZERO),
    }
}

/// Exit-fee tier in per-mille, bounded by `d_max` and the protocol ceiling.
pub fn lock_percentage_per_mille(cal: &LockPercentageCalibration, deviation: Fixed) -> Result<u64> {
    let excess = deviation.checked_sub(cal.p0)?.max(Fixed::ZERO);
    let ceiling = cal.d_max.min(Fixed::from_int(MAX_FEE_PERCENT)).max(Fixed::ZERO);
    let percent = cal
        .d0
        .saturating_add(cal.beta.saturating_mul(excess))
        .clamp_to(Fixed::ZERO, ceiling);
    percent_to_per_mille(percent)
}

fn percent_to_per_mille(percent: Fixed) -> Result<u64> {
    let per_mille = percent.checked_mul(Fixed::from_int(10))?.to_u128_floor();
    Ok(u64::try_from(per_mille).map_err(|_| VaultError::MathOverflow)?)
}
