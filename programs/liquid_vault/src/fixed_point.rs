use anchor_lang::prelude::*;

use crate::constants::WAD;
use crate::errors::VaultError;

const LIMB_MASK: u128 = u64::MAX as u128;

/// Signed decimal fixed point with 18 fractional digits.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Fixed(i128);

impl Fixed {
    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(WAD as i128);
    pub const MIN: Fixed = Fixed(i128::MIN);
    pub const MAX: Fixed = Fixed(i128::MAX);

    pub const fn from_raw(raw: i128) -> Self {
        Fixed(raw)
    }

    pub const fn raw(self) -> i128 {
        self.0
    }

    pub const fn from_int(v: i64) -> Self {
        Fixed(v as i128 * WAD as i128)
    }

    /// `num / den`, truncated.
    pub fn from_ratio(num: u128, den: u128) -> Result<Self> {
        let raw = mul_div_u128(num, WAD, den).ok_or(VaultError::MathOverflow)?;
        let raw = i128::try_from(raw).map_err(|_| VaultError::MathOverflow)?;
        Ok(Fixed(raw))
    }

    /// Value expressed in parts per thousand.
    pub fn from_per_mille(v: u64) -> Self {
        Fixed(v as i128 * (WAD / 1_000) as i128)
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn abs(self) -> Result<Self> {
        self.0.checked_abs().map(Fixed).ok_or(error!(VaultError::MathOverflow))
    }

    pub fn checked_add(self, rhs: Fixed) -> Result<Self> {
        self.0
            .checked_add(rhs.0)
            .map(Fixed)
            .ok_or(error!(VaultError::MathOverflow))
    }

    pub fn checked_sub(self, rhs: Fixed) -> Result<Self> {
        self.0
            .checked_sub(rhs.0)
            .map(Fixed)
            .ok_or(error!(VaultError::MathOverflow))
    }

    /// Product truncated toward zero.
    pub fn checked_mul(self, rhs: Fixed) -> Result<Self> {
        let mag = mul_div_u128(self.0.unsigned_abs(), rhs.0.unsigned_abs(), WAD)
            .ok_or(VaultError::MathOverflow)?;
        signed(mag, (self.0 < 0) != (rhs.0 < 0))
    }

    pub fn saturating_add(self, rhs: Fixed) -> Self {
        Fixed(self.0.saturating_add(rhs.0))
    }

    /// Like `checked_mul`, but pinned to `MIN`/`MAX` by the sign of the product.
    pub fn saturating_mul(self, rhs: Fixed) -> Self {
        match self.checked_mul(rhs) {
            Ok(v) => v,
            Err(_) if (self.0 < 0) != (rhs.0 < 0) => Fixed::MIN,
            Err(_) => Fixed::MAX,
        }
    }

    /// Quotient truncated toward zero.
    pub fn checked_div(self, rhs: Fixed) -> Result<Self> {
        require!(rhs.0 != 0, VaultError::MathOverflow);
        let mag = mul_div_u128(self.0.unsigned_abs(), WAD, rhs.0.unsigned_abs())
            .ok_or(VaultError::MathOverflow)?;
        signed(mag, (self.0 < 0) != (rhs.0 < 0))
    }

    /// Largest integer not above the value.
    pub fn floor(self) -> i128 {
        self.0.div_euclid(WAD as i128)
    }

    /// Floor of a non-negative value; negatives read as zero.
    pub fn to_u128_floor(self) -> u128 {
        if self.0 <= 0 {
            0
        } else {
            self.0 as u128 / WAD
        }
    }

    /// Decodes an IEEE-754 binary128 bit pattern, rounding to the nearest 10^-18.
    ///
    /// Only the top 63 fraction bits are used; the rest sit far below the WAD resolution
    /// for every magnitude this crate works with.
    pub fn from_binary128(bits: u128) -> Result<Self> {
        let negative = bits >> 127 == 1;
        let exponent = ((bits >> 112) & 0x7fff) as i32;
        let fraction = bits & ((1u128 << 112) - 1);

        require!(exponent != 0x7fff, VaultError::MathOverflow);
        if exponent == 0 {
            // zero or subnormal
            return Ok(Fixed::ZERO);
        }

        let significand = (1u128 << 63) | (fraction >> 49);
        // < 2^64 * 2^60
        let scaled = significand * WAD;
        let shift = exponent - 16_383 - 63;

        let mag = if shift >= 0 {
            let s = shift as u32;
            require!(s < scaled.leading_zeros(), VaultError::MathOverflow);
            scaled << s
        } else {
            let s = shift.unsigned_abs();
            if s >= 128 {
                0
            } else {
                let half = (scaled >> (s - 1)) & 1;
                (scaled >> s) + half
            }
        };
        signed(mag, negative)
    }

    /// Evaluates `c[0]·x^(n-1) + … + c[n-1]` in Horner form, saturating at every step.
    pub fn horner(coefficients: &[Fixed], x: Fixed) -> Self {
        let mut acc = Fixed::ZERO;
        for (i, c) in coefficients.iter().enumerate() {
            acc = if i == 0 { *c } else { acc.saturating_mul(x).saturating_add(*c) };
        }
        acc
    }

    pub fn clamp_to(self, lo: Fixed, hi: Fixed) -> Self {
        if self < lo {
            lo
        } else if self > hi {
            hi
        } else {
            self
        }
    }
}

fn signed(mag: u128, negative: bool) -> Result<Fixed> {
    let v = i128::try_from(mag).map_err(|_| VaultError::MathOverflow)?;
    Ok(Fixed(if negative { -v } else { v }))
}

/// `floor(a * b / d)` with a 256-bit intermediate. `None` on `d == 0` or a result above `u128::MAX`.
pub fn mul_div_u128(a: u128, b: u128, d: u128) -> Option<u128> {
    if d == 0 {
        return None;
    }
    let (hi, lo) = widening_mul(a, b);
    div_wide(hi, lo, d)
}

fn widening_mul(a: u128, b: u128) -> (u128, u128) {
    let (a1, a0) = (a >> 64, a & LIMB_MASK);
    let (b1, b0) = (b >> 64, b & LIMB_MASK);

    let p00 = a0 * b0;
    let p01 = a0 * b1;
    let p10 = a1 * b0;
    let p11 = a1 * b1;

    // < 3 * 2^64
    let mid = (p00 >> 64) + (p01 & LIMB_MASK) + (p10 & LIMB_MASK);
    let lo = (p00 & LIMB_MASK) | ((mid & LIMB_MASK) << 64);
    let hi = p11 + (p01 >> 64) + (p10 >> 64) + (mid >> 64);
    (hi, lo)
}

fn div_wide(hi: u128, lo: u128, d: u128) -> Option<u128> {
    if hi == 0 {
        return Some(lo / d);
    }
    if hi >= d {
        return None;
    }
    let mut rem = hi;
    let mut q: u128 = 0;
    for i in (0..128).rev() {
        let carry = rem >> 127;
        rem = (rem << 1) | ((lo >> i) & 1);
        q <<= 1;
        if carry == 1 || rem >= d {
            rem = rem.wrapping_sub(d);
            q |= 1;
        }
    }
    Some(q)
}
