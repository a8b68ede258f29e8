//! Checked arithmetic that reports failures as [`CurveError`] instead of wrapping or panicking.

use crate::error::CurveError;
use anchor_lang::prelude::*;
use ethnum::U256;

pub trait SafeMath: Sized {
    fn safe_add(self, rhs: Self) -> Result<Self>;
    fn safe_sub(self, rhs: Self) -> Result<Self>;
    fn safe_mul(self, rhs: Self) -> Result<Self>;
    fn safe_div(self, rhs: Self) -> Result<Self>;
    fn safe_shl(self, offset: u32) -> Result<Self>;
    fn safe_shr(self, offset: u32) -> Result<Self>;
}

macro_rules! impl_safe_math {
    ($($t:ty),*) => {
        $(
            impl SafeMath for $t {
                #[inline(always)]
                fn safe_add(self, rhs: Self) -> Result<Self> {
                    self.checked_add(rhs).ok_or(CurveError::MathOverflow.into())
                }

                #[inline(always)]
                fn safe_sub(self, rhs: Self) -> Result<Self> {
                    self.checked_sub(rhs).ok_or(CurveError::Underflow.into())
                }

                #[inline(always)]
                fn safe_mul(self, rhs: Self) -> Result<Self> {
                    self.checked_mul(rhs).ok_or(CurveError::MathOverflow.into())
                }

                #[inline(always)]
                fn safe_div(self, rhs: Self) -> Result<Self> {
                    self.checked_div(rhs).ok_or(CurveError::DivisionByZero.into())
                }

                #[inline(always)]
                fn safe_shl(self, offset: u32) -> Result<Self> {
                    self.checked_shl(offset).ok_or(CurveError::MathOverflow.into())
                }

                #[inline(always)]
                fn safe_shr(self, offset: u32) -> Result<Self> {
                    self.checked_shr(offset).ok_or(CurveError::MathOverflow.into())
                }
            }
        )*
    };
}

impl_safe_math!(u8, u16, u32, u64, u128, U256);
