use crate::error::CurveError;
use crate::math::decimal_math::{decimal_floor_to_u128, decimal_sqrt, q64_decimal};
use anchor_lang::prelude::*;
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};

/// `10^(quote_decimal - base_decimal)`, the factor turning a UI price into a raw unit price.
fn decimal_adjustment(base_decimal: u8, quote_decimal: u8) -> BigDecimal {
    BigDecimal::new(
        BigInt::one(),
        i64::from(base_decimal) - i64::from(quote_decimal),
    )
}

/// Converts a UI price (quote per base token) into a Q64.64 sqrt price over raw units.
/// # Arguments
/// * `price` - Quote tokens paid for one whole base token.
/// * `base_decimal` / `quote_decimal` - Mint decimals of each side.
/// # Returns
/// * `Result<u128>` - `floor(sqrt(price * 10^(quote_decimal - base_decimal)) * 2^64)`
pub fn get_sqrt_price_from_price(
    price: &BigDecimal,
    base_decimal: u8,
    quote_decimal: u8,
) -> Result<u128> {
    require!(!price.is_negative(), CurveError::InvalidDecimalInput);
    let raw_price = price * decimal_adjustment(base_decimal, quote_decimal);
    let sqrt_price = decimal_sqrt(&raw_price)? * q64_decimal();
    decimal_floor_to_u128(&sqrt_price)
}

/// Sqrt price at which `total_supply` whole base tokens are worth `market_cap` quote tokens.
pub fn get_sqrt_price_from_market_cap(
    market_cap: &BigDecimal,
    total_supply: u64,
    base_decimal: u8,
    quote_decimal: u8,
) -> Result<u128> {
    require!(total_supply > 0, CurveError::DivisionByZero);
    let price = market_cap / BigDecimal::from(total_supply);
    get_sqrt_price_from_price(&price, base_decimal, quote_decimal)
}

/// Inverse of [`get_sqrt_price_from_price`].
pub fn get_price_from_sqrt_price(
    sqrt_price: u128,
    base_decimal: u8,
    quote_decimal: u8,
) -> BigDecimal {
    if sqrt_price == 0 {
        return BigDecimal::zero();
    }
    let ratio = BigDecimal::from(BigInt::from(sqrt_price)) / q64_decimal();
    let raw_price = &ratio * &ratio;
    raw_price / decimal_adjustment(base_decimal, quote_decimal)
}
