use crate::error::CurveError;
use crate::fees::FeeMode;
use crate::math::core_arithmetic::{mul_div_u64, Rounding};
use crate::state::{PoolConfig, TradeDirection, VirtualPool};
use crate::swap::engine::{SwapContext, SwapResult, SwapResult2};
use crate::utils::constants::BASIS_POINT_MAX;
use anchor_lang::prelude::*;
use tracing::{debug, warn};

/// Caller side of a quote request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SwapQuoteParams {
    /// Input amount for exact-in and partial fill quotes, output amount for exact-out.
    pub amount: u64,
    pub swap_base_for_quote: bool,
    pub slippage_bps: u16,
    pub has_referral: bool,
    pub current_point: u64,
    pub is_first_swap: bool,
}

impl SwapQuoteParams {
    fn trade_direction(&self) -> TradeDirection {
        if self.swap_base_for_quote {
            TradeDirection::BaseToQuote
        } else {
            TradeDirection::QuoteToBase
        }
    }

    fn context(&self, config: &PoolConfig) -> SwapContext {
        let trade_direction = self.trade_direction();
        SwapContext {
            fee_mode: FeeMode::get_fee_mode(
                config.collect_fee_mode,
                trade_direction,
                self.has_referral,
            ),
            trade_direction,
            current_point: self.current_point,
            is_first_swap: self.is_first_swap,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapQuoteResult {
    pub swap_result: SwapResult,
    pub minimum_amount_out: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapQuote2Result {
    pub swap_result: SwapResult2,
    pub minimum_amount_out: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapQuoteExactOutResult {
    pub swap_result: SwapResult2,
    pub maximum_amount_in: u64,
}

/// `amount * (10_000 - slippage_bps) / 10_000`, rounded down.
pub fn get_minimum_amount_out(amount: u64, slippage_bps: u16) -> Result<u64> {
    require!(
        u64::from(slippage_bps) <= BASIS_POINT_MAX,
        CurveError::InvalidSlippage
    );
    mul_div_u64(
        amount,
        BASIS_POINT_MAX - u64::from(slippage_bps),
        BASIS_POINT_MAX,
        Rounding::Down,
    )
}

/// `amount * (10_000 + slippage_bps) / 10_000`, rounded up.
pub fn get_maximum_amount_in(amount: u64, slippage_bps: u16) -> Result<u64> {
    require!(
        u64::from(slippage_bps) <= BASIS_POINT_MAX,
        CurveError::InvalidSlippage
    );
    mul_div_u64(
        amount,
        BASIS_POINT_MAX + u64::from(slippage_bps),
        BASIS_POINT_MAX,
        Rounding::Up,
    )
}

fn check_quote_request(pool: &VirtualPool, config: &PoolConfig, params: &SwapQuoteParams) -> Result<()> {
    if pool.is_curve_complete(config.migration_quote_threshold) {
        warn!(
            quote_reserve = pool.quote_reserve,
            migration_quote_threshold = config.migration_quote_threshold,
            "quote requested on a completed pool"
        );
        return err!(CurveError::PoolCompleted);
    }
    require!(params.amount > 0, CurveError::AmountIsZero);
    Ok(())
}

pub fn swap_quote(
    pool: &VirtualPool,
    config: &PoolConfig,
    params: &SwapQuoteParams,
) -> Result<SwapQuoteResult> {
    check_quote_request(pool, config, params)?;
    let swap_result = pool.get_swap_result(config, params.amount, &params.context(config))?;
    let minimum_amount_out = get_minimum_amount_out(swap_result.output_amount, params.slippage_bps)?;
    debug!(
        amount_in = params.amount,
        output_amount = swap_result.output_amount,
        minimum_amount_out,
        "swap quote"
    );
    Ok(SwapQuoteResult {
        swap_result,
        minimum_amount_out,
    })
}

pub fn swap_quote_exact_in(
    pool: &VirtualPool,
    config: &PoolConfig,
    params: &SwapQuoteParams,
) -> Result<SwapQuote2Result> {
    check_quote_request(pool, config, params)?;
    let swap_result =
        pool.get_swap_result_from_exact_input(config, params.amount, &params.context(config))?;
    let minimum_amount_out = get_minimum_amount_out(swap_result.output_amount, params.slippage_bps)?;
    Ok(SwapQuote2Result {
        swap_result,
        minimum_amount_out,
    })
}

pub fn swap_quote_partial_fill(
    pool: &VirtualPool,
    config: &PoolConfig,
    params: &SwapQuoteParams,
) -> Result<SwapQuote2Result> {
    check_quote_request(pool, config, params)?;
    let swap_result =
        pool.get_swap_result_from_partial_input(config, params.amount, &params.context(config))?;
    let minimum_amount_out = get_minimum_amount_out(swap_result.output_amount, params.slippage_bps)?;
    Ok(SwapQuote2Result {
        swap_result,
        minimum_amount_out,
    })
}

pub fn swap_quote_exact_out(
    pool: &VirtualPool,
    config: &PoolConfig,
    params: &SwapQuoteParams,
) -> Result<SwapQuoteExactOutResult> {
    check_quote_request(pool, config, params)?;
    let swap_result =
        pool.get_swap_result_from_exact_output(config, params.amount, &params.context(config))?;
    let maximum_amount_in =
        get_maximum_amount_in(swap_result.included_fee_input_amount, params.slippage_bps)?;
    Ok(SwapQuoteExactOutResult {
        swap_result,
        maximum_amount_in,
    })
}
