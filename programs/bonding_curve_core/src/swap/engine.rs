use crate::error::CurveError;
use crate::fees::{get_included_fee_amount, BaseFeeHandler, FeeMode, FeeOnAmountResult};
use crate::math::liquidity_math::{
    get_delta_amount_base_unsigned, get_delta_amount_base_unsigned_256,
    get_delta_amount_quote_unsigned, get_delta_amount_quote_unsigned_256,
    get_next_sqrt_price_from_input, get_next_sqrt_price_from_output,
};
use crate::math::core_arithmetic::Rounding;
use crate::state::{PoolConfig, TradeDirection, VirtualPool};
use crate::utils::safe_math::SafeMath;
use anchor_lang::prelude::*;
use ethnum::U256;
use tracing::trace;

/// Per trade inputs that are not part of the pool snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapContext {
    pub fee_mode: FeeMode,
    pub trade_direction: TradeDirection,
    pub current_point: u64,
    /// Set by the caller for the trade bundled with pool creation.
    pub is_first_swap: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SwapResult {
    pub actual_input_amount: u64,
    pub output_amount: u64,
    pub next_sqrt_price: u128,
    pub trading_fee: u64,
    pub protocol_fee: u64,
    pub referral_fee: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SwapResult2 {
    pub included_fee_input_amount: u64,
    pub excluded_fee_input_amount: u64,
    pub amount_left: u64,
    pub output_amount: u64,
    pub next_sqrt_price: u128,
    pub trading_fee: u64,
    pub protocol_fee: u64,
    pub referral_fee: u64,
}

impl SwapResult2 {
    pub fn total_fee(&self) -> Result<u64> {
        self.trading_fee
            .safe_add(self.protocol_fee)?
            .safe_add(self.referral_fee)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SwapAmountFromInput {
    pub output_amount: u64,
    pub next_sqrt_price: u128,
    pub amount_left: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SwapAmountFromOutput {
    pub input_amount: u64,
    pub next_sqrt_price: u128,
}

impl VirtualPool {
    fn get_fee_numerator_from_included_fee_amount(
        &self,
        config: &PoolConfig,
        context: &SwapContext,
        included_fee_amount: u64,
    ) -> Result<u64> {
        if config.enable_first_swap_with_min_fee && context.is_first_swap {
            return config.pool_fees.base_fee.get_min_base_fee_numerator();
        }
        config.pool_fees.get_total_fee_numerator_from_included_fee_amount(
            &self.volatility_tracker,
            context.current_point,
            self.activation_point,
            included_fee_amount,
            context.trade_direction,
        )
    }

    fn get_fee_numerator_from_excluded_fee_amount(
        &self,
        config: &PoolConfig,
        context: &SwapContext,
        excluded_fee_amount: u64,
    ) -> Result<u64> {
        if config.enable_first_swap_with_min_fee && context.is_first_swap {
            return config.pool_fees.base_fee.get_min_base_fee_numerator();
        }
        config.pool_fees.get_total_fee_numerator_from_excluded_fee_amount(
            &self.volatility_tracker,
            context.current_point,
            self.activation_point,
            excluded_fee_amount,
            context.trade_direction,
        )
    }

    /// Exact input swap, legacy result shape. Fails when the curve cannot absorb the
    /// whole input.
    pub fn get_swap_result(
        &self,
        config: &PoolConfig,
        amount_in: u64,
        context: &SwapContext,
    ) -> Result<SwapResult> {
        let result = self.get_swap_result_from_exact_input(config, amount_in, context)?;
        Ok(SwapResult {
            actual_input_amount: result.excluded_fee_input_amount,
            output_amount: result.output_amount,
            next_sqrt_price: result.next_sqrt_price,
            trading_fee: result.trading_fee,
            protocol_fee: result.protocol_fee,
            referral_fee: result.referral_fee,
        })
    }

    pub fn get_swap_result_from_exact_input(
        &self,
        config: &PoolConfig,
        amount_in: u64,
        context: &SwapContext,
    ) -> Result<SwapResult2> {
        let fee_mode = &context.fee_mode;
        let trade_fee_numerator =
            self.get_fee_numerator_from_included_fee_amount(config, context, amount_in)?;

        let mut fees = FeeOnAmountResult::default();
        let excluded_fee_input_amount = if fee_mode.fees_on_input {
            fees = config.pool_fees.get_fee_on_amount(
                trade_fee_numerator,
                amount_in,
                fee_mode.has_referral,
            )?;
            fees.amount
        } else {
            amount_in
        };

        let swap_amount = match context.trade_direction {
            TradeDirection::BaseToQuote => {
                self.get_swap_amount_from_base_to_quote(config, excluded_fee_input_amount)?
            }
            TradeDirection::QuoteToBase => self.get_swap_amount_from_quote_to_base(
                config,
                excluded_fee_input_amount,
                u128::MAX,
            )?,
        };
        require!(
            swap_amount.amount_left == 0,
            CurveError::InsufficientLiquidity
        );

        let output_amount = if fee_mode.fees_on_input {
            swap_amount.output_amount
        } else {
            fees = config.pool_fees.get_fee_on_amount(
                trade_fee_numerator,
                swap_amount.output_amount,
                fee_mode.has_referral,
            )?;
            fees.amount
        };

        Ok(SwapResult2 {
            included_fee_input_amount: amount_in,
            excluded_fee_input_amount,
            amount_left: 0,
            output_amount,
            next_sqrt_price: swap_amount.next_sqrt_price,
            trading_fee: fees.trading_fee,
            protocol_fee: fees.protocol_fee,
            referral_fee: fees.referral_fee,
        })
    }

    /// Like exact input, but a quote to base trade stops at the migration price and
    /// hands back whatever input it could not use. Fees are charged on the consumed
    /// part only.
    pub fn get_swap_result_from_partial_input(
        &self,
        config: &PoolConfig,
        amount_in: u64,
        context: &SwapContext,
    ) -> Result<SwapResult2> {
        let fee_mode = &context.fee_mode;
        let trade_fee_numerator =
            self.get_fee_numerator_from_included_fee_amount(config, context, amount_in)?;

        let mut fees = FeeOnAmountResult::default();
        let mut excluded_fee_input_amount = if fee_mode.fees_on_input {
            fees = config.pool_fees.get_fee_on_amount(
                trade_fee_numerator,
                amount_in,
                fee_mode.has_referral,
            )?;
            fees.amount
        } else {
            amount_in
        };

        let swap_amount = match context.trade_direction {
            TradeDirection::BaseToQuote => {
                self.get_swap_amount_from_base_to_quote(config, excluded_fee_input_amount)?
            }
            TradeDirection::QuoteToBase => self.get_swap_amount_from_quote_to_base(
                config,
                excluded_fee_input_amount,
                config.migration_sqrt_price,
            )?,
        };

        let mut included_fee_input_amount = amount_in;
        if swap_amount.amount_left > 0 {
            let consumed = excluded_fee_input_amount.safe_sub(swap_amount.amount_left)?;
            excluded_fee_input_amount = consumed;
            included_fee_input_amount = if fee_mode.fees_on_input {
                let fee_numerator =
                    self.get_fee_numerator_from_excluded_fee_amount(config, context, consumed)?;
                let (included, _) = get_included_fee_amount(fee_numerator, consumed)?;
                let included = included.min(amount_in);
                let (trading_fee, protocol_fee, referral_fee) = config
                    .pool_fees
                    .split_fees(included.safe_sub(consumed)?, fee_mode.has_referral)?;
                fees = FeeOnAmountResult {
                    amount: consumed,
                    trading_fee,
                    protocol_fee,
                    referral_fee,
                };
                included
            } else {
                consumed
            };
            trace!(
                amount_in,
                consumed,
                included_fee_input_amount,
                "partial fill stopped at curve boundary"
            );
        }

        let output_amount = if fee_mode.fees_on_input {
            swap_amount.output_amount
        } else {
            fees = config.pool_fees.get_fee_on_amount(
                trade_fee_numerator,
                swap_amount.output_amount,
                fee_mode.has_referral,
            )?;
            fees.amount
        };

        Ok(SwapResult2 {
            included_fee_input_amount,
            excluded_fee_input_amount,
            amount_left: amount_in.safe_sub(included_fee_input_amount)?,
            output_amount,
            next_sqrt_price: swap_amount.next_sqrt_price,
            trading_fee: fees.trading_fee,
            protocol_fee: fees.protocol_fee,
            referral_fee: fees.referral_fee,
        })
    }

    /// Input needed for the trader to receive exactly `amount_out`.
    pub fn get_swap_result_from_exact_output(
        &self,
        config: &PoolConfig,
        amount_out: u64,
        context: &SwapContext,
    ) -> Result<SwapResult2> {
        let fee_mode = &context.fee_mode;
        let mut fees = FeeOnAmountResult::default();

        let included_fee_output_amount = if fee_mode.fees_on_input {
            amount_out
        } else {
            let fee_numerator =
                self.get_fee_numerator_from_excluded_fee_amount(config, context, amount_out)?;
            let (included, trading_fee) = get_included_fee_amount(fee_numerator, amount_out)?;
            let (trading_fee, protocol_fee, referral_fee) = config
                .pool_fees
                .split_fees(trading_fee, fee_mode.has_referral)?;
            fees = FeeOnAmountResult {
                amount: amount_out,
                trading_fee,
                protocol_fee,
                referral_fee,
            };
            included
        };

        let swap_amount = match context.trade_direction {
            TradeDirection::BaseToQuote => {
                self.get_input_amount_from_base_to_quote(config, included_fee_output_amount)?
            }
            TradeDirection::QuoteToBase => {
                self.get_input_amount_from_quote_to_base(config, included_fee_output_amount)?
            }
        };

        let excluded_fee_input_amount = swap_amount.input_amount;
        let included_fee_input_amount = if fee_mode.fees_on_input {
            let fee_numerator = self.get_fee_numerator_from_excluded_fee_amount(
                config,
                context,
                excluded_fee_input_amount,
            )?;
            let (included, trading_fee) =
                get_included_fee_amount(fee_numerator, excluded_fee_input_amount)?;
            let (trading_fee, protocol_fee, referral_fee) = config
                .pool_fees
                .split_fees(trading_fee, fee_mode.has_referral)?;
            fees = FeeOnAmountResult {
                amount: excluded_fee_input_amount,
                trading_fee,
                protocol_fee,
                referral_fee,
            };
            included
        } else {
            excluded_fee_input_amount
        };

        Ok(SwapResult2 {
            included_fee_input_amount,
            excluded_fee_input_amount,
            amount_left: 0,
            output_amount: amount_out,
            next_sqrt_price: swap_amount.next_sqrt_price,
            trading_fee: fees.trading_fee,
            protocol_fee: fees.protocol_fee,
            referral_fee: fees.referral_fee,
        })
    }

    fn check_sqrt_price_on_curve(&self, config: &PoolConfig) -> Result<()> {
        let last_sqrt_price = config
            .curve
            .last()
            .map(|segment| segment.sqrt_price)
            .ok_or(CurveError::InvalidCurve)?;
        require!(
            self.sqrt_price >= config.sqrt_start_price && self.sqrt_price <= last_sqrt_price,
            CurveError::InvalidState
        );
        Ok(())
    }

    /// Sells base down the curve, highest segment first. Stops at the start price with
    /// the unused input in `amount_left`.
    pub fn get_swap_amount_from_base_to_quote(
        &self,
        config: &PoolConfig,
        amount_in: u64,
    ) -> Result<SwapAmountFromInput> {
        self.check_sqrt_price_on_curve(config)?;
        let mut total_output_amount = 0u64;
        let mut current_sqrt_price = self.sqrt_price;
        let mut amount_left = amount_in;

        for i in (0..config.curve.len()).rev() {
            if amount_left == 0 {
                break;
            }
            let liquidity = config.curve[i].liquidity;
            let lower_sqrt_price = config.segment_lower_sqrt_price(i);
            if liquidity == 0 || lower_sqrt_price >= current_sqrt_price {
                continue;
            }

            let max_amount_in = get_delta_amount_base_unsigned_256(
                lower_sqrt_price,
                current_sqrt_price,
                liquidity,
                Rounding::Up,
            )?;
            if U256::from(amount_left) < max_amount_in {
                let next_sqrt_price =
                    get_next_sqrt_price_from_input(current_sqrt_price, liquidity, amount_left, true)?;
                let output_amount = get_delta_amount_quote_unsigned(
                    next_sqrt_price,
                    current_sqrt_price,
                    liquidity,
                    Rounding::Down,
                )?;
                total_output_amount = total_output_amount.safe_add(output_amount)?;
                current_sqrt_price = next_sqrt_price;
                amount_left = 0;
            } else {
                let output_amount = get_delta_amount_quote_unsigned(
                    lower_sqrt_price,
                    current_sqrt_price,
                    liquidity,
                    Rounding::Down,
                )?;
                total_output_amount = total_output_amount.safe_add(output_amount)?;
                current_sqrt_price = lower_sqrt_price;
                amount_left = amount_left.safe_sub(max_amount_in.as_u64())?;
            }
            trace!(segment = i, current_sqrt_price, amount_left, "base to quote step");
        }

        Ok(SwapAmountFromInput {
            output_amount: total_output_amount,
            next_sqrt_price: current_sqrt_price,
            amount_left,
        })
    }

    /// Buys base up the curve, lowest segment first, never past `stop_sqrt_price`.
    pub fn get_swap_amount_from_quote_to_base(
        &self,
        config: &PoolConfig,
        amount_in: u64,
        stop_sqrt_price: u128,
    ) -> Result<SwapAmountFromInput> {
        self.check_sqrt_price_on_curve(config)?;
        let mut total_output_amount = 0u64;
        let mut current_sqrt_price = self.sqrt_price;
        let mut amount_left = amount_in;

        for (i, segment) in config.curve.iter().enumerate() {
            if amount_left == 0 || current_sqrt_price >= stop_sqrt_price {
                break;
            }
            let upper_sqrt_price = segment.sqrt_price.min(stop_sqrt_price);
            if segment.liquidity == 0 || upper_sqrt_price <= current_sqrt_price {
                continue;
            }

            let max_amount_in = get_delta_amount_quote_unsigned_256(
                current_sqrt_price,
                upper_sqrt_price,
                segment.liquidity,
                Rounding::Up,
            )?;
            if U256::from(amount_left) < max_amount_in {
                let next_sqrt_price = get_next_sqrt_price_from_input(
                    current_sqrt_price,
                    segment.liquidity,
                    amount_left,
                    false,
                )?;
                let output_amount = get_delta_amount_base_unsigned(
                    current_sqrt_price,
                    next_sqrt_price,
                    segment.liquidity,
                    Rounding::Down,
                )?;
                total_output_amount = total_output_amount.safe_add(output_amount)?;
                current_sqrt_price = next_sqrt_price;
                amount_left = 0;
            } else {
                let output_amount = get_delta_amount_base_unsigned(
                    current_sqrt_price,
                    upper_sqrt_price,
                    segment.liquidity,
                    Rounding::Down,
                )?;
                total_output_amount = total_output_amount.safe_add(output_amount)?;
                current_sqrt_price = upper_sqrt_price;
                amount_left = amount_left.safe_sub(max_amount_in.as_u64())?;
            }
            trace!(segment = i, current_sqrt_price, amount_left, "quote to base step");
        }

        Ok(SwapAmountFromInput {
            output_amount: total_output_amount,
            next_sqrt_price: current_sqrt_price,
            amount_left,
        })
    }

    /// Base needed to take `amount_out` quote out of the curve.
    pub fn get_input_amount_from_base_to_quote(
        &self,
        config: &PoolConfig,
        amount_out: u64,
    ) -> Result<SwapAmountFromOutput> {
        self.check_sqrt_price_on_curve(config)?;
        let mut total_input_amount = 0u64;
        let mut current_sqrt_price = self.sqrt_price;
        let mut amount_left = amount_out;

        for i in (0..config.curve.len()).rev() {
            if amount_left == 0 {
                break;
            }
            let liquidity = config.curve[i].liquidity;
            let lower_sqrt_price = config.segment_lower_sqrt_price(i);
            if liquidity == 0 || lower_sqrt_price >= current_sqrt_price {
                continue;
            }

            let max_amount_out = get_delta_amount_quote_unsigned_256(
                lower_sqrt_price,
                current_sqrt_price,
                liquidity,
                Rounding::Down,
            )?;
            if U256::from(amount_left) < max_amount_out {
                let next_sqrt_price =
                    get_next_sqrt_price_from_output(current_sqrt_price, liquidity, amount_left, true)?;
                let input_amount = get_delta_amount_base_unsigned(
                    next_sqrt_price,
                    current_sqrt_price,
                    liquidity,
                    Rounding::Up,
                )?;
                total_input_amount = total_input_amount.safe_add(input_amount)?;
                current_sqrt_price = next_sqrt_price;
                amount_left = 0;
            } else {
                let input_amount = get_delta_amount_base_unsigned(
                    lower_sqrt_price,
                    current_sqrt_price,
                    liquidity,
                    Rounding::Up,
                )?;
                total_input_amount = total_input_amount.safe_add(input_amount)?;
                current_sqrt_price = lower_sqrt_price;
                amount_left = amount_left.safe_sub(max_amount_out.as_u64())?;
            }
            trace!(segment = i, current_sqrt_price, amount_left, "base to quote exact out step");
        }
        require!(amount_left == 0, CurveError::InsufficientLiquidity);

        Ok(SwapAmountFromOutput {
            input_amount: total_input_amount,
            next_sqrt_price: current_sqrt_price,
        })
    }

    /// Quote needed to take `amount_out` base out of the curve. The trade may not push
    /// the price past the migration price.
    pub fn get_input_amount_from_quote_to_base(
        &self,
        config: &PoolConfig,
        amount_out: u64,
    ) -> Result<SwapAmountFromOutput> {
        self.check_sqrt_price_on_curve(config)?;
        let mut total_input_amount = 0u64;
        let mut current_sqrt_price = self.sqrt_price;
        let mut amount_left = amount_out;

        for (i, segment) in config.curve.iter().enumerate() {
            if amount_left == 0 {
                break;
            }
            if segment.liquidity == 0 || segment.sqrt_price <= current_sqrt_price {
                continue;
            }

            let max_amount_out = get_delta_amount_base_unsigned_256(
                current_sqrt_price,
                segment.sqrt_price,
                segment.liquidity,
                Rounding::Down,
            )?;
            if U256::from(amount_left) < max_amount_out {
                let next_sqrt_price = get_next_sqrt_price_from_output(
                    current_sqrt_price,
                    segment.liquidity,
                    amount_left,
                    false,
                )?;
                let input_amount = get_delta_amount_quote_unsigned(
                    current_sqrt_price,
                    next_sqrt_price,
                    segment.liquidity,
                    Rounding::Up,
                )?;
                total_input_amount = total_input_amount.safe_add(input_amount)?;
                current_sqrt_price = next_sqrt_price;
                amount_left = 0;
            } else {
                let input_amount = get_delta_amount_quote_unsigned(
                    current_sqrt_price,
                    segment.sqrt_price,
                    segment.liquidity,
                    Rounding::Up,
                )?;
                total_input_amount = total_input_amount.safe_add(input_amount)?;
                current_sqrt_price = segment.sqrt_price;
                amount_left = amount_left.safe_sub(max_amount_out.as_u64())?;
            }
            trace!(segment = i, current_sqrt_price, amount_left, "quote to base exact out step");
        }
        require!(amount_left == 0, CurveError::InsufficientLiquidity);
        require!(
            current_sqrt_price <= config.migration_sqrt_price,
            CurveError::InsufficientLiquidity
        );

        Ok(SwapAmountFromOutput {
            input_amount: total_input_amount,
            next_sqrt_price: current_sqrt_price,
        })
    }

    /// Moves the snapshot forward by an executed swap: price, reserves and the
    /// volatility tracker.
    pub fn apply_swap_result(
        &mut self,
        config: &PoolConfig,
        result: &SwapResult2,
        context: &SwapContext,
        current_timestamp: u64,
    ) -> Result<()> {
        let sqrt_price_before = self.sqrt_price;
        let output_fee = if context.fee_mode.fees_on_input {
            0
        } else {
            result.total_fee()?
        };
        let gross_output = result.output_amount.safe_add(output_fee)?;
        match context.trade_direction {
            TradeDirection::BaseToQuote => {
                self.base_reserve = self.base_reserve.safe_add(result.excluded_fee_input_amount)?;
                self.quote_reserve = self.quote_reserve.safe_sub(gross_output)?;
            }
            TradeDirection::QuoteToBase => {
                self.quote_reserve = self.quote_reserve.safe_add(result.excluded_fee_input_amount)?;
                self.base_reserve = self.base_reserve.safe_sub(gross_output)?;
            }
        }
        self.sqrt_price = result.next_sqrt_price;
        if let Some(dynamic_fee) = &config.pool_fees.dynamic_fee {
            self.volatility_tracker.record_swap(
                dynamic_fee,
                sqrt_price_before,
                result.next_sqrt_price,
                current_timestamp,
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fees::{BaseFeeParams, FeeScheduler, PoolFeesConfig};
    use crate::state::{ActivationType, CollectFeeMode, CurveSegment, MigrationOption};
    use crate::test_utils::assert_curve_error;
    use crate::utils::constants::ONE_Q64;

    const LIQUIDITY: u128 = 1_000_000_000u128 << 64;

    // One segment over [1, 2] in sqrt price: 1e9 quote or 5e8 base of capacity.
    fn config(cliff_fee_numerator: u64) -> PoolConfig {
        PoolConfig {
            pool_fees: PoolFeesConfig {
                base_fee: BaseFeeParams::FeeScheduler(FeeScheduler {
                    cliff_fee_numerator,
                    ..Default::default()
                }),
                dynamic_fee: None,
            },
            collect_fee_mode: CollectFeeMode::QuoteToken,
            activation_type: ActivationType::Slot,
            migration_option: MigrationOption::DammV2,
            migration_fee_percentage: 0,
            migration_quote_threshold: 1_000_000_000,
            migration_base_threshold: 0,
            migration_sqrt_price: 2 * ONE_Q64,
            sqrt_start_price: ONE_Q64,
            enable_first_swap_with_min_fee: false,
            curve: vec![CurveSegment {
                sqrt_price: 2 * ONE_Q64,
                liquidity: LIQUIDITY,
            }],
        }
    }

    fn pool(config: &PoolConfig) -> VirtualPool {
        VirtualPool::new(config, 500_000_000, 0)
    }

    fn context(config: &PoolConfig, trade_direction: TradeDirection) -> SwapContext {
        SwapContext {
            fee_mode: FeeMode::get_fee_mode(config.collect_fee_mode, trade_direction, false),
            trade_direction,
            current_point: 0,
            is_first_swap: false,
        }
    }

    #[test]
    fn test_exact_in_quote_to_base_charges_input() {
        let config = config(10_000_000);
        let pool = pool(&config);
        let result = pool
            .get_swap_result_from_exact_input(
                &config,
                100_000_000,
                &context(&config, TradeDirection::QuoteToBase),
            )
            .unwrap();
        assert_eq!(result.excluded_fee_input_amount, 99_000_000);
        assert_eq!(result.trading_fee, 800_000);
        assert_eq!(result.protocol_fee, 200_000);
        // 1e9 * 0.099 / 1.099
        assert!(result.output_amount.abs_diff(90_081_892) <= 1);
        assert!(result.next_sqrt_price > ONE_Q64 && result.next_sqrt_price < 2 * ONE_Q64);
    }

    #[test]
    fn test_exact_in_base_to_quote_charges_output() {
        let config = config(10_000_000);
        let mut pool = pool(&config);
        pool.sqrt_price = 2 * ONE_Q64;
        let result = pool
            .get_swap_result_from_exact_input(
                &config,
                500_000_000,
                &context(&config, TradeDirection::BaseToQuote),
            )
            .unwrap();
        assert_eq!(result.next_sqrt_price, ONE_Q64);
        assert_eq!(result.excluded_fee_input_amount, 500_000_000);
        assert_eq!(result.output_amount, 990_000_000);
        assert_eq!(result.total_fee().unwrap(), 10_000_000);
    }

    #[test]
    fn test_legacy_result_matches_v2() {
        let config = config(10_000_000);
        let pool = pool(&config);
        let context = context(&config, TradeDirection::QuoteToBase);
        let v1 = pool.get_swap_result(&config, 250_000_000, &context).unwrap();
        let v2 = pool
            .get_swap_result_from_exact_input(&config, 250_000_000, &context)
            .unwrap();
        assert_eq!(v1.actual_input_amount, v2.excluded_fee_input_amount);
        assert_eq!(v1.output_amount, v2.output_amount);
        assert_eq!(v1.next_sqrt_price, v2.next_sqrt_price);
    }

    #[test]
    fn test_exact_in_beyond_capacity() {
        let config = config(10_000_000);
        let pool = pool(&config);
        let context = context(&config, TradeDirection::QuoteToBase);
        assert_curve_error(
            pool.get_swap_result_from_exact_input(&config, 2_000_000_000, &context),
            CurveError::InsufficientLiquidity,
        );

        let result = pool
            .get_swap_result_from_partial_input(&config, 2_000_000_000, &context)
            .unwrap();
        assert_eq!(result.next_sqrt_price, 2 * ONE_Q64);
        assert_eq!(result.excluded_fee_input_amount, 1_000_000_000);
        // ceil(1e9 / 0.99)
        assert_eq!(result.included_fee_input_amount, 1_010_101_011);
        assert_eq!(result.amount_left, 989_898_989);
        assert_eq!(result.output_amount, 500_000_000);
        assert_eq!(result.total_fee().unwrap(), 10_101_011);
    }

    #[test]
    fn test_partial_fill_base_to_quote_stops_at_start_price() {
        let config = config(10_000_000);
        let mut pool = pool(&config);
        pool.sqrt_price = 2 * ONE_Q64;
        let context = context(&config, TradeDirection::BaseToQuote);
        assert_curve_error(
            pool.get_swap_result_from_exact_input(&config, 600_000_000, &context),
            CurveError::InsufficientLiquidity,
        );
        let result = pool
            .get_swap_result_from_partial_input(&config, 600_000_000, &context)
            .unwrap();
        assert_eq!(result.amount_left, 100_000_000);
        assert_eq!(result.next_sqrt_price, ONE_Q64);
        assert_eq!(result.output_amount, 990_000_000);
    }

    #[test]
    fn test_exact_out_covers_requested_output() {
        let config = config(10_000_000);
        let pool = pool(&config);
        let context = context(&config, TradeDirection::QuoteToBase);
        let exact_out = pool
            .get_swap_result_from_exact_output(&config, 100_000_000, &context)
            .unwrap();
        assert_eq!(exact_out.output_amount, 100_000_000);
        assert!(exact_out.included_fee_input_amount > exact_out.excluded_fee_input_amount);

        let exact_in = pool
            .get_swap_result_from_exact_input(
                &config,
                exact_out.included_fee_input_amount,
                &context,
            )
            .unwrap();
        assert!(exact_in.output_amount >= 100_000_000);
    }

    #[test]
    fn test_exact_out_past_migration_price() {
        let mut config = config(10_000_000);
        config.migration_sqrt_price = 3 * ONE_Q64 / 2;
        let pool = pool(&config);
        assert_curve_error(
            pool.get_swap_result_from_exact_output(
                &config,
                400_000_000,
                &context(&config, TradeDirection::QuoteToBase),
            ),
            CurveError::InsufficientLiquidity,
        );
        assert_curve_error(
            pool.get_swap_result_from_exact_output(
                &config,
                600_000_000,
                &context(&config, TradeDirection::QuoteToBase),
            ),
            CurveError::InsufficientLiquidity,
        );
    }

    #[test]
    fn test_exact_out_base_to_quote_grosses_up_output() {
        let config = config(10_000_000);
        let mut pool = pool(&config);
        pool.sqrt_price = 2 * ONE_Q64;
        let result = pool
            .get_swap_result_from_exact_output(
                &config,
                99_000_000,
                &context(&config, TradeDirection::BaseToQuote),
            )
            .unwrap();
        // 1e8 of quote leaves the curve, 1e6 of it is fee
        assert_eq!(result.total_fee().unwrap(), 1_000_000);
        assert_eq!(result.included_fee_input_amount, result.excluded_fee_input_amount);
        assert!(result.next_sqrt_price < 2 * ONE_Q64);
    }

    #[test]
    fn test_first_swap_uses_min_fee() {
        let mut config = config(0);
        config.pool_fees.base_fee = BaseFeeParams::FeeScheduler(FeeScheduler {
            cliff_fee_numerator: 500_000_000,
            number_of_period: 10,
            period_frequency: 10,
            reduction_factor: 49_000_000,
            ..Default::default()
        });
        config.enable_first_swap_with_min_fee = true;
        let pool = pool(&config);
        let mut context = context(&config, TradeDirection::QuoteToBase);

        let regular = pool
            .get_swap_result_from_exact_input(&config, 100_000_000, &context)
            .unwrap();
        assert_eq!(regular.total_fee().unwrap(), 50_000_000);

        context.is_first_swap = true;
        let first = pool
            .get_swap_result_from_exact_input(&config, 100_000_000, &context)
            .unwrap();
        assert_eq!(first.total_fee().unwrap(), 1_000_000);

        // the flag alone does nothing unless the config opts in
        config.enable_first_swap_with_min_fee = false;
        let ignored = pool
            .get_swap_result_from_exact_input(&config, 100_000_000, &context)
            .unwrap();
        assert_eq!(ignored.total_fee().unwrap(), 50_000_000);
    }

    #[test]
    fn test_price_outside_curve_is_rejected() {
        let config = config(10_000_000);
        let mut pool = pool(&config);
        pool.sqrt_price = ONE_Q64 - 1;
        assert_curve_error(
            pool.get_swap_result_from_exact_input(
                &config,
                1_000,
                &context(&config, TradeDirection::QuoteToBase),
            ),
            CurveError::InvalidState,
        );
    }

    #[test]
    fn test_apply_swap_result_moves_snapshot() {
        let config = config(10_000_000);
        let mut pool = pool(&config);
        let context = context(&config, TradeDirection::QuoteToBase);
        let result = pool
            .get_swap_result_from_exact_input(&config, 100_000_000, &context)
            .unwrap();
        pool.apply_swap_result(&config, &result, &context, 10).unwrap();
        assert_eq!(pool.sqrt_price, result.next_sqrt_price);
        assert_eq!(pool.quote_reserve, 99_000_000);
        assert_eq!(pool.base_reserve, 500_000_000 - result.output_amount);
    }
}
