use crate::fees::base_fee::{BaseFeeHandler, BaseFeeParams};
use crate::fees::dynamic_fee::{DynamicFeeParams, VolatilityTracker};
use crate::math::core_arithmetic::{mul_div_u64, Rounding};
use crate::state::{CollectFeeMode, TradeDirection};
use crate::utils::constants::*;
use crate::utils::safe_math::SafeMath;
use anchor_lang::prelude::*;

/// Which side of a trade the fee is taken from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeeMode {
    pub fees_on_input: bool,
    pub fees_on_base_token: bool,
    pub has_referral: bool,
}

impl FeeMode {
    /// `QuoteToken` always charges the quote leg; `OutputToken` charges whatever leaves
    /// the pool.
    pub fn get_fee_mode(
        collect_fee_mode: CollectFeeMode,
        trade_direction: TradeDirection,
        has_referral: bool,
    ) -> FeeMode {
        let (fees_on_input, fees_on_base_token) = match (collect_fee_mode, trade_direction) {
            (CollectFeeMode::QuoteToken, TradeDirection::BaseToQuote) => (false, false),
            (CollectFeeMode::QuoteToken, TradeDirection::QuoteToBase) => (true, false),
            (CollectFeeMode::OutputToken, TradeDirection::BaseToQuote) => (false, false),
            (CollectFeeMode::OutputToken, TradeDirection::QuoteToBase) => (false, true),
        };
        FeeMode {
            fees_on_input,
            fees_on_base_token,
            has_referral,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeeOnAmountResult {
    /// Amount left after the trading fee.
    pub amount: u64,
    pub trading_fee: u64,
    pub protocol_fee: u64,
    pub referral_fee: u64,
}

/// Splits a fee-included amount: returns `(excluded_fee_amount, trading_fee)` with the
/// fee rounded up.
pub fn get_excluded_fee_amount(trade_fee_numerator: u64, included_fee_amount: u64) -> Result<(u64, u64)> {
    let trading_fee = mul_div_u64(
        included_fee_amount,
        trade_fee_numerator,
        FEE_DENOMINATOR,
        Rounding::Up,
    )?;
    let excluded_fee_amount = included_fee_amount.safe_sub(trading_fee)?;
    Ok((excluded_fee_amount, trading_fee))
}

/// Grosses a net amount up: returns `(included_fee_amount, trading_fee)`.
pub fn get_included_fee_amount(trade_fee_numerator: u64, excluded_fee_amount: u64) -> Result<(u64, u64)> {
    let denominator = FEE_DENOMINATOR.safe_sub(trade_fee_numerator)?;
    let included_fee_amount = mul_div_u64(
        excluded_fee_amount,
        FEE_DENOMINATOR,
        denominator,
        Rounding::Up,
    )?;
    let trading_fee = included_fee_amount.safe_sub(excluded_fee_amount)?;
    Ok((included_fee_amount, trading_fee))
}

/// Fee configuration of a pool: one base fee strategy plus an optional dynamic fee.
#[derive(Clone, Debug, Default, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct PoolFeesConfig {
    pub base_fee: BaseFeeParams,
    pub dynamic_fee: Option<DynamicFeeParams>,
}

impl PoolFeesConfig {
    pub fn get_variable_fee(&self, volatility_tracker: &VolatilityTracker) -> Result<u128> {
        match &self.dynamic_fee {
            Some(dynamic_fee) => {
                dynamic_fee.get_variable_fee(volatility_tracker.volatility_accumulator)
            }
            None => Ok(0),
        }
    }

    /// `min(base + variable, MAX_FEE_NUMERATOR)`
    pub fn get_total_fee_numerator(
        &self,
        base_fee_numerator: u64,
        volatility_tracker: &VolatilityTracker,
    ) -> Result<u64> {
        let total_fee_numerator = self
            .get_variable_fee(volatility_tracker)?
            .safe_add(base_fee_numerator.into())?;
        Ok(total_fee_numerator.min(MAX_FEE_NUMERATOR.into()) as u64)
    }

    pub fn get_total_fee_numerator_from_included_fee_amount(
        &self,
        volatility_tracker: &VolatilityTracker,
        current_point: u64,
        activation_point: u64,
        included_fee_amount: u64,
        trade_direction: TradeDirection,
    ) -> Result<u64> {
        let base_fee_numerator = self.base_fee.get_base_fee_numerator_from_included_fee_amount(
            current_point,
            activation_point,
            trade_direction,
            included_fee_amount,
        )?;
        self.get_total_fee_numerator(base_fee_numerator, volatility_tracker)
    }

    pub fn get_total_fee_numerator_from_excluded_fee_amount(
        &self,
        volatility_tracker: &VolatilityTracker,
        current_point: u64,
        activation_point: u64,
        excluded_fee_amount: u64,
        trade_direction: TradeDirection,
    ) -> Result<u64> {
        let base_fee_numerator = self.base_fee.get_base_fee_numerator_from_excluded_fee_amount(
            current_point,
            activation_point,
            trade_direction,
            excluded_fee_amount,
        )?;
        self.get_total_fee_numerator(base_fee_numerator, volatility_tracker)
    }

    /// Takes the trading fee out of `amount` and splits it between protocol, referral
    /// and the pool.
    pub fn get_fee_on_amount(
        &self,
        trade_fee_numerator: u64,
        amount: u64,
        has_referral: bool,
    ) -> Result<FeeOnAmountResult> {
        let (amount, trading_fee) = get_excluded_fee_amount(trade_fee_numerator, amount)?;
        let (trading_fee, protocol_fee, referral_fee) =
            self.split_fees(trading_fee, has_referral)?;
        Ok(FeeOnAmountResult {
            amount,
            trading_fee,
            protocol_fee,
            referral_fee,
        })
    }

    /// Returns `(trading_fee, protocol_fee, referral_fee)`. The referral share is cut
    /// from the protocol share.
    pub fn split_fees(&self, fee_amount: u64, has_referral: bool) -> Result<(u64, u64, u64)> {
        let protocol_fee = mul_div_u64(
            fee_amount,
            PROTOCOL_FEE_PERCENT.into(),
            100,
            Rounding::Down,
        )?;
        let trading_fee = fee_amount.safe_sub(protocol_fee)?;
        let referral_fee = if has_referral {
            mul_div_u64(protocol_fee, HOST_FEE_PERCENT.into(), 100, Rounding::Down)?
        } else {
            0
        };
        let protocol_fee = protocol_fee.safe_sub(referral_fee)?;
        Ok((trading_fee, protocol_fee, referral_fee))
    }
}
