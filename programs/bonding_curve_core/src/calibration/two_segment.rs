//! Two segment curves meeting at a mid price.
//!
//! Given the start price `p0`, a mid price `pm` and the migration price `p2`, the two
//! liquidities solve
//!
//! ```text
//! l0 * (pm - p0) / (p0 * pm) + l1 * (p2 - pm) / (pm * p2) = swap_amount
//! l0 * (pm - p0) / 2^128     + l1 * (p2 - pm) / 2^128     = migration_quote_threshold
//! ```

use crate::calibration::params::{
    BuildCurveWithMidPriceParams, BuildCurveWithTwoSegmentsParams, CommonCurveParams,
};
use crate::calibration::supply::{
    fit_curve_to_supply, get_migration_base_token,
    get_migration_quote_threshold_from_migration_quote_amount, CurveBody,
};
use crate::error::CurveError;
use crate::math::decimal_math::{
    bigint_to_u128, decimal_floor, decimal_floor_to_u128, decimal_from_f64, decimal_from_u128,
    decimal_nth_root, decimal_sqrt,
};
use crate::math::price_math::{get_sqrt_price_from_market_cap, get_sqrt_price_from_price};
use crate::state::{ConfigParameters, CurveSegment};
use anchor_lang::prelude::*;
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::Zero;
use tracing::{debug, warn};

/// Market cap endpoints shared by both two segment builders.
struct TwoSegmentTargets {
    sqrt_start_price: u128,
    sqrt_migration_price: u128,
    migration_quote_threshold: u64,
    swap_amount: u64,
}

/// Segment liquidities `(l0, l1)` for the given mid price, or `None` when the system is
/// singular or either liquidity is not positive.
pub fn solve_two_segment_liquidity(
    sqrt_start_price: u128,
    sqrt_mid_price: u128,
    sqrt_migration_price: u128,
    swap_amount: u64,
    migration_quote_threshold: u64,
) -> Result<Option<(u128, u128)>> {
    if sqrt_mid_price <= sqrt_start_price || sqrt_mid_price >= sqrt_migration_price {
        return Ok(None);
    }
    let p0 = decimal_from_u128(sqrt_start_price);
    let pm = decimal_from_u128(sqrt_mid_price);
    let p2 = decimal_from_u128(sqrt_migration_price);
    let q128 = BigDecimal::from(BigInt::from(1u8) << 128u32);

    let a = (&pm - &p0) / (&p0 * &pm);
    let b = (&p2 - &pm) / (&pm * &p2);
    let c = (&pm - &p0) / &q128;
    let e = (&p2 - &pm) / &q128;
    let determinant = &a * &e - &b * &c;
    if determinant.is_zero() {
        return Ok(None);
    }

    let swap_amount = BigDecimal::from(swap_amount);
    let threshold = BigDecimal::from(migration_quote_threshold);
    let l0 = (&swap_amount * &e - &b * &threshold) / &determinant;
    let l1 = (&a * &threshold - &c * &swap_amount) / &determinant;
    if l0 <= BigDecimal::zero() || l1 <= BigDecimal::zero() {
        return Ok(None);
    }

    let l0 = decimal_floor_to_u128(&l0)?;
    let l1 = decimal_floor_to_u128(&l1)?;
    if l0 == 0 || l1 == 0 {
        return Ok(None);
    }
    Ok(Some((l0, l1)))
}

/// Mid price candidates in the order they are tried: the geometric mean of the two
/// endpoints, then the points a quarter of the way from either end in log space.
pub fn get_mid_price_candidates(
    sqrt_start_price: u128,
    sqrt_migration_price: u128,
) -> Result<[u128; 3]> {
    let p0 = decimal_from_u128(sqrt_start_price);
    let p2 = decimal_from_u128(sqrt_migration_price);
    let geometric = decimal_sqrt(&(&p0 * &p2))?;
    let upper_quarter = decimal_nth_root(&(&p0 * &p2 * &p2 * &p2), 4)?;
    let lower_quarter = decimal_nth_root(&(&p0 * &p0 * &p0 * &p2), 4)?;
    Ok([
        decimal_floor_to_u128(&geometric)?,
        decimal_floor_to_u128(&upper_quarter)?,
        decimal_floor_to_u128(&lower_quarter)?,
    ])
}

/// Builds a curve from `initial_market_cap` to `migration_market_cap` out of two
/// segments, keeping `percentage_supply_on_migration` for the migrated pool. The first
/// mid price candidate with a valid solution wins.
pub fn build_curve_with_two_segments(
    params: &BuildCurveWithTwoSegmentsParams,
) -> Result<ConfigParameters> {
    let common = &params.common;
    let targets = derive_targets(
        common,
        params.initial_market_cap,
        params.migration_market_cap,
        params.percentage_supply_on_migration,
    )?;

    for sqrt_mid_price in
        get_mid_price_candidates(targets.sqrt_start_price, targets.sqrt_migration_price)?
    {
        match fit_two_segments(common, &targets, sqrt_mid_price)? {
            Some(config) => {
                debug!(sqrt_mid_price, "mid price candidate accepted");
                return Ok(config);
            }
            None => debug!(sqrt_mid_price, "mid price candidate rejected"),
        }
    }

    warn!(
        initial_market_cap = params.initial_market_cap,
        migration_market_cap = params.migration_market_cap,
        percentage_supply_on_migration = params.percentage_supply_on_migration,
        "no mid price yields positive liquidities"
    );
    err!(CurveError::NoValidCurve)
}

/// Same as [`build_curve_with_two_segments`] with the segment boundary fixed at
/// `mid_price`.
pub fn build_curve_with_mid_price(params: &BuildCurveWithMidPriceParams) -> Result<ConfigParameters> {
    let common = &params.common;
    let targets = derive_targets(
        common,
        params.initial_market_cap,
        params.migration_market_cap,
        params.percentage_supply_on_migration,
    )?;
    let sqrt_mid_price = get_sqrt_price_from_price(
        &decimal_from_f64(params.mid_price)?,
        common.token_base_decimal,
        common.token_quote_decimal,
    )?;

    match fit_two_segments(common, &targets, sqrt_mid_price)? {
        Some(config) => Ok(config),
        None => {
            warn!(
                mid_price = params.mid_price,
                sqrt_mid_price, "mid price yields no positive liquidities"
            );
            err!(CurveError::NoValidCurve)
        }
    }
}

fn derive_targets(
    common: &CommonCurveParams,
    initial_market_cap: f64,
    migration_market_cap: f64,
    percentage_supply_on_migration: f64,
) -> Result<TwoSegmentTargets> {
    let initial_cap = decimal_from_f64(initial_market_cap)?;
    let migration_cap = decimal_from_f64(migration_market_cap)?;
    if initial_cap <= BigDecimal::zero() || migration_cap <= initial_cap {
        warn!(
            initial_market_cap,
            migration_market_cap, "migration market cap must exceed a positive initial market cap"
        );
        return err!(CurveError::InvalidConfiguration);
    }
    let percentage = decimal_from_f64(percentage_supply_on_migration)?;
    if percentage <= BigDecimal::zero() || percentage >= BigDecimal::from(100u8) {
        warn!(
            percentage_supply_on_migration,
            "migration supply share must lie in (0, 100)"
        );
        return err!(CurveError::InvalidConfiguration);
    }

    let supply = common.supply_inputs()?;
    let sqrt_start_price = get_sqrt_price_from_market_cap(
        &initial_cap,
        common.total_token_supply,
        common.token_base_decimal,
        common.token_quote_decimal,
    )?;
    let sqrt_migration_price = get_sqrt_price_from_market_cap(
        &migration_cap,
        common.total_token_supply,
        common.token_base_decimal,
        common.token_quote_decimal,
    )?;

    let migration_base_target = decimal_floor(
        &(BigDecimal::from(supply.total_supply) * &percentage / BigDecimal::from(100u8)),
    )?;
    let migration_quote_amount = (migration_base_target
        * BigInt::from(sqrt_migration_price)
        * BigInt::from(sqrt_migration_price))
        >> 128u32;
    let migration_quote_amount = u64::try_from(bigint_to_u128(&migration_quote_amount)?)
        .map_err(|_| CurveError::MathOverflow)?;
    let migration_quote_threshold = get_migration_quote_threshold_from_migration_quote_amount(
        migration_quote_amount,
        common.migration_fee.fee_percentage,
    )?;
    require!(
        migration_quote_threshold > 0,
        CurveError::InvalidQuoteThreshold
    );
    let migration_base_amount = get_migration_base_token(
        migration_quote_amount,
        sqrt_migration_price,
        common.migration_option,
    )?;

    let reserved = u128::from(migration_base_amount)
        + u128::from(supply.total_vesting_amount)
        + u128::from(supply.total_leftover);
    if reserved >= u128::from(supply.total_supply) {
        warn!(
            total_supply = supply.total_supply,
            migration_base_amount, "nothing left to sell on the curve"
        );
        return err!(CurveError::InvalidTokenSupply);
    }

    debug!(
        sqrt_start_price,
        sqrt_migration_price,
        migration_quote_threshold,
        "derived two segment targets"
    );
    Ok(TwoSegmentTargets {
        sqrt_start_price,
        sqrt_migration_price,
        migration_quote_threshold,
        swap_amount: supply.total_supply - reserved as u64,
    })
}

/// Solves both liquidities at `sqrt_mid_price`, shrinking the sale target until the
/// curve fits the supply. `None` when the mid price has no positive solution.
fn fit_two_segments(
    common: &CommonCurveParams,
    targets: &TwoSegmentTargets,
    sqrt_mid_price: u128,
) -> Result<Option<ConfigParameters>> {
    let supply = common.supply_inputs()?;
    let body = fit_curve_to_supply(
        |swap_amount| {
            let solution = solve_two_segment_liquidity(
                targets.sqrt_start_price,
                sqrt_mid_price,
                targets.sqrt_migration_price,
                swap_amount,
                targets.migration_quote_threshold,
            )?;
            Ok(solution.map(|(l0, l1)| CurveBody {
                sqrt_start_price: targets.sqrt_start_price,
                curve: vec![
                    CurveSegment {
                        sqrt_price: sqrt_mid_price,
                        liquidity: l0,
                    },
                    CurveSegment {
                        sqrt_price: targets.sqrt_migration_price,
                        liquidity: l1,
                    },
                ],
                migration_quote_threshold: targets.migration_quote_threshold,
            }))
        },
        targets.swap_amount,
        supply.total_supply,
        targets.sqrt_migration_price,
        &supply.locked_vesting,
        common.migration_option,
        supply.total_leftover,
        common.migration_fee.fee_percentage,
    )?;
    body.map(|body| {
        common.to_config_parameters(
            supply.locked_vesting,
            body.migration_quote_threshold,
            body.sqrt_start_price,
            body.curve,
        )
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::supply::get_total_supply_from_curve;
    use crate::state::{MigrationFee, MigrationOption};
    use crate::test_utils::{assert_curve_error, sample_common_params};
    use crate::utils::constants::MAX_SQRT_PRICE;

    fn two_segment_params(percentage_supply_on_migration: f64) -> BuildCurveWithTwoSegmentsParams {
        let mut common = sample_common_params();
        common.leftover = 1_000;
        BuildCurveWithTwoSegmentsParams {
            common,
            initial_market_cap: 20.0,
            migration_market_cap: 500.0,
            percentage_supply_on_migration,
        }
    }

    #[test]
    fn test_geometric_mean_candidate_comes_first() {
        let candidates = get_mid_price_candidates(1u128 << 64, 4u128 << 64).unwrap();
        assert!(candidates[0].abs_diff(2u128 << 64) <= 1);
        assert!(candidates[1] > candidates[0]);
        assert!(candidates[2] < candidates[0]);
    }

    #[test]
    fn test_two_segments_with_geometric_mid_price() {
        let config = build_curve_with_two_segments(&two_segment_params(20.0)).unwrap();
        assert!(config.curve.len() >= 2);
        assert!(config.curve[0].sqrt_price > config.sqrt_start_price);
        assert!(config.curve[1].sqrt_price > config.curve[0].sqrt_price);
        assert!(config.curve.iter().all(|segment| segment.liquidity > 0));
        assert_eq!(config.migration_quote_threshold, 99_999_999_999);
    }

    #[test]
    fn test_two_segments_without_leftover_fit_the_supply() {
        for percentage in [20.0, 25.0, 30.0, 40.0] {
            let mut params = two_segment_params(percentage);
            params.common.leftover = 0;
            let config = build_curve_with_two_segments(&params).unwrap();
            let required = get_total_supply_from_curve(
                config.migration_quote_threshold,
                config.sqrt_start_price,
                &config.curve,
                &config.locked_vesting,
                config.migration_option,
                0,
                config.migration_fee.fee_percentage,
            )
            .unwrap();
            assert!(
                required <= 1_000_000_000_000_000,
                "percentage {percentage} required {required}"
            );
            crate::validation::validate_token_supply(&config).unwrap();
        }
    }

    #[test]
    fn test_two_segments_falls_back_to_next_candidate() {
        let params = two_segment_params(40.0);
        let config = build_curve_with_two_segments(&params).unwrap();
        let candidates =
            get_mid_price_candidates(config.sqrt_start_price, config.curve[1].sqrt_price).unwrap();
        assert_eq!(config.curve[0].sqrt_price, candidates[1]);
    }

    #[test]
    fn test_two_segments_concentrated_with_migration_fee() {
        let mut params = two_segment_params(25.0);
        params.initial_market_cap = 30.0;
        params.migration_market_cap = 1_000.0;
        params.common.migration_option = MigrationOption::DammV2;
        params.common.migration_fee = MigrationFee {
            fee_percentage: 5,
            creator_fee_percentage: 0,
        };
        let config = build_curve_with_two_segments(&params).unwrap();
        assert!(config.curve[0].sqrt_price > config.sqrt_start_price);
    }

    #[test]
    fn test_mid_price_inside_range() {
        let params = BuildCurveWithMidPriceParams {
            common: two_segment_params(20.0).common,
            initial_market_cap: 20.0,
            migration_market_cap: 500.0,
            mid_price: 0.00000045,
            percentage_supply_on_migration: 20.0,
        };
        let config = build_curve_with_mid_price(&params).unwrap();
        let expected_mid =
            get_sqrt_price_from_price(&decimal_from_f64(0.00000045).unwrap(), 6, 9).unwrap();
        assert_eq!(config.curve[0].sqrt_price, expected_mid);
        assert!(config.curve.len() <= 3);
        if config.curve.len() == 3 {
            assert_eq!(config.curve[2].sqrt_price, MAX_SQRT_PRICE);
        }
    }

    #[test]
    fn test_mid_price_with_negative_liquidity() {
        let params = BuildCurveWithMidPriceParams {
            common: two_segment_params(20.0).common,
            initial_market_cap: 20.0,
            migration_market_cap: 500.0,
            mid_price: 0.00000003,
            percentage_supply_on_migration: 20.0,
        };
        assert_curve_error(build_curve_with_mid_price(&params), CurveError::NoValidCurve);
    }

    #[test]
    fn test_mid_price_outside_range() {
        let params = BuildCurveWithMidPriceParams {
            common: two_segment_params(20.0).common,
            initial_market_cap: 20.0,
            migration_market_cap: 500.0,
            mid_price: 0.001,
            percentage_supply_on_migration: 20.0,
        };
        assert_curve_error(build_curve_with_mid_price(&params), CurveError::NoValidCurve);
    }

    #[test]
    fn test_solver_rejects_degenerate_mid_price() {
        let solution =
            solve_two_segment_liquidity(1u128 << 64, 1u128 << 64, 4u128 << 64, 1_000, 1_000)
                .unwrap();
        assert_eq!(solution, None);
    }
}
