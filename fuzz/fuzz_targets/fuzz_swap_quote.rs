#![no_main]

use arbitrary::Arbitrary;
use bonding_curve_core::fees::{BaseFeeParams, FeeScheduler, PoolFeesConfig};
use bonding_curve_core::state::*;
use bonding_curve_core::swap::*;
use bonding_curve_core::utils::constants::ONE_Q64;
use honggfuzz::fuzz;

#[derive(Debug, Clone, Arbitrary)]
struct QuoteInput {
    amount: u64,
    swap_base_for_quote: bool,
    fee_bps: u16,
    collect_on_output: bool,
    has_referral: bool,
}

// two segments over [1, 2] and [2, 4] in sqrt price
fn pool(fee_bps: u16, collect_fee_mode: CollectFeeMode) -> (VirtualPool, PoolConfig) {
    let fee_numerator = u64::from(fee_bps % 9_875 + 25) * 100_000;
    let curve = vec![
        CurveSegment {
            sqrt_price: 2 * ONE_Q64,
            liquidity: 1_000_000_000u128 << 64,
        },
        CurveSegment {
            sqrt_price: 4 * ONE_Q64,
            liquidity: 500_000_000u128 << 64,
        },
    ];
    let config = PoolConfig {
        pool_fees: PoolFeesConfig {
            base_fee: BaseFeeParams::FeeScheduler(FeeScheduler {
                cliff_fee_numerator: fee_numerator,
                ..Default::default()
            }),
            dynamic_fee: None,
        },
        collect_fee_mode,
        activation_type: ActivationType::Slot,
        migration_option: MigrationOption::DammV2,
        migration_fee_percentage: 0,
        migration_quote_threshold: 2_000_000_000,
        migration_base_threshold: 0,
        migration_sqrt_price: 4 * ONE_Q64,
        sqrt_start_price: ONE_Q64,
        enable_first_swap_with_min_fee: false,
        curve,
    };
    let mut pool = VirtualPool::new(&config, 1_000_000_000, 0);
    // halfway up so both directions have room
    pool.sqrt_price = 2 * ONE_Q64;
    pool.quote_reserve = 1_000_000_000;
    (pool, config)
}

fn fuzz_quote(input: QuoteInput) {
    let collect_fee_mode = if input.collect_on_output {
        CollectFeeMode::OutputToken
    } else {
        CollectFeeMode::QuoteToken
    };
    let (pool, config) = pool(input.fee_bps, collect_fee_mode);
    let params = SwapQuoteParams {
        amount: input.amount,
        swap_base_for_quote: input.swap_base_for_quote,
        slippage_bps: 50,
        has_referral: input.has_referral,
        current_point: 10,
        is_first_swap: false,
    };

    let exact_in = swap_quote_exact_in(&pool, &config, &params);
    let partial = swap_quote_partial_fill(&pool, &config, &params);
    if let Ok(quote) = &exact_in {
        let result = quote.swap_result;
        assert_eq!(result.amount_left, 0);
        assert!(quote.minimum_amount_out <= result.output_amount);
        if input.swap_base_for_quote {
            assert!(result.next_sqrt_price <= pool.sqrt_price);
        } else {
            assert!(result.next_sqrt_price >= pool.sqrt_price);
        }
        // a full fill is a partial fill with nothing left
        let partial = partial.unwrap().swap_result;
        if !input.swap_base_for_quote {
            assert_eq!(partial.output_amount, result.output_amount);
        }
    }
    if let Ok(quote) = partial {
        let result = quote.swap_result;
        assert_eq!(
            result.included_fee_input_amount + result.amount_left,
            input.amount
        );
        assert!(result.next_sqrt_price <= config.migration_sqrt_price);
    }

    if let Ok(quote) = swap_quote_exact_out(&pool, &config, &params) {
        assert!(quote.maximum_amount_in >= quote.swap_result.included_fee_input_amount);
        assert!(quote.swap_result.next_sqrt_price <= config.migration_sqrt_price);
    }
}

fn main() {
    loop {
        fuzz!(|data: QuoteInput| {
            fuzz_quote(data);
        });
    }
}
