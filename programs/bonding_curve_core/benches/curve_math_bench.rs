use bonding_curve_core::fees::{BaseFeeHandler, FeeRateLimiter};
use bonding_curve_core::math::core_arithmetic::*;
use bonding_curve_core::math::liquidity_math::*;
use bonding_curve_core::state::*;
use bonding_curve_core::swap::{swap_quote_exact_in, swap_quote_exact_out, SwapQuoteParams};
use bonding_curve_core::utils::constants::*;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::hint::black_box;

// ========== Kernel ==========

fn bench_mul_div(c: &mut Criterion) {
    let mut group = c.benchmark_group("mul_div");
    group.throughput(Throughput::Elements(1));

    let mut rng = StdRng::seed_from_u64(7);
    let inputs: Vec<(u128, u128, u128)> = (0..64)
        .map(|_| {
            (
                rng.random_range(1..u128::MAX >> 2),
                rng.random_range(1..u128::MAX >> 2),
                rng.random_range(u128::MAX >> 8..u128::MAX),
            )
        })
        .collect();

    for rounding in [Rounding::Down, Rounding::Up] {
        group.bench_with_input(
            BenchmarkId::new("u128", format!("{rounding:?}")),
            &inputs,
            |b, inputs| {
                b.iter(|| {
                    for (x, y, d) in inputs {
                        let _ = black_box(mul_div(*x, *y, *d, rounding));
                    }
                });
            },
        );
    }

    group.bench_function("sqrt_u128", |b| {
        b.iter(|| {
            for (x, _, _) in &inputs {
                black_box(sqrt_u128(*x));
            }
        });
    });
    group.finish();
}

// ========== Curve primitives ==========

fn bench_deltas(c: &mut Criterion) {
    let mut group = c.benchmark_group("curve_deltas");
    let liquidity = 1_000_000_000u128 << 64;
    let ranges = [
        ("narrow", ONE_Q64, ONE_Q64 + (ONE_Q64 >> 10)),
        ("wide", MIN_SQRT_PRICE, MAX_SQRT_PRICE),
        ("unit", ONE_Q64, 2 * ONE_Q64),
    ];

    for (name, lower, upper) in ranges {
        group.bench_function(BenchmarkId::new("base", name), |b| {
            b.iter(|| {
                black_box(get_delta_amount_base_unsigned_256(
                    black_box(lower),
                    black_box(upper),
                    liquidity,
                    Rounding::Up,
                ))
            });
        });
        group.bench_function(BenchmarkId::new("quote", name), |b| {
            b.iter(|| {
                black_box(get_delta_amount_quote_unsigned_256(
                    black_box(lower),
                    black_box(upper),
                    liquidity,
                    Rounding::Up,
                ))
            });
        });
    }

    group.bench_function("next_sqrt_price_from_input", |b| {
        b.iter(|| {
            black_box(get_next_sqrt_price_from_input(
                black_box(ONE_Q64),
                liquidity,
                black_box(123_456_789),
                false,
            ))
        });
    });
    group.finish();
}

// ========== Fees ==========

fn bench_rate_limiter(c: &mut Criterion) {
    let mut group = c.benchmark_group("rate_limiter");
    let limiter = FeeRateLimiter {
        cliff_fee_numerator: 10_000_000,
        fee_increment_bps: 10,
        max_limiter_duration: 10,
        reference_amount: 1_000_000_000,
    };

    for amount in [500_000_000u64, 5_000_000_000, 500_000_000_000] {
        group.bench_with_input(BenchmarkId::new("forward", amount), &amount, |b, amount| {
            b.iter(|| black_box(limiter.get_fee_numerator_from_included_fee_amount(*amount)));
        });
        group.bench_with_input(BenchmarkId::new("inverse", amount), &amount, |b, amount| {
            b.iter(|| {
                black_box(limiter.get_base_fee_numerator_from_excluded_fee_amount(
                    5,
                    0,
                    TradeDirection::QuoteToBase,
                    *amount,
                ))
            });
        });
    }
    group.finish();
}

// ========== Swaps ==========

fn sample_pool() -> (VirtualPool, PoolConfig) {
    let curve: Vec<CurveSegment> = (1..=MAX_CURVE_POINT as u128)
        .map(|i| CurveSegment {
            sqrt_price: ONE_Q64 + i * (ONE_Q64 >> 4),
            liquidity: 1_000_000_000u128 << 64,
        })
        .collect();
    let config = PoolConfig {
        pool_fees: Default::default(),
        collect_fee_mode: CollectFeeMode::QuoteToken,
        activation_type: ActivationType::Slot,
        migration_option: MigrationOption::DammV2,
        migration_fee_percentage: 0,
        migration_quote_threshold: u64::MAX,
        migration_base_threshold: 0,
        migration_sqrt_price: curve[MAX_CURVE_POINT - 1].sqrt_price,
        sqrt_start_price: ONE_Q64,
        enable_first_swap_with_min_fee: false,
        curve,
    };
    (VirtualPool::new(&config, u64::MAX / 2, 0), config)
}

fn bench_swap_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("swap_walk");
    let (pool, config) = sample_pool();

    for amount in [1_000u64, 100_000_000, 900_000_000] {
        let params = SwapQuoteParams {
            amount,
            swap_base_for_quote: false,
            slippage_bps: 100,
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::new("exact_in", amount), &params, |b, params| {
            b.iter(|| black_box(swap_quote_exact_in(&pool, &config, params)));
        });
        group.bench_with_input(BenchmarkId::new("exact_out", amount), &params, |b, params| {
            b.iter(|| black_box(swap_quote_exact_out(&pool, &config, params)));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_mul_div,
    bench_deltas,
    bench_rate_limiter,
    bench_swap_walk
);
criterion_main!(benches);
