#![no_main]

use anchor_lang::error::Error;
use arbitrary::Arbitrary;
use bonding_curve_core::math::core_arithmetic::{mul_div, shl_div, Rounding};
use bonding_curve_core::CurveError;
use ethnum::U256;
use honggfuzz::fuzz;

#[derive(Debug, Clone, Arbitrary)]
enum MulDivOp {
    MulDiv,
    ShlDiv { offset: u8 },
}

#[derive(Debug, Clone, Arbitrary)]
struct MulDivTest {
    x: u128,
    y: u128,
    denominator: u128,
    operation: MulDivOp,
}

fn fuzz_mul_div_operations(test: MulDivTest) {
    let MulDivTest {
        x,
        y,
        denominator,
        operation,
    } = test;

    match operation {
        MulDivOp::MulDiv => {
            let down = mul_div(x, y, denominator, Rounding::Down);
            let up = mul_div(x, y, denominator, Rounding::Up);
            if denominator == 0 {
                assert_eq!(down.unwrap_err(), Error::from(CurveError::DivisionByZero));
                assert_eq!(up.unwrap_err(), Error::from(CurveError::DivisionByZero));
                return;
            }

            let product = U256::from(x) * U256::from(y);
            let exact = product / U256::from(denominator);
            let has_remainder = product % U256::from(denominator) != U256::ZERO;
            match down {
                Ok(value) => assert_eq!(U256::from(value), exact),
                Err(_) => assert!(exact > U256::from(u128::MAX)),
            }
            if let (Ok(down), Ok(up)) = (down, up) {
                assert_eq!(up - down, u128::from(has_remainder));
            }
        }

        MulDivOp::ShlDiv { offset } => {
            let offset = u32::from(offset % 128);
            let down = shl_div(x, y, offset, Rounding::Down);
            let up = shl_div(x, y, offset, Rounding::Up);
            if y == 0 {
                assert!(down.is_err() && up.is_err());
                return;
            }
            if let (Ok(down), Ok(up)) = (down, up) {
                assert!(up >= down && up - down <= 1);
            }
        }
    }
}

fn main() {
    loop {
        fuzz!(|data: MulDivTest| {
            fuzz_mul_div_operations(data);
        });
    }
}
