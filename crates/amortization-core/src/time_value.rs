use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::AmortizationError;
use crate::types::{Money, Rate};
use crate::AmortizationResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);
const PERCENT: Decimal = dec!(100);

/// Per-month decimal rate from an annual percentage (6 -> 0.005).
pub fn monthly_rate(annual_rate_pct: Rate) -> Rate {
    annual_rate_pct / MONTHS_PER_YEAR / PERCENT
}

/// One-period discount factor raised to `nper`: (1 + rate)^(-nper).
///
/// Computed from the reciprocal so long terms underflow towards zero
/// instead of overflowing the 96-bit mantissa.
fn discount_factor(rate: Rate, nper: u32) -> AmortizationResult<Decimal> {
    let one_plus_r = Decimal::ONE + rate;
    if one_plus_r <= Decimal::ZERO {
        return Err(AmortizationError::InvalidInput {
            field: "rate".into(),
            reason: "Rate must be greater than -100%".into(),
        });
    }
    (Decimal::ONE / one_plus_r)
        .checked_powd(Decimal::from(nper))
        .ok_or_else(|| AmortizationError::DivisionByZero {
            context: format!("discount factor over {nper} periods"),
        })
}

/// Future Value
pub fn fv(rate: Rate, nper: u32, pmt: Money, present_value: Money) -> AmortizationResult<Money> {
    if rate.is_zero() {
        return Ok(-(present_value + pmt * Decimal::from(nper)));
    }

    let factor = (Decimal::ONE + rate)
        .checked_powd(Decimal::from(nper))
        .ok_or_else(|| AmortizationError::InvalidInput {
            field: "nper".into(),
            reason: format!("Compounding over {nper} periods overflows"),
        })?;
    let annuity_factor = (factor - Decimal::ONE) / rate;

    Ok(-(present_value * factor + pmt * annuity_factor))
}

/// Payment (PMT), spreadsheet sign convention: a positive present value
/// yields a negative payment.
pub fn pmt(rate: Rate, nper: u32, present_value: Money, future_value: Money) -> AmortizationResult<Money> {
    if nper == 0 {
        return Err(AmortizationError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(-(present_value + future_value) / Decimal::from(nper));
    }

    let v_n = discount_factor(rate, nper)?;
    let denominator = Decimal::ONE - v_n;

    if denominator.is_zero() {
        return Err(AmortizationError::DivisionByZero {
            context: "PMT annuity factor".into(),
        });
    }

    Ok(-(present_value + future_value * v_n) * rate / denominator)
}

/// Fixed periodic payment that retires `principal` over `nper` periods:
/// P·r / (1 − (1+r)^(−n)).
pub fn level_payment(principal: Money, rate: Rate, nper: u32) -> AmortizationResult<Money> {
    Ok(-pmt(rate, nper, principal, Decimal::ZERO)?)
}

/// Scheduled balance left after `paid` level payments, ignoring extra payments.
pub fn remaining_balance(
    principal: Money,
    rate: Rate,
    payment: Money,
    paid: u32,
) -> AmortizationResult<Money> {
    Ok(-fv(rate, paid, -payment, principal)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_monthly_rate() {
        assert_eq!(monthly_rate(dec!(6)), dec!(0.005));
        assert_eq!(monthly_rate(dec!(12)), dec!(0.01));
    }

    #[test]
    fn test_level_payment_thirty_year() {
        // 100k at 6% over 360 months: the textbook 599.55
        let payment = level_payment(dec!(100_000), dec!(0.005), 360).unwrap();
        assert!((payment - dec!(599.55)).abs() < dec!(0.01));
    }

    #[test]
    fn test_pmt_sign_convention() {
        let result = pmt(dec!(0.01), 12, dec!(1000), dec!(0)).unwrap();
        // 1000 at 1%/period over 12 periods ≈ 88.85 outflow
        assert!((result - dec!(-88.85)).abs() < dec!(0.01));
    }

    #[test]
    fn test_pmt_zero_rate() {
        let result = pmt(dec!(0), 10, dec!(1000), dec!(0)).unwrap();
        assert_eq!(result, dec!(-100));
    }

    #[test]
    fn test_pmt_zero_periods_rejected() {
        assert!(pmt(dec!(0.01), 0, dec!(1000), dec!(0)).is_err());
    }

    #[test]
    fn test_remaining_balance_endpoints() {
        let payment = level_payment(dec!(100_000), dec!(0.005), 360).unwrap();
        let start = remaining_balance(dec!(100_000), dec!(0.005), payment, 0).unwrap();
        assert_eq!(start, dec!(100_000));
        let end = remaining_balance(dec!(100_000), dec!(0.005), payment, 360).unwrap();
        assert!(end.abs() < dec!(0.0001));
    }

    #[test]
    fn test_long_high_rate_term_does_not_overflow() {
        // 100% annual over 1200 months: (1+r)^n is far beyond Decimal::MAX
        let payment = level_payment(dec!(1_000_000_000), monthly_rate(dec!(100)), 1200).unwrap();
        let interest_only = dec!(1_000_000_000) * monthly_rate(dec!(100));
        assert!((payment - interest_only).abs() < dec!(0.01));
    }
}
