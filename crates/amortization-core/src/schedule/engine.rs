//! Fixed-rate amortization with one-time extra payments.
//!
//! The level payment comes from the annuity formula; each period then
//! splits it into interest on the opening balance and principal. One-time
//! payments go straight to principal after the scheduled split, so they
//! shorten the payoff rather than lowering the payment. The schedule always
//! spans the nominal term; periods after payoff are zero placeholders.

use log::{debug, trace, warn};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::{AmortizationSchedule, ScheduleRow, ScheduleSummary};
use crate::error::AmortizationError;
use crate::terms::{
    check_bounds, ExtraPayments, LoanParameters, MAX_ANNUAL_RATE_PCT, MAX_PRINCIPAL,
    MAX_TERM_MONTHS,
};
use crate::time_value::{level_payment, monthly_rate};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::AmortizationResult;

const METHODOLOGY: &str = "Fixed-rate annuity amortization with one-time principal prepayments";

/// Inputs for one schedule run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleInput {
    #[serde(flatten)]
    pub loan: LoanParameters,
    /// Extra principal payments by 1-based period.
    #[serde(default)]
    pub one_time_payments: ExtraPayments,
}

impl ScheduleInput {
    pub fn new(loan: LoanParameters) -> Self {
        Self {
            loan,
            one_time_payments: ExtraPayments::new(),
        }
    }

    pub fn with_one_time_payments(mut self, payments: ExtraPayments) -> Self {
        self.one_time_payments = payments;
        self
    }
}

/// Build the full schedule and summary for a loan.
///
/// Invalid loan parameters return [`AmortizationError::InvalidInput`];
/// no partial schedule is ever produced.
pub fn compute_schedule(
    input: &ScheduleInput,
) -> AmortizationResult<ComputationOutput<AmortizationSchedule>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    validate(input)?;

    let loan = &input.loan;
    let months = loan.months;
    let rate = monthly_rate(loan.annual_rate_pct);
    let monthly_payment = level_payment(loan.principal, rate, months)?;
    debug!(
        "amortizing {} at {}% over {} months, level payment {}",
        loan.principal, loan.annual_rate_pct, months, monthly_payment
    );

    for (&period, amount) in input.one_time_payments.range(months + 1..) {
        warnings.push(format!(
            "One-time payment of {amount} at payment {period} is beyond the {months}-month term and was ignored"
        ));
    }

    let mut rows = Vec::with_capacity(months as usize);
    let mut balance = loan.principal;
    let mut total_interest = Decimal::ZERO;
    let mut total_principal = Decimal::ZERO;
    let mut total_one_time = Decimal::ZERO;
    let mut payoff_period: Option<u32> = None;

    for period in 1..=months {
        if payoff_period.is_some() {
            if let Some(amount) = input.one_time_payments.get(&period) {
                if *amount > Decimal::ZERO {
                    warnings.push(format!(
                        "One-time payment of {amount} at payment {period} falls after payoff and was ignored"
                    ));
                }
            }
            rows.push(ScheduleRow::paid_off(period));
            continue;
        }

        let interest = balance * rate;
        let mut principal = monthly_payment - interest;
        let mut payment = monthly_payment;

        // Final nominal period, or a balance already cut down by extra
        // payments: retire exactly what is left.
        if period == months || principal > balance {
            principal = balance;
            payment = principal + interest;
        }
        balance -= principal;

        let one_time_payment = match input.one_time_payments.get(&period) {
            Some(amount) if *amount > Decimal::ZERO => {
                let applied = (*amount).min(balance);
                if applied < *amount {
                    warn!("one-time payment at period {period} capped to remaining balance {balance}");
                    warnings.push(format!(
                        "One-time payment of {amount} at payment {period} exceeds the remaining balance; {applied} applied"
                    ));
                }
                (applied > Decimal::ZERO).then_some(applied)
            }
            _ => None,
        };
        if let Some(extra) = one_time_payment {
            balance -= extra;
            total_one_time += extra;
        }

        if balance < Decimal::ZERO {
            balance = Decimal::ZERO;
        }

        total_interest += interest;
        total_principal += principal;

        trace!(
            "period {period}: payment {payment}, principal {principal}, interest {interest}, balance {balance}"
        );

        rows.push(ScheduleRow {
            period,
            payment,
            principal,
            interest,
            balance,
            one_time_payment,
        });

        if balance.is_zero() {
            payoff_period = Some(period);
        }
    }

    // The final period always clears the balance, so this only falls back
    // for the degenerate case of an empty loop.
    let payoff_period = payoff_period.unwrap_or(months);
    if payoff_period < months {
        debug!("paid off at period {payoff_period}, {} early", months - payoff_period);
    }

    let summary = ScheduleSummary {
        monthly_payment,
        total_interest,
        total_principal,
        total_one_time_payments: total_one_time,
        total_paid: loan.principal + total_interest,
        payoff_period,
        payoff_years: (Decimal::from(payoff_period) / dec!(12))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        nominal_months: months,
        periods_saved: months - payoff_period,
    };

    let schedule = AmortizationSchedule {
        parameters: *loan,
        rows,
        summary,
        one_time_payments: input.one_time_payments.clone(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(METHODOLOGY, input, warnings, elapsed, schedule))
}

fn validate(input: &ScheduleInput) -> AmortizationResult<()> {
    let loan = &input.loan;
    // Same limits as the entry form, so the loop arithmetic cannot overflow.
    check_bounds("principal", loan.principal, MAX_PRINCIPAL)?;
    check_bounds("annual_rate_pct", loan.annual_rate_pct, MAX_ANNUAL_RATE_PCT)?;
    if loan.months == 0 {
        return Err(AmortizationError::InvalidInput {
            field: "months".into(),
            reason: "Term must be at least one month".into(),
        });
    }
    if loan.months > MAX_TERM_MONTHS {
        return Err(AmortizationError::InvalidInput {
            field: "months".into(),
            reason: format!("Term cannot exceed {MAX_TERM_MONTHS} months"),
        });
    }
    for (&period, amount) in &input.one_time_payments {
        if period == 0 {
            return Err(AmortizationError::InvalidInput {
                field: "one_time_payments".into(),
                reason: "Payment numbers start at 1".into(),
            });
        }
        if *amount < Money::ZERO {
            return Err(AmortizationError::InvalidInput {
                field: "one_time_payments".into(),
                reason: format!("One-time payment at payment {period} cannot be negative"),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_value::remaining_balance;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use test_log::test;

    const TOL: Decimal = dec!(0.01);

    fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal, msg: &str) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tol,
            "{}: expected ~{}, got {} (diff = {})",
            msg,
            expected,
            actual,
            diff
        );
    }

    fn loan(principal: Decimal, rate: Decimal, months: u32) -> ScheduleInput {
        ScheduleInput::new(LoanParameters {
            principal,
            annual_rate_pct: rate,
            months,
        })
    }

    fn standard_mortgage() -> ScheduleInput {
        loan(dec!(100_000), dec!(6), 360)
    }

    #[test]
    fn test_standard_mortgage_payment() {
        let out = compute_schedule(&standard_mortgage()).unwrap();
        let s = &out.result.summary;
        assert_close(s.monthly_payment, dec!(599.55), TOL, "monthly payment");
        assert_eq!(s.payoff_period, 360);
        assert_eq!(s.periods_saved, 0);
        assert_eq!(s.payoff_years, dec!(30));
        assert_eq!(out.result.rows.len(), 360);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_first_period_split() {
        let out = compute_schedule(&standard_mortgage()).unwrap();
        let first = &out.result.rows[0];
        assert_eq!(first.period, 1);
        // 100k * 0.5% = 500 interest
        assert_eq!(first.interest, dec!(500));
        assert_close(first.principal, dec!(99.55), TOL, "first principal");
        assert_close(first.balance, dec!(99_900.45), TOL, "first balance");
    }

    #[test]
    fn test_final_period_clears_balance() {
        let out = compute_schedule(&standard_mortgage()).unwrap();
        let last = out.result.rows.last().unwrap();
        assert_eq!(last.period, 360);
        assert_eq!(last.balance, Decimal::ZERO);
        assert_eq!(last.payment, last.principal + last.interest);
        assert_close(last.payment, dec!(599.55), TOL, "final payment");
    }

    #[test]
    fn test_total_interest_is_sum_of_rows() {
        let out = compute_schedule(&standard_mortgage()).unwrap();
        let sum: Decimal = out.result.rows.iter().map(|r| r.interest).sum();
        assert_eq!(out.result.summary.total_interest, sum);
        assert_close(out.result.summary.total_interest, dec!(115_838.19), dec!(0.5), "total interest");
        assert_eq!(
            out.result.summary.total_paid,
            dec!(100_000) + out.result.summary.total_interest
        );
    }

    #[test]
    fn test_one_time_payment_shortens_payoff() {
        let base = compute_schedule(&standard_mortgage()).unwrap();
        let mut extras = ExtraPayments::new();
        extras.insert(12, dec!(20_000));
        let input = standard_mortgage().with_one_time_payments(extras);
        let out = compute_schedule(&input).unwrap();
        let s = &out.result.summary;

        assert!(s.payoff_period < base.result.summary.payoff_period);
        assert!(s.total_interest < base.result.summary.total_interest);
        assert_eq!(s.periods_saved, 360 - s.payoff_period);
        assert_eq!(s.total_one_time_payments, dec!(20_000));
        assert_eq!(out.result.rows[11].one_time_payment, Some(dec!(20_000)));
        assert_eq!(out.result.rows.len(), 360);

        for row in &out.result.rows[s.payoff_period as usize..] {
            assert!(row.is_placeholder(), "row {} should be zero-filled", row.period);
        }
    }

    #[test]
    fn test_payoff_period_row_clears_balance() {
        let mut extras = ExtraPayments::new();
        extras.insert(2, dec!(5_000));
        let input = loan(dec!(12_000), dec!(5), 24).with_one_time_payments(extras);
        let out = compute_schedule(&input).unwrap();
        let payoff = out.result.summary.payoff_period;
        let row = &out.result.rows[payoff as usize - 1];
        assert_eq!(row.balance, Decimal::ZERO);
        assert!(!row.is_placeholder());
        assert!(payoff < 24);
    }

    #[test]
    fn test_principal_plus_extras_retire_principal() {
        let mut extras = ExtraPayments::new();
        extras.insert(3, dec!(1_000));
        extras.insert(40, dec!(2_500.50));
        let input = loan(dec!(25_000), dec!(7.25), 60).with_one_time_payments(extras);
        let out = compute_schedule(&input).unwrap();
        let principal: Decimal = out.result.rows.iter().map(|r| r.principal).sum();
        let extra: Decimal = out
            .result
            .rows
            .iter()
            .filter_map(|r| r.one_time_payment)
            .sum();
        assert_close(principal + extra, dec!(25_000), dec!(0.000001), "retired principal");
    }

    #[test]
    fn test_oversized_one_time_payment_is_capped() {
        let mut extras = ExtraPayments::new();
        extras.insert(1, dec!(1_000_000));
        let input = loan(dec!(10_000), dec!(4), 12).with_one_time_payments(extras);
        let out = compute_schedule(&input).unwrap();
        let first = &out.result.rows[0];
        assert_eq!(first.balance, Decimal::ZERO);
        let applied = first.one_time_payment.unwrap();
        assert_close(applied, dec!(10_000) - first.principal, dec!(0.000001), "capped payment");
        assert_eq!(out.result.summary.payoff_period, 1);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_extra_after_payoff_and_beyond_term_warn() {
        let mut extras = ExtraPayments::new();
        extras.insert(1, dec!(50_000));
        extras.insert(6, dec!(100));
        extras.insert(99, dec!(100));
        let input = loan(dec!(10_000), dec!(4), 12).with_one_time_payments(extras.clone());
        let out = compute_schedule(&input).unwrap();
        // capped at period 1, ignored at 6 (after payoff) and 99 (beyond term)
        assert_eq!(out.warnings.len(), 3);
        assert_eq!(out.result.rows[5].one_time_payment, None);
        assert_eq!(out.result.one_time_payments, extras);
    }

    #[test]
    fn test_one_month_loan() {
        let out = compute_schedule(&loan(dec!(1_000), dec!(12), 1)).unwrap();
        let row = &out.result.rows[0];
        assert_eq!(row.interest, dec!(10));
        assert_eq!(row.principal, dec!(1_000));
        assert_eq!(row.payment, dec!(1_010));
        assert_eq!(row.balance, Decimal::ZERO);
        assert_eq!(out.result.summary.payoff_period, 1);
    }

    #[test]
    fn test_invalid_inputs_refused() {
        for input in [
            loan(dec!(0), dec!(6), 360),
            loan(dec!(-5), dec!(6), 360),
            loan(dec!(100_000), dec!(0), 360),
            loan(dec!(100_000), dec!(6), 0),
            loan(dec!(100_000), dec!(6), 1201),
        ] {
            let err = compute_schedule(&input).unwrap_err();
            assert!(err.is_invalid_input(), "expected refusal, got {err}");
            assert_eq!(err.user_message(), "Please enter valid values.");
        }
    }

    #[test]
    fn test_out_of_range_principal_or_rate_refused() {
        for input in [
            loan(dec!(1_000_000_000), dec!(10_000_000_000_000_000_000_000_000), 2),
            loan(dec!(1_000_000_000.01), dec!(6), 360),
            loan(Decimal::MAX, dec!(6), 360),
            loan(dec!(100_000), dec!(100.0001), 360),
        ] {
            let err = compute_schedule(&input).unwrap_err();
            assert!(err.is_invalid_input(), "expected refusal, got {err}");
        }
    }

    #[test]
    fn test_largest_accepted_loan_computes() {
        let out = compute_schedule(&loan(dec!(1_000_000_000), dec!(100), 1200)).unwrap();
        assert_eq!(out.result.rows.len(), 1200);
        assert_eq!(out.result.rows.last().unwrap().balance, Decimal::ZERO);
    }

    #[test]
    fn test_balances_match_closed_form_without_extras() {
        let input = loan(dec!(18_500.75), dec!(9.99), 72);
        let out = compute_schedule(&input).unwrap();
        let rate = monthly_rate(input.loan.annual_rate_pct);
        let payment = out.result.summary.monthly_payment;
        for row in &out.result.rows {
            let expected = remaining_balance(input.loan.principal, rate, payment, row.period).unwrap();
            assert_close(row.balance, expected.max(Decimal::ZERO), dec!(0.0001), "balance");
        }
    }

    #[test]
    fn test_negative_one_time_payment_refused() {
        let mut extras = ExtraPayments::new();
        extras.insert(5, dec!(-1));
        let input = standard_mortgage().with_one_time_payments(extras);
        assert!(compute_schedule(&input).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_input_deserializes_from_flat_json() {
        let json = r#"{
            "principal": "100000",
            "annual_rate_pct": "6",
            "months": 360,
            "one_time_payments": { "12": "500" }
        }"#;
        let input: ScheduleInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.loan.months, 360);
        assert_eq!(input.one_time_payments[&12], dec!(500));
    }
}
