//! Loan inputs as the presentation layer supplies them.
//!
//! Amounts arrive as text, possibly with thousands separators. They are
//! validated against the same ranges and precisions the entry form allows
//! and converted into [`LoanParameters`] for the engine.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::AmortizationError;
use crate::types::{Money, Rate};
use crate::AmortizationResult;

/// Longest term accepted, in months (100 years).
pub const MAX_TERM_MONTHS: u32 = 1200;

/// Largest loan principal accepted.
pub const MAX_PRINCIPAL: Decimal = dec!(1_000_000_000);
/// Highest annual rate accepted, in percent.
pub const MAX_ANNUAL_RATE_PCT: Decimal = dec!(100);
const PRINCIPAL_DP: u32 = 2;
const RATE_DP: u32 = 4;
const TERM_DP: u32 = 2;

/// One-time extra payments keyed by 1-based period index.
pub type ExtraPayments = BTreeMap<u32, Money>;

/// Immutable inputs to one schedule calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanParameters {
    pub principal: Money,
    /// Annual interest rate as a percentage (6 = 6%).
    pub annual_rate_pct: Rate,
    pub months: u32,
}

/// Unit the term value is expressed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermUnit {
    #[default]
    Years,
    Months,
}

impl TermUnit {
    /// Whole months for a term value; fractional months are truncated.
    pub fn to_months(self, term: Decimal) -> Decimal {
        let months = match self {
            TermUnit::Years => term * dec!(12),
            TermUnit::Months => term,
        };
        months.trunc()
    }
}

impl FromStr for TermUnit {
    type Err = AmortizationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "years" | "year" | "y" => Ok(TermUnit::Years),
            "months" | "month" | "m" => Ok(TermUnit::Months),
            other => Err(AmortizationError::invalid(
                "term_unit",
                format!("Unknown term unit '{other}' (expected years or months)"),
            )),
        }
    }
}

/// Raw loan form as typed by the user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoanForm {
    pub principal: String,
    pub annual_rate: String,
    pub term: String,
    #[serde(default)]
    pub term_unit: TermUnit,
}

impl LoanForm {
    pub fn parse(&self) -> AmortizationResult<LoanParameters> {
        let principal = parse_amount("principal", &self.principal)?;
        check_range("principal", principal, MAX_PRINCIPAL, PRINCIPAL_DP)?;

        let annual_rate_pct = parse_amount("annual_rate", &self.annual_rate)?;
        check_range("annual_rate", annual_rate_pct, MAX_ANNUAL_RATE_PCT, RATE_DP)?;

        let term = parse_amount("term", &self.term)?;
        check_range("term", term, Decimal::from(MAX_TERM_MONTHS), TERM_DP)?;

        let months = months_from_term(term, self.term_unit)?;

        Ok(LoanParameters {
            principal,
            annual_rate_pct,
            months,
        })
    }
}

/// Convert a term value and unit into a month count in `1..=MAX_TERM_MONTHS`.
pub fn months_from_term(term: Decimal, unit: TermUnit) -> AmortizationResult<u32> {
    let months = unit.to_months(term);
    if months <= Decimal::ZERO {
        return Err(AmortizationError::invalid(
            "term",
            "Term must be at least one month",
        ));
    }
    if months > Decimal::from(MAX_TERM_MONTHS) {
        return Err(AmortizationError::invalid(
            "term",
            format!("Term cannot exceed {MAX_TERM_MONTHS} months"),
        ));
    }
    months
        .to_u32()
        .ok_or_else(|| AmortizationError::invalid("term", "Term is out of range"))
}

/// Parse a numeric field, ignoring thousands separators and surrounding space.
pub fn parse_amount(field: &str, text: &str) -> AmortizationResult<Decimal> {
    let cleaned: String = text.chars().filter(|c| *c != ',').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err(AmortizationError::invalid(field, "Value is required"));
    }
    Decimal::from_str(cleaned)
        .map_err(|_| AmortizationError::invalid(field, format!("'{}' is not a number", text.trim())))
}

/// Require `0 < value <= max`.
pub(crate) fn check_bounds(field: &str, value: Decimal, max: Decimal) -> AmortizationResult<()> {
    if value <= Decimal::ZERO {
        return Err(AmortizationError::invalid(field, "Must be greater than zero"));
    }
    if value > max {
        return Err(AmortizationError::invalid(field, format!("Must not exceed {max}")));
    }
    Ok(())
}

fn check_range(field: &str, value: Decimal, max: Decimal, max_dp: u32) -> AmortizationResult<()> {
    check_bounds(field, value, max)?;
    if value.normalize().scale() > max_dp {
        return Err(AmortizationError::invalid(
            field,
            format!("At most {max_dp} decimal places allowed"),
        ));
    }
    Ok(())
}

/// Parse `PERIOD=AMOUNT` entries into a one-time payment map.
///
/// A blank amount is treated as an empty cell and skipped. Later entries for
/// the same period replace earlier ones.
pub fn parse_extra_payments<S: AsRef<str>>(entries: &[S]) -> AmortizationResult<ExtraPayments> {
    let mut payments = ExtraPayments::new();
    for entry in entries {
        let entry = entry.as_ref();
        let (period, amount) = entry.split_once('=').ok_or_else(|| {
            AmortizationError::invalid(
                "one_time_payment",
                format!("'{entry}' must be PERIOD=AMOUNT"),
            )
        })?;
        let period: u32 = period.trim().parse().map_err(|_| {
            AmortizationError::invalid(
                "one_time_payment",
                format!("'{}' is not a payment number", period.trim()),
            )
        })?;
        if period == 0 {
            return Err(AmortizationError::invalid(
                "one_time_payment",
                "Payment numbers start at 1",
            ));
        }
        if amount.trim().is_empty() {
            continue;
        }
        let amount = parse_amount("one_time_payment", amount)?;
        if amount < Decimal::ZERO {
            return Err(AmortizationError::invalid(
                "one_time_payment",
                format!("Payment {period}: amount cannot be negative"),
            ));
        }
        payments.insert(period, amount);
    }
    Ok(payments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn form(principal: &str, rate: &str, term: &str, unit: TermUnit) -> LoanForm {
        LoanForm {
            principal: principal.into(),
            annual_rate: rate.into(),
            term: term.into(),
            term_unit: unit,
        }
    }

    #[test]
    fn test_parse_strips_thousands_separators() {
        let params = form("250,000.00", "6.5", "30", TermUnit::Years).parse().unwrap();
        assert_eq!(params.principal, dec!(250000));
        assert_eq!(params.annual_rate_pct, dec!(6.5));
        assert_eq!(params.months, 360);
    }

    #[test]
    fn test_fractional_years_truncate_to_whole_months() {
        // 2.55 years = 30.6 months -> 30
        let params = form("1000", "5", "2.55", TermUnit::Years).parse().unwrap();
        assert_eq!(params.months, 30);
    }

    #[test]
    fn test_months_unit_truncates() {
        let params = form("1000", "5", "18.75", TermUnit::Months).parse().unwrap();
        assert_eq!(params.months, 18);
    }

    #[test]
    fn test_zero_and_blank_fields_rejected() {
        assert!(form("0", "5", "10", TermUnit::Years).parse().is_err());
        assert!(form("1000", "0", "10", TermUnit::Years).parse().is_err());
        assert!(form("1000", "5", "", TermUnit::Years).parse().is_err());
        assert!(form("abc", "5", "10", TermUnit::Years).parse().is_err());
    }

    #[test]
    fn test_sub_month_term_rejected() {
        let err = form("1000", "5", "0.5", TermUnit::Months).parse().unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_term_over_limit_rejected() {
        assert!(form("1000", "5", "101", TermUnit::Years).parse().is_err());
        assert!(form("1000", "5", "1200", TermUnit::Months).parse().is_ok());
    }

    #[test]
    fn test_precision_limits() {
        assert!(form("1000.123", "5", "10", TermUnit::Years).parse().is_err());
        assert!(form("1000.10", "5.12345", "10", TermUnit::Years).parse().is_err());
        assert!(form("1000.10", "5.1234", "10", TermUnit::Years).parse().is_ok());
    }

    #[test]
    fn test_term_unit_from_str() {
        assert_eq!("Years".parse::<TermUnit>().unwrap(), TermUnit::Years);
        assert_eq!(" months ".parse::<TermUnit>().unwrap(), TermUnit::Months);
        assert!("weeks".parse::<TermUnit>().is_err());
    }

    #[test]
    fn test_parse_extra_payments() {
        let payments = parse_extra_payments(&["3=1,000", "10 = 250.50", "12="]).unwrap();
        assert_eq!(payments.len(), 2);
        assert_eq!(payments[&3], dec!(1000));
        assert_eq!(payments[&10], dec!(250.50));
    }

    #[test]
    fn test_parse_extra_payments_rejects_bad_entries() {
        assert!(parse_extra_payments(&["0=100"]).is_err());
        assert!(parse_extra_payments(&["5=-1"]).is_err());
        assert!(parse_extra_payments(&["five=1"]).is_err());
        assert!(parse_extra_payments(&["100"]).is_err());
    }
}
