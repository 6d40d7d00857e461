//! Amortization schedules: the period-by-period engine and the cumulative
//! series derived from it for charting.

pub mod cumulative;
pub mod engine;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::terms::{ExtraPayments, LoanParameters};
use crate::types::{Money, Years};

/// One period of the schedule. `period` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub period: u32,
    pub payment: Money,
    /// Scheduled principal portion, excluding any one-time payment.
    pub principal: Money,
    pub interest: Money,
    /// Remaining balance after the period, never negative.
    pub balance: Money,
    /// One-time payment actually applied in this period.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub one_time_payment: Option<Money>,
}

impl ScheduleRow {
    /// Placeholder for a period after the loan has been paid off.
    pub fn paid_off(period: u32) -> Self {
        Self {
            period,
            payment: Decimal::ZERO,
            principal: Decimal::ZERO,
            interest: Decimal::ZERO,
            balance: Decimal::ZERO,
            one_time_payment: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.payment.is_zero() && self.balance.is_zero() && self.one_time_payment.is_none()
    }
}

/// Totals derived from a full schedule run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    /// Fixed payment from the annuity formula.
    pub monthly_payment: Money,
    pub total_interest: Money,
    /// Sum of scheduled principal portions.
    pub total_principal: Money,
    pub total_one_time_payments: Money,
    /// Principal plus total interest.
    pub total_paid: Money,
    /// Period in which the balance reached zero.
    pub payoff_period: u32,
    pub payoff_years: Years,
    pub nominal_months: u32,
    /// Nominal term minus the payoff period.
    pub periods_saved: u32,
}

/// Full result of one calculation. Replaced wholesale on every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub parameters: LoanParameters,
    pub rows: Vec<ScheduleRow>,
    pub summary: ScheduleSummary,
    /// One-time payments as supplied, kept so a re-run reproduces them.
    pub one_time_payments: ExtraPayments,
}
