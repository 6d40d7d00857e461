//! Running totals of principal and interest for charting.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ScheduleRow;
use crate::types::Money;

const MONTHS_PER_YEAR: usize = 12;

/// Terms longer than this chart per year by default.
const AUTO_YEARLY_THRESHOLD: u32 = 24;

/// Granularity of the x axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartBucket {
    Monthly,
    Yearly,
}

impl ChartBucket {
    /// Pick a readable bucket for a term length.
    pub fn auto(months: u32) -> Self {
        if months > AUTO_YEARLY_THRESHOLD {
            ChartBucket::Yearly
        } else {
            ChartBucket::Monthly
        }
    }

    fn width(self) -> usize {
        match self {
            ChartBucket::Monthly => 1,
            ChartBucket::Yearly => MONTHS_PER_YEAR,
        }
    }

    pub fn axis_title(self) -> &'static str {
        match self {
            ChartBucket::Monthly => "Month",
            ChartBucket::Yearly => "Year",
        }
    }
}

/// Cumulative amounts at the end of one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CumulativePoint {
    /// 1-based month or year number.
    pub x: u32,
    pub cumulative_principal: Money,
    pub cumulative_interest: Money,
    pub cumulative_total: Money,
}

/// Cumulative principal, interest and total paid, one point per bucket.
///
/// Principal is the scheduled principal column; one-time payments are not
/// included. A yearly series ends with a partial year when the term is not
/// a whole number of years.
pub fn cumulative_series(rows: &[ScheduleRow], bucket: ChartBucket) -> Vec<CumulativePoint> {
    let mut principal = Decimal::ZERO;
    let mut interest = Decimal::ZERO;

    rows.chunks(bucket.width())
        .enumerate()
        .map(|(idx, chunk)| {
            for row in chunk {
                principal += row.principal;
                interest += row.interest;
            }
            CumulativePoint {
                x: idx as u32 + 1,
                cumulative_principal: principal,
                cumulative_interest: interest,
                cumulative_total: principal + interest,
            }
        })
        .collect()
}

/// Axis extents for a series: `(x_min, x_max, y_max)`.
pub fn axis_range(points: &[CumulativePoint]) -> Option<(u32, u32, Money)> {
    let first = points.first()?;
    let last = points.last()?;
    Some((first.x, last.x, last.cumulative_total))
}
