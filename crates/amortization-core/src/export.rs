//! CSV export and re-import of a schedule.
//!
//! Layout: a header row `Payment #,Payment,Principal,Interest,Balance,One-Time Payment`
//! followed by one row per period. Currency columns carry exactly two
//! decimals. The one-time payment cell holds the amount as entered, even
//! when the engine applied less or ignored it after payoff, so a re-import
//! recovers what the user typed. It is blank when nothing was entered.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;

use log::{debug, error};

use crate::error::AmortizationError;
use crate::schedule::{AmortizationSchedule, ScheduleRow};
use crate::terms::ExtraPayments;
use crate::types::{round_currency, Money, CURRENCY_DP};
use crate::AmortizationResult;

/// Column headers, in order.
pub const HEADERS: [&str; 6] = [
    "Payment #",
    "Payment",
    "Principal",
    "Interest",
    "Balance",
    "One-Time Payment",
];

fn format_cell(amount: Money) -> String {
    let mut cell = round_currency(amount);
    cell.rescale(CURRENCY_DP);
    cell.to_string()
}

fn to_record(row: &ScheduleRow, entered: Option<Money>) -> [String; 6] {
    [
        row.period.to_string(),
        format_cell(row.payment),
        format_cell(row.principal),
        format_cell(row.interest),
        format_cell(row.balance),
        entered
            .filter(|amount| *amount > Money::ZERO)
            .map(format_cell)
            .unwrap_or_default(),
    ]
}

fn parse_cell(record: &csv::StringRecord, idx: usize, line: u64) -> AmortizationResult<Money> {
    let text = record.get(idx).unwrap_or_default();
    Money::from_str(text).map_err(|_| {
        AmortizationError::Import(format!(
            "line {line}: '{text}' in column '{}' is not a number",
            HEADERS[idx]
        ))
    })
}

fn from_record(record: &csv::StringRecord, line: u64) -> AmortizationResult<ScheduleRow> {
    let period = record
        .get(0)
        .unwrap_or_default()
        .parse::<u32>()
        .map_err(|_| AmortizationError::Import(format!("line {line}: bad payment number")))?;
    let one_time_payment = match record.get(5).unwrap_or_default() {
        "" => None,
        _ => Some(parse_cell(record, 5, line)?),
    };
    Ok(ScheduleRow {
        period,
        payment: parse_cell(record, 1, line)?,
        principal: parse_cell(record, 2, line)?,
        interest: parse_cell(record, 3, line)?,
        balance: parse_cell(record, 4, line)?,
        one_time_payment,
    })
}

/// Write the schedule as CSV to any writer.
pub fn write_schedule<W: Write>(writer: W, schedule: &AmortizationSchedule) -> AmortizationResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    wtr.write_record(HEADERS)?;
    for row in &schedule.rows {
        let entered = schedule.one_time_payments.get(&row.period).copied();
        wtr.write_record(to_record(row, entered))?;
    }
    wtr.flush()
        .map_err(|e| AmortizationError::Csv(format!("flush failed: {e}")))?;
    Ok(())
}

/// Export the schedule to a file, replacing any existing content.
pub fn export_schedule(
    path: impl AsRef<Path>,
    schedule: &AmortizationSchedule,
) -> AmortizationResult<()> {
    let path = path.as_ref();
    let export_err = |source: std::io::Error| AmortizationError::Export {
        path: path.display().to_string(),
        source,
    };

    let file = File::create(path).map_err(|e| {
        error!("cannot open {} for writing: {e}", path.display());
        export_err(e)
    })?;
    write_schedule(file, schedule).map_err(|e| match e {
        AmortizationError::Csv(msg) => export_err(std::io::Error::other(msg)),
        other => other,
    })?;
    debug!("exported {} rows to {}", schedule.rows.len(), path.display());
    Ok(())
}

/// Parse a previously exported schedule.
///
/// `one_time_payment` on the returned rows is the entered amount from the
/// file, not necessarily what the engine applied.
pub fn read_schedule<R: Read>(reader: R) -> AmortizationResult<Vec<ScheduleRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    if headers.iter().ne(HEADERS.iter().copied()) {
        return Err(AmortizationError::Import(format!(
            "unexpected header row '{}'",
            headers.iter().collect::<Vec<_>>().join(",")
        )));
    }

    let mut rows = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        let record = record?;
        if record.len() != HEADERS.len() {
            return Err(AmortizationError::Import(format!(
                "row {} has {} columns, expected {}",
                idx + 1,
                record.len(),
                HEADERS.len()
            )));
        }
        // Header is line 1.
        let row = from_record(&record, idx as u64 + 2)?;
        let expected = idx as u32 + 1;
        if row.period != expected {
            return Err(AmortizationError::Import(format!(
                "row {expected} is numbered {}",
                row.period
            )));
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Read a schedule from a CSV file.
pub fn import_schedule(path: impl AsRef<Path>) -> AmortizationResult<Vec<ScheduleRow>> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| AmortizationError::Import(format!("cannot open '{}': {e}", path.display())))?;
    read_schedule(file)
}

/// One-time payments recorded in a schedule, for feeding back into a re-run.
pub fn extra_payments_from_rows(rows: &[ScheduleRow]) -> ExtraPayments {
    rows.iter()
        .filter_map(|row| row.one_time_payment.map(|amount| (row.period, amount)))
        .collect()
}
