use clap::{Args, ValueEnum};
use log::info;
use serde_json::{json, Value};

use amortization_core::export;
use amortization_core::schedule::cumulative::{self, ChartBucket};
use amortization_core::schedule::engine::{self, ScheduleInput};
use amortization_core::terms::{self, ExtraPayments, LoanForm, TermUnit};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TermUnitArg {
    Years,
    Months,
}

impl From<TermUnitArg> for TermUnit {
    fn from(unit: TermUnitArg) -> Self {
        match unit {
            TermUnitArg::Years => TermUnit::Years,
            TermUnitArg::Months => TermUnit::Months,
        }
    }
}

/// Loan inputs shared by every schedule command
#[derive(Args)]
pub struct LoanArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal, e.g. "250,000.00"
    #[arg(long)]
    pub principal: Option<String>,

    /// Annual interest rate in percent, e.g. "6.5"
    #[arg(long)]
    pub rate: Option<String>,

    /// Term length, in --term-unit
    #[arg(long)]
    pub term: Option<String>,

    /// Unit of --term
    #[arg(long, value_enum, default_value = "years")]
    pub term_unit: TermUnitArg,

    /// One-time extra payment as PERIOD=AMOUNT (repeatable)
    #[arg(long = "extra", value_name = "PERIOD=AMOUNT")]
    pub extra: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BucketArg {
    Monthly,
    Yearly,
    Auto,
}

/// Arguments for the cumulative chart series
#[derive(Args)]
pub struct ChartArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Bucket size for the x axis
    #[arg(long, value_enum, default_value = "auto")]
    pub bucket: BucketArg,
}

/// Arguments for CSV export
#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Destination CSV file
    #[arg(long)]
    pub path: String,
}

/// Arguments for re-running against a previously exported schedule
#[derive(Args)]
pub struct RerunArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// CSV file produced by `export`; its one-time payments are reused
    #[arg(long)]
    pub from: String,

    /// Write the recomputed schedule back to --from
    #[arg(long)]
    pub save: bool,
}

/// Build the engine input: --input file, then flags, then piped stdin.
fn resolve_input(args: &LoanArgs) -> Result<ScheduleInput, Box<dyn std::error::Error>> {
    let mut schedule_input: ScheduleInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if args.principal.is_some() || args.rate.is_some() || args.term.is_some() {
        let form = LoanForm {
            principal: args
                .principal
                .clone()
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate: args
                .rate
                .clone()
                .ok_or("--rate is required (or provide --input)")?,
            term: args
                .term
                .clone()
                .ok_or("--term is required (or provide --input)")?,
            term_unit: args.term_unit.into(),
        };
        ScheduleInput::new(form.parse()?)
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--principal, --rate and --term (or --input <file.json> / stdin) required".into());
    };

    let extras = terms::parse_extra_payments(&args.extra)?;
    schedule_input.one_time_payments.extend(extras);
    Ok(schedule_input)
}

pub fn run_schedule(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input = resolve_input(&args)?;
    let result = engine::compute_schedule(&schedule_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_summary(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input = resolve_input(&args)?;
    let result = engine::compute_schedule(&schedule_input)?;
    Ok(json!({
        "result": result.result.summary,
        "methodology": result.methodology,
        "warnings": result.warnings,
    }))
}

pub fn run_chart(args: ChartArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input = resolve_input(&args.loan)?;
    let result = engine::compute_schedule(&schedule_input)?;

    let bucket = match args.bucket {
        BucketArg::Monthly => ChartBucket::Monthly,
        BucketArg::Yearly => ChartBucket::Yearly,
        BucketArg::Auto => ChartBucket::auto(schedule_input.loan.months),
    };
    let points = cumulative::cumulative_series(&result.result.rows, bucket);
    let axis = cumulative::axis_range(&points).map(|(x_min, x_max, y_max)| {
        json!({
            "x_title": bucket.axis_title(),
            "x_min": x_min,
            "x_max": x_max,
            "y_min": "0",
            "y_max": y_max,
        })
    });

    Ok(json!({
        "result": {
            "bucket": bucket,
            "axis": axis,
            "points": points,
        },
        "methodology": "Cumulative principal and interest paid",
        "warnings": result.warnings,
    }))
}

pub fn run_export(args: ExportArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input = resolve_input(&args.loan)?;
    let result = engine::compute_schedule(&schedule_input)?;
    export::export_schedule(&args.path, &result.result)?;
    info!("schedule written to {}", args.path);

    Ok(json!({
        "result": {
            "path": args.path,
            "rows_written": result.result.rows.len(),
            "monthly_payment": result.result.summary.monthly_payment,
            "payoff_period": result.result.summary.payoff_period,
        },
        "methodology": result.methodology,
        "warnings": result.warnings,
    }))
}

pub fn run_rerun(args: RerunArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let previous = export::import_schedule(&args.from)?;
    let mut recovered: ExtraPayments = export::extra_payments_from_rows(&previous);
    info!(
        "recovered {} one-time payment(s) from {}",
        recovered.len(),
        args.from
    );

    let mut schedule_input = resolve_input(&args.loan)?;
    // Payments given on this run take precedence over the file.
    recovered.append(&mut schedule_input.one_time_payments);
    schedule_input.one_time_payments = recovered;

    let result = engine::compute_schedule(&schedule_input)?;
    if args.save {
        export::export_schedule(&args.from, &result.result)?;
    }
    Ok(serde_json::to_value(result)?)
}
