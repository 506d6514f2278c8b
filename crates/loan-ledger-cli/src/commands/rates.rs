use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use loan_ledger_core::formatting::NOT_APPLICABLE;
use loan_ledger_core::CalculationConfig;

/// Arguments for an insurance rate lookup
#[derive(Args)]
pub struct RatesArgs {
    /// Loan-to-value in percent, e.g. 85.01
    #[arg(long)]
    pub ltv: Decimal,

    /// Loan term in years
    #[arg(long)]
    pub term: Decimal,
}

pub fn run_rates(
    args: RatesArgs,
    config: CalculationConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    if args.ltv.is_sign_negative() {
        return Err("--ltv must not be negative".into());
    }
    if args.term <= Decimal::ZERO {
        return Err("--term must be greater than zero".into());
    }

    let table = &config.rate_table;
    let property = table.property_insurance_rate(args.ltv);
    let mortgage = table
        .mortgage_insurance_rate(args.ltv, args.term)
        .map(|rate| rate.to_string())
        .unwrap_or_else(|| NOT_APPLICABLE.to_string());

    Ok(json!({
        "loan_to_value_pct": args.ltv.to_string(),
        "term_years": args.term.to_string(),
        "property_insurance_rate": property.to_string(),
        "mortgage_insurance_rate": mortgage,
    }))
}
