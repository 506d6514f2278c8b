use std::str::FromStr;

use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use loan_ledger_core::formatting::{
    format_city_state, format_currency, format_name, format_reference_number, NOT_APPLICABLE,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FieldKind {
    Reference,
    Name,
    CityState,
    Currency,
}

/// Arguments for rendering one value in the display layout
#[derive(Args)]
pub struct FormatArgs {
    /// Which formatter to apply
    pub kind: FieldKind,

    /// Raw value, e.g. "AB 123" or "1234567.5"
    #[arg(allow_hyphen_values = true)]
    pub value: String,
}

pub fn run_format(args: FormatArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let formatted = render(args.kind, &args.value);
    Ok(json!({ "formatted": formatted }))
}

fn render(kind: FieldKind, value: &str) -> String {
    match kind {
        FieldKind::Reference => format_reference_number(value),
        FieldKind::Name => format_name(value),
        FieldKind::CityState => format_city_state(value),
        FieldKind::Currency => match Decimal::from_str(value.trim()) {
            Ok(amount) => format_currency(amount),
            Err(_) => NOT_APPLICABLE.to_string(),
        },
    }
}
