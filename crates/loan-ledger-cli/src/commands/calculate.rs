use std::collections::BTreeMap;

use clap::Args;
use serde_json::Value;

use loan_ledger_core::record::{
    FieldName, ANNUAL_INTEREST_PCT, CITY_STATE, CUSTOMER_NAME, CUSTOMER_REFERENCE,
    DOWN_PAYMENT_PCT, GUARANTOR_NAME, GUARANTOR_REFERENCE, LOAN_PERIOD_YEARS,
    MONTHLY_PRINCIPAL_REDUCTION_PCT, PURCHASE_REDUCTION_PCT, PURCHASE_VALUE_WORDS,
    TOTAL_INTEREST_REDUCTION_PCT,
};
use loan_ledger_core::{CalculationConfig, LoanCalculator, RawLoanInput};

use crate::input;

/// Loan entry form fields
#[derive(Args, Debug, Clone, Default)]
pub struct LoanFormArgs {
    /// Path to JSON input file with the form fields (overrides individual flags and stdin)
    #[arg(long)]
    pub input: Option<String>,

    /// Customer reference number
    #[arg(long)]
    pub customer_ref: Option<String>,

    /// Customer name
    #[arg(long)]
    pub customer_name: Option<String>,

    /// City and state, e.g. "Austin, TX"
    #[arg(long)]
    pub city_state: Option<String>,

    /// Purchase value written in words
    #[arg(long)]
    pub purchase_value: Option<String>,

    /// Purchase value reduction (%)
    #[arg(long)]
    pub purchase_reduction: Option<String>,

    /// Down payment (%)
    #[arg(long)]
    pub down_payment: Option<String>,

    /// Loan period in years
    #[arg(long)]
    pub loan_period: Option<String>,

    /// Annual interest rate (%)
    #[arg(long)]
    pub annual_interest: Option<String>,

    /// Monthly principal reduction (%)
    #[arg(long)]
    pub monthly_principal_reduction: Option<String>,

    /// Total interest reduction (%)
    #[arg(long)]
    pub total_interest_reduction: Option<String>,

    /// Guarantor name
    #[arg(long)]
    pub guarantor_name: Option<String>,

    /// Guarantor reference number
    #[arg(long)]
    pub guarantor_ref: Option<String>,
}

impl LoanFormArgs {
    fn flag_fields(&self) -> BTreeMap<String, String> {
        let flags: [(FieldName, &Option<String>); 12] = [
            (CUSTOMER_REFERENCE, &self.customer_ref),
            (CUSTOMER_NAME, &self.customer_name),
            (CITY_STATE, &self.city_state),
            (PURCHASE_VALUE_WORDS, &self.purchase_value),
            (PURCHASE_REDUCTION_PCT, &self.purchase_reduction),
            (DOWN_PAYMENT_PCT, &self.down_payment),
            (LOAN_PERIOD_YEARS, &self.loan_period),
            (ANNUAL_INTEREST_PCT, &self.annual_interest),
            (MONTHLY_PRINCIPAL_REDUCTION_PCT, &self.monthly_principal_reduction),
            (TOTAL_INTEREST_REDUCTION_PCT, &self.total_interest_reduction),
            (GUARANTOR_NAME, &self.guarantor_name),
            (GUARANTOR_REFERENCE, &self.guarantor_ref),
        ];
        flags
            .into_iter()
            .filter_map(|(name, value)| value.clone().map(|v| (name.key.to_string(), v)))
            .collect()
    }

    /// Field text from `--input`, else the flags given, else piped stdin.
    pub fn into_fields(self) -> Result<BTreeMap<String, String>, Box<dyn std::error::Error>> {
        if let Some(ref path) = self.input {
            return fields_from_value(input::file::read_json_value(path)?);
        }
        let flags = self.flag_fields();
        if !flags.is_empty() {
            return Ok(flags);
        }
        match input::stdin::read_piped_json()? {
            Some(data) => fields_from_value(data),
            None => Ok(flags),
        }
    }

    pub fn into_raw(self) -> Result<RawLoanInput, Box<dyn std::error::Error>> {
        Ok(RawLoanInput::from_fields(&self.into_fields()?)?)
    }
}

/// Flatten a JSON object into field text. Numbers keep their literal form.
fn fields_from_value(value: Value) -> Result<BTreeMap<String, String>, Box<dyn std::error::Error>> {
    let Value::Object(map) = value else {
        return Err("Loan input must be a JSON object of field values".into());
    };

    let mut fields = BTreeMap::new();
    for (key, val) in map {
        let text = match val {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Null => continue,
            other => {
                return Err(format!("Field '{key}' must be text or a number, got {other}").into())
            }
        };
        fields.insert(key, text);
    }
    Ok(fields)
}

/// Arguments for a one-off loan calculation
#[derive(Args)]
pub struct CalculateArgs {
    #[command(flatten)]
    pub form: LoanFormArgs,
}

pub fn run_calculate(
    args: CalculateArgs,
    config: CalculationConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let raw = args.form.into_raw()?;
    let result = LoanCalculator::new(config).calculate_with_report(raw)?;
    Ok(serde_json::to_value(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fields_from_value_accepts_numbers_and_labels() {
        let fields = fields_from_value(json!({
            "Down Payment (%)": 20,
            "loan_period_years": "15",
            "annual_interest_pct": 4.75,
            "guarantor_name": null,
        }))
        .unwrap();
        assert_eq!(fields["Down Payment (%)"], "20");
        assert_eq!(fields["loan_period_years"], "15");
        assert_eq!(fields["annual_interest_pct"], "4.75");
        assert!(!fields.contains_key("guarantor_name"));
    }

    #[test]
    fn test_fields_from_value_rejects_nested_values() {
        assert!(fields_from_value(json!({ "customer_name": ["a"] })).is_err());
        assert!(fields_from_value(json!(["not", "an", "object"])).is_err());
    }

    #[test]
    fn test_flag_fields_use_machine_keys() {
        let args = LoanFormArgs {
            customer_ref: Some("AB 1".into()),
            down_payment: Some("20".into()),
            ..LoanFormArgs::default()
        };
        let fields = args.flag_fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["customer_reference"], "AB 1");
        assert_eq!(fields["down_payment_pct"], "20");
    }
}
