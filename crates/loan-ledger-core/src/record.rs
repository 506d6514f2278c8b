//! Loan record data model: raw form input, parsed terms, derived amounts and
//! the display strings assembled from them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CalculationError;
use crate::formatting::{
    format_city_state, format_currency, format_name, format_optional_currency, format_percent,
    format_reference_number, format_whole_percent, format_years, join_pair, NOT_APPLICABLE,
};
use crate::types::{Money, Percent, Rate, Years};
use crate::CalculationResult;

// ---------------------------------------------------------------------------
// Field names
// ---------------------------------------------------------------------------

/// Machine key and form label of one raw input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldName {
    pub key: &'static str,
    pub label: &'static str,
}

pub const CUSTOMER_REFERENCE: FieldName = FieldName {
    key: "customer_reference",
    label: "Customer Reference Number",
};
pub const CUSTOMER_NAME: FieldName = FieldName {
    key: "customer_name",
    label: "Customer Name",
};
pub const CITY_STATE: FieldName = FieldName {
    key: "city_state",
    label: "City, State",
};
pub const PURCHASE_VALUE_WORDS: FieldName = FieldName {
    key: "purchase_value_words",
    label: "Purchase Value (in words)",
};
pub const PURCHASE_REDUCTION_PCT: FieldName = FieldName {
    key: "purchase_reduction_pct",
    label: "Purchase Value Reduction (%)",
};
pub const DOWN_PAYMENT_PCT: FieldName = FieldName {
    key: "down_payment_pct",
    label: "Down Payment (%)",
};
pub const LOAN_PERIOD_YEARS: FieldName = FieldName {
    key: "loan_period_years",
    label: "Loan Period (Years)",
};
pub const ANNUAL_INTEREST_PCT: FieldName = FieldName {
    key: "annual_interest_pct",
    label: "Annual Interest Rate (%)",
};
pub const MONTHLY_PRINCIPAL_REDUCTION_PCT: FieldName = FieldName {
    key: "monthly_principal_reduction_pct",
    label: "Monthly Principal Reduction (%)",
};
pub const TOTAL_INTEREST_REDUCTION_PCT: FieldName = FieldName {
    key: "total_interest_reduction_pct",
    label: "Total Interest Reduction (%)",
};
pub const GUARANTOR_NAME: FieldName = FieldName {
    key: "guarantor_name",
    label: "Guarantor Name",
};
pub const GUARANTOR_REFERENCE: FieldName = FieldName {
    key: "guarantor_reference",
    label: "Guarantor Reference Number",
};

/// Raw input fields in form order.
pub const RAW_FIELDS: [FieldName; 12] = [
    CUSTOMER_REFERENCE,
    CUSTOMER_NAME,
    CITY_STATE,
    PURCHASE_VALUE_WORDS,
    PURCHASE_REDUCTION_PCT,
    DOWN_PAYMENT_PCT,
    LOAN_PERIOD_YEARS,
    ANNUAL_INTEREST_PCT,
    MONTHLY_PRINCIPAL_REDUCTION_PCT,
    TOTAL_INTEREST_REDUCTION_PCT,
    GUARANTOR_NAME,
    GUARANTOR_REFERENCE,
];

/// Display field labels in record order.
pub const DISPLAY_LABELS: [&str; 10] = [
    "Customer Reference Number",
    "Customer Name",
    "City, State",
    "Purchase Value and Down Payment",
    "Loan Period and Annual Interest",
    "Guarantor Name",
    "Guarantor Reference Number",
    "Loan amount and principal",
    "Total Interest for Loan Period and Property tax for Loan Period",
    "Property Insurance per month and PMI per annum",
];

// ---------------------------------------------------------------------------
// Raw input
// ---------------------------------------------------------------------------

/// Form submission exactly as typed. Numbers stay text until calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLoanInput {
    #[serde(alias = "Customer Reference Number")]
    pub customer_reference: String,
    #[serde(alias = "Customer Name")]
    pub customer_name: String,
    #[serde(alias = "City, State")]
    pub city_state: String,
    #[serde(alias = "Purchase Value (in words)")]
    pub purchase_value_words: String,
    #[serde(alias = "Purchase Value Reduction (%)")]
    pub purchase_reduction_pct: String,
    #[serde(alias = "Down Payment (%)")]
    pub down_payment_pct: String,
    #[serde(alias = "Loan Period (Years)")]
    pub loan_period_years: String,
    #[serde(alias = "Annual Interest Rate (%)")]
    pub annual_interest_pct: String,
    #[serde(alias = "Monthly Principal Reduction (%)")]
    pub monthly_principal_reduction_pct: String,
    #[serde(alias = "Total Interest Reduction (%)")]
    pub total_interest_reduction_pct: String,
    #[serde(alias = "Guarantor Name")]
    pub guarantor_name: String,
    #[serde(alias = "Guarantor Reference Number")]
    pub guarantor_reference: String,
}

impl RawLoanInput {
    /// Build from a key→text mapping keyed by either machine keys or form
    /// labels. Missing or blank entries are rejected.
    pub fn from_fields(fields: &BTreeMap<String, String>) -> CalculationResult<Self> {
        let take = |name: FieldName| -> CalculationResult<String> {
            fields
                .get(name.key)
                .or_else(|| fields.get(name.label))
                .filter(|v| !v.trim().is_empty())
                .cloned()
                .ok_or_else(|| CalculationError::Input {
                    field: name.key.into(),
                    reason: "required field is missing".into(),
                })
        };

        Ok(Self {
            customer_reference: take(CUSTOMER_REFERENCE)?,
            customer_name: take(CUSTOMER_NAME)?,
            city_state: take(CITY_STATE)?,
            purchase_value_words: take(PURCHASE_VALUE_WORDS)?,
            purchase_reduction_pct: take(PURCHASE_REDUCTION_PCT)?,
            down_payment_pct: take(DOWN_PAYMENT_PCT)?,
            loan_period_years: take(LOAN_PERIOD_YEARS)?,
            annual_interest_pct: take(ANNUAL_INTEREST_PCT)?,
            monthly_principal_reduction_pct: take(MONTHLY_PRINCIPAL_REDUCTION_PCT)?,
            total_interest_reduction_pct: take(TOTAL_INTEREST_REDUCTION_PCT)?,
            guarantor_name: take(GUARANTOR_NAME)?,
            guarantor_reference: take(GUARANTOR_REFERENCE)?,
        })
    }

    /// Field values paired with their names, in form order.
    pub fn entries(&self) -> [(FieldName, &str); 12] {
        [
            (CUSTOMER_REFERENCE, self.customer_reference.as_str()),
            (CUSTOMER_NAME, self.customer_name.as_str()),
            (CITY_STATE, self.city_state.as_str()),
            (PURCHASE_VALUE_WORDS, self.purchase_value_words.as_str()),
            (PURCHASE_REDUCTION_PCT, self.purchase_reduction_pct.as_str()),
            (DOWN_PAYMENT_PCT, self.down_payment_pct.as_str()),
            (LOAN_PERIOD_YEARS, self.loan_period_years.as_str()),
            (ANNUAL_INTEREST_PCT, self.annual_interest_pct.as_str()),
            (MONTHLY_PRINCIPAL_REDUCTION_PCT, self.monthly_principal_reduction_pct.as_str()),
            (TOTAL_INTEREST_REDUCTION_PCT, self.total_interest_reduction_pct.as_str()),
            (GUARANTOR_NAME, self.guarantor_name.as_str()),
            (GUARANTOR_REFERENCE, self.guarantor_reference.as_str()),
        ]
    }

    /// Inverse of [`RawLoanInput::from_fields`], keyed by machine key.
    pub fn to_fields(&self) -> BTreeMap<String, String> {
        self.entries()
            .iter()
            .map(|(name, value)| (name.key.to_string(), value.to_string()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Parsed terms and derived amounts
// ---------------------------------------------------------------------------

/// Numeric inputs after parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub purchase_value: Money,
    pub purchase_reduction_pct: Percent,
    pub down_payment_pct: Percent,
    pub loan_period_years: Years,
    pub annual_interest_pct: Percent,
    pub monthly_principal_reduction_pct: Percent,
    pub total_interest_reduction_pct: Percent,
}

/// Mortgage insurance outcome. `NotApplicable` is a valid result, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MortgageInsurance {
    Applicable { rate: Rate, annual: Money },
    NotApplicable,
}

impl MortgageInsurance {
    pub fn annual(&self) -> Option<Money> {
        match self {
            MortgageInsurance::Applicable { annual, .. } => Some(*annual),
            MortgageInsurance::NotApplicable => None,
        }
    }

    pub fn is_applicable(&self) -> bool {
        matches!(self, MortgageInsurance::Applicable { .. })
    }
}

/// Every figure the pipeline produces. Money fields carry two decimals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedAmounts {
    pub purchase_value: Money,
    pub purchase_reduction_amount: Money,
    pub purchase_value_after_reduction: Money,
    pub down_payment_amount: Money,
    pub loan_amount: Money,
    pub annual_principal: Money,
    pub monthly_principal: Money,
    pub reduced_monthly_principal: Money,
    pub annual_interest: Money,
    pub total_interest: Money,
    pub reduced_total_interest: Money,
    pub loan_to_value_pct: Percent,
    pub property_insurance_rate: Rate,
    pub property_insurance_annual: Money,
    pub property_insurance_monthly: Money,
    pub mortgage_insurance: MortgageInsurance,
}

// ---------------------------------------------------------------------------
// Display fields
// ---------------------------------------------------------------------------

/// Rendered strings shown and stored for a record, in fixed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayFields {
    pub customer_reference: String,
    pub customer_name: String,
    pub city_state: String,
    pub purchase_value_and_down_payment: String,
    pub loan_period_and_annual_interest: String,
    pub guarantor_name: String,
    pub guarantor_reference: String,
    pub loan_amount_and_principal: String,
    pub total_interest_and_property_tax: String,
    pub property_insurance_and_mortgage_insurance: String,
}

impl DisplayFields {
    pub fn render(raw: &RawLoanInput, terms: &LoanTerms, amounts: &DerivedAmounts) -> Self {
        Self {
            customer_reference: format_reference_number(&raw.customer_reference),
            customer_name: format_name(&raw.customer_name),
            city_state: format_city_state(&raw.city_state),
            purchase_value_and_down_payment: join_pair(
                &format_currency(amounts.purchase_value_after_reduction),
                &format_whole_percent(terms.down_payment_pct),
            ),
            loan_period_and_annual_interest: join_pair(
                &format_years(terms.loan_period_years),
                &format_percent(terms.annual_interest_pct),
            ),
            guarantor_name: format_name(&raw.guarantor_name),
            guarantor_reference: format_reference_number(&raw.guarantor_reference),
            loan_amount_and_principal: join_pair(
                &format_currency(amounts.loan_amount),
                &format_currency(amounts.reduced_monthly_principal),
            ),
            // Property tax is not computed; the slot is always "NA".
            total_interest_and_property_tax: join_pair(
                &format_currency(amounts.reduced_total_interest),
                NOT_APPLICABLE,
            ),
            property_insurance_and_mortgage_insurance: join_pair(
                &format_currency(amounts.property_insurance_monthly),
                &format_optional_currency(amounts.mortgage_insurance.annual()),
            ),
        }
    }

    /// Values in record order, paired with [`DISPLAY_LABELS`].
    pub fn labelled(&self) -> [(&'static str, &str); 10] {
        let values = [
            self.customer_reference.as_str(),
            self.customer_name.as_str(),
            self.city_state.as_str(),
            self.purchase_value_and_down_payment.as_str(),
            self.loan_period_and_annual_interest.as_str(),
            self.guarantor_name.as_str(),
            self.guarantor_reference.as_str(),
            self.loan_amount_and_principal.as_str(),
            self.total_interest_and_property_tax.as_str(),
            self.property_insurance_and_mortgage_insurance.as_str(),
        ];
        std::array::from_fn(|i| (DISPLAY_LABELS[i], values[i]))
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One calculated loan entry. Replaced wholesale on edit, never patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub raw: RawLoanInput,
    pub terms: LoanTerms,
    pub amounts: DerivedAmounts,
    pub display: DisplayFields,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fields() -> BTreeMap<String, String> {
        RAW_FIELDS
            .iter()
            .map(|f| (f.label.to_string(), format!("value for {}", f.key)))
            .collect()
    }

    #[test]
    fn test_from_fields_accepts_form_labels() {
        let raw = RawLoanInput::from_fields(&sample_fields()).unwrap();
        assert_eq!(raw.customer_name, "value for customer_name");
        assert_eq!(raw.guarantor_reference, "value for guarantor_reference");
    }

    #[test]
    fn test_from_fields_round_trips_through_keys() {
        let raw = RawLoanInput::from_fields(&sample_fields()).unwrap();
        let again = RawLoanInput::from_fields(&raw.to_fields()).unwrap();
        assert_eq!(raw, again);
    }

    #[test]
    fn test_from_fields_missing_is_input_error() {
        let mut fields = sample_fields();
        fields.remove(DOWN_PAYMENT_PCT.label);
        let err = RawLoanInput::from_fields(&fields).unwrap_err();
        assert_eq!(err.field(), "down_payment_pct");
        assert!(matches!(err, CalculationError::Input { .. }));
    }

    #[test]
    fn test_from_fields_blank_is_missing() {
        let mut fields = sample_fields();
        fields.insert(LOAN_PERIOD_YEARS.label.to_string(), "   ".into());
        let err = RawLoanInput::from_fields(&fields).unwrap_err();
        assert_eq!(err.field(), "loan_period_years");
    }

    #[test]
    fn test_serde_accepts_labels_as_aliases() {
        let json = serde_json::json!({
            "Customer Reference Number": "AB 1",
            "Customer Name": "a",
            "City, State": "b",
            "Purchase Value (in words)": "one",
            "Purchase Value Reduction (%)": "0",
            "Down Payment (%)": "0",
            "Loan Period (Years)": "1",
            "Annual Interest Rate (%)": "0",
            "Monthly Principal Reduction (%)": "0",
            "Total Interest Reduction (%)": "0",
            "Guarantor Name": "c",
            "Guarantor Reference Number": "d",
        });
        let raw: RawLoanInput = serde_json::from_value(json).unwrap();
        assert_eq!(raw.customer_reference, "AB 1");
        assert_eq!(raw.loan_period_years, "1");
    }

    #[test]
    fn test_mortgage_insurance_annual() {
        use rust_decimal_macros::dec;
        let mi = MortgageInsurance::Applicable {
            rate: dec!(0.0019),
            annual: dec!(152.00),
        };
        assert_eq!(mi.annual(), Some(dec!(152.00)));
        assert!(mi.is_applicable());
        assert_eq!(MortgageInsurance::NotApplicable.annual(), None);
    }
}
