//! Loan figure derivation.
//!
//! Parses the raw form text, then runs the fixed sequence of decimal steps
//! with a rounding to two places after each monetary step. No step reads an
//! unrounded predecessor.

use std::str::FromStr;
use std::time::Instant;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, warn};

use crate::config::CalculationConfig;
use crate::error::CalculationError;
use crate::record::{
    DerivedAmounts, DisplayFields, FieldName, LoanRecord, LoanTerms, MortgageInsurance,
    RawLoanInput, ANNUAL_INTEREST_PCT, DOWN_PAYMENT_PCT, LOAN_PERIOD_YEARS,
    MONTHLY_PRINCIPAL_REDUCTION_PCT, PURCHASE_REDUCTION_PCT, PURCHASE_VALUE_WORDS,
    TOTAL_INTEREST_REDUCTION_PCT,
};
use crate::types::{with_metadata, ComputationOutput, Percent};
use crate::words::WordNumberParser;
use crate::CalculationResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Largest purchase value accepted (one quadrillion).
const MAX_PURCHASE_VALUE: Decimal = dec!(1_000_000_000_000_000);

const MAX_LOAN_PERIOD_YEARS: Decimal = dec!(100);

/// Shortest loan period accepted; keeps loan / period inside decimal range.
const MIN_LOAN_PERIOD_YEARS: Decimal = dec!(0.01);

const MAX_ANNUAL_INTEREST_PCT: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

/// Runs the loan pipeline under one [`CalculationConfig`].
#[derive(Debug, Clone, Default)]
pub struct LoanCalculator {
    config: CalculationConfig,
}

impl LoanCalculator {
    pub fn new(config: CalculationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CalculationConfig {
        &self.config
    }

    fn word_parser(&self) -> WordNumberParser {
        WordNumberParser::new(self.config.word_mode, self.config.unknown_words)
    }

    /// Calculate a record stamped with the current time.
    pub fn calculate(&self, raw: RawLoanInput) -> CalculationResult<LoanRecord> {
        self.calculate_at(raw, Utc::now())
    }

    /// Calculate a record with an explicit creation time.
    pub fn calculate_at(
        &self,
        raw: RawLoanInput,
        created_at: DateTime<Utc>,
    ) -> CalculationResult<LoanRecord> {
        let (record, _) = self.build(raw, created_at)?;
        Ok(record)
    }

    /// Calculate a record wrapped in the standard output envelope, with
    /// warnings for ignored amount words and absent mortgage insurance.
    pub fn calculate_with_report(
        &self,
        raw: RawLoanInput,
    ) -> CalculationResult<ComputationOutput<LoanRecord>> {
        let start = Instant::now();
        let (record, mut warnings) = self.build(raw, Utc::now())?;

        if !record.amounts.mortgage_insurance.is_applicable() {
            warnings.push(format!(
                "Mortgage insurance not applicable at {}% loan-to-value",
                record.amounts.loan_to_value_pct.normalize()
            ));
        }

        let elapsed = start.elapsed().as_micros() as u64;
        Ok(with_metadata(
            "Loan figure derivation (two-place rounding per step)",
            &self.config,
            warnings,
            elapsed,
            record,
        ))
    }

    /// Derived amounts only, without display rendering.
    pub fn derive(&self, raw: &RawLoanInput) -> CalculationResult<DerivedAmounts> {
        let (terms, _) = self.parse_terms(raw)?;
        self.derive_amounts(&terms)
    }

    fn build(
        &self,
        raw: RawLoanInput,
        created_at: DateTime<Utc>,
    ) -> CalculationResult<(LoanRecord, Vec<String>)> {
        let (terms, warnings) = self.parse_terms(&raw)?;
        let amounts = self.derive_amounts(&terms)?;
        let display = DisplayFields::render(&raw, &terms, &amounts);

        debug!(
            loan_amount = %amounts.loan_amount,
            ltv = %amounts.loan_to_value_pct,
            "loan record calculated"
        );

        Ok((
            LoanRecord {
                raw,
                terms,
                amounts,
                display,
                created_at,
            },
            warnings,
        ))
    }

    // -----------------------------------------------------------------------
    // Input parsing and validation
    // -----------------------------------------------------------------------

    /// Parse and validate every numeric input. Any failure rejects the whole
    /// calculation.
    pub fn parse_terms(&self, raw: &RawLoanInput) -> CalculationResult<(LoanTerms, Vec<String>)> {
        let mut warnings = Vec::new();

        for (name, value) in raw.entries() {
            require(name, value)?;
        }

        let parsed = self
            .word_parser()
            .parse_detailed(&raw.purchase_value_words)
            .map_err(|source| CalculationError::Parse {
                field: PURCHASE_VALUE_WORDS.key.into(),
                source,
            })?;
        if !parsed.ignored_words.is_empty() {
            warn!(
                words = ?parsed.ignored_words,
                "ignored unrecognised words in purchase value"
            );
            warnings.push(format!(
                "Ignored unrecognised words in purchase value: {}",
                parsed.ignored_words.join(", ")
            ));
        }
        if parsed.value > MAX_PURCHASE_VALUE {
            return Err(CalculationError::Range {
                field: PURCHASE_VALUE_WORDS.key.into(),
                reason: format!("Purchase value must not exceed {MAX_PURCHASE_VALUE}"),
            });
        }

        let purchase_reduction_pct =
            parse_percent(PURCHASE_REDUCTION_PCT, &raw.purchase_reduction_pct, true)?;
        let down_payment_pct = parse_percent(DOWN_PAYMENT_PCT, &raw.down_payment_pct, true)?;
        let annual_interest_pct =
            parse_percent(ANNUAL_INTEREST_PCT, &raw.annual_interest_pct, false)?;
        if annual_interest_pct > MAX_ANNUAL_INTEREST_PCT {
            return Err(CalculationError::Range {
                field: ANNUAL_INTEREST_PCT.key.into(),
                reason: format!("Annual interest must not exceed {MAX_ANNUAL_INTEREST_PCT}%"),
            });
        }
        let monthly_principal_reduction_pct = parse_percent(
            MONTHLY_PRINCIPAL_REDUCTION_PCT,
            &raw.monthly_principal_reduction_pct,
            true,
        )?;
        let total_interest_reduction_pct = parse_percent(
            TOTAL_INTEREST_REDUCTION_PCT,
            &raw.total_interest_reduction_pct,
            true,
        )?;

        let loan_period_years = parse_decimal(LOAN_PERIOD_YEARS, &raw.loan_period_years)?;
        if loan_period_years <= Decimal::ZERO {
            return Err(CalculationError::Input {
                field: LOAN_PERIOD_YEARS.key.into(),
                reason: "Loan period must be positive".into(),
            });
        }
        if loan_period_years < MIN_LOAN_PERIOD_YEARS {
            return Err(CalculationError::Range {
                field: LOAN_PERIOD_YEARS.key.into(),
                reason: format!("Loan period must be at least {MIN_LOAN_PERIOD_YEARS} years"),
            });
        }
        if loan_period_years > MAX_LOAN_PERIOD_YEARS {
            return Err(CalculationError::Range {
                field: LOAN_PERIOD_YEARS.key.into(),
                reason: format!("Loan period must not exceed {MAX_LOAN_PERIOD_YEARS} years"),
            });
        }

        Ok((
            LoanTerms {
                purchase_value: parsed.value,
                purchase_reduction_pct,
                down_payment_pct,
                loan_period_years,
                annual_interest_pct,
                monthly_principal_reduction_pct,
                total_interest_reduction_pct,
            },
            warnings,
        ))
    }

    // -----------------------------------------------------------------------
    // Pipeline
    // -----------------------------------------------------------------------

    /// Run the rounding pipeline over already validated terms. Steps that
    /// scale by the loan period fail with a range error instead of
    /// overflowing.
    pub fn derive_amounts(&self, terms: &LoanTerms) -> CalculationResult<DerivedAmounts> {
        let rounding = self.config.rounding;
        let round = |value: Decimal| rounding.round(value);
        let table = &self.config.rate_table;

        // Purchase value and down payment
        let purchase = self.config.purchase_reduction.apply(
            terms.purchase_value,
            terms.purchase_reduction_pct,
            rounding,
        );
        let purchase_value_after_reduction = purchase.remaining;
        let down_payment_amount =
            round(purchase_value_after_reduction * terms.down_payment_pct / Decimal::ONE_HUNDRED);
        let loan_amount = purchase_value_after_reduction - down_payment_amount;

        // Principal
        let annual_principal = round(
            loan_amount
                .checked_div(terms.loan_period_years)
                .ok_or_else(period_overflow)?,
        );
        let monthly_principal = round(annual_principal / MONTHS_PER_YEAR);
        let reduced_monthly_principal = self
            .config
            .payment_reduction
            .apply(monthly_principal, terms.monthly_principal_reduction_pct, rounding)
            .remaining;

        // Interest
        let annual_interest = round(loan_amount * terms.annual_interest_pct / Decimal::ONE_HUNDRED);
        let total_interest = round(
            annual_interest
                .checked_mul(terms.loan_period_years)
                .ok_or_else(period_overflow)?,
        );
        let reduced_total_interest = self
            .config
            .payment_reduction
            .apply(total_interest, terms.total_interest_reduction_pct, rounding)
            .remaining;

        // Insurance
        let loan_to_value_pct =
            (Decimal::ONE - terms.down_payment_pct / Decimal::ONE_HUNDRED) * Decimal::ONE_HUNDRED;
        let property_insurance_rate = table.property_insurance_rate(loan_to_value_pct);
        let property_insurance_annual = round(loan_amount * property_insurance_rate);
        let property_insurance_monthly = round(property_insurance_annual / MONTHS_PER_YEAR);

        let mortgage_insurance = match table
            .mortgage_insurance_rate(loan_to_value_pct, terms.loan_period_years)
        {
            Some(rate) => MortgageInsurance::Applicable {
                rate,
                annual: round(loan_amount * rate),
            },
            None => MortgageInsurance::NotApplicable,
        };

        Ok(DerivedAmounts {
            purchase_value: terms.purchase_value,
            purchase_reduction_amount: purchase.removed,
            purchase_value_after_reduction,
            down_payment_amount,
            loan_amount,
            annual_principal,
            monthly_principal,
            reduced_monthly_principal,
            annual_interest,
            total_interest,
            reduced_total_interest,
            loan_to_value_pct,
            property_insurance_rate,
            property_insurance_annual,
            property_insurance_monthly,
            mortgage_insurance,
        })
    }
}

/// Calculate with the default configuration.
pub fn calculate(raw: RawLoanInput) -> CalculationResult<LoanRecord> {
    LoanCalculator::default().calculate(raw)
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn require(name: FieldName, value: &str) -> CalculationResult<()> {
    if value.trim().is_empty() {
        return Err(CalculationError::Input {
            field: name.key.into(),
            reason: "required field is missing".into(),
        });
    }
    Ok(())
}

fn period_overflow() -> CalculationError {
    CalculationError::Range {
        field: LOAN_PERIOD_YEARS.key.into(),
        reason: "Loan period puts the calculation outside decimal range".into(),
    }
}

fn parse_decimal(name: FieldName, value: &str) -> CalculationResult<Decimal> {
    let text = value.trim();
    let text = text.strip_suffix('%').map(str::trim_end).unwrap_or(text);
    Decimal::from_str(text).map_err(|_| CalculationError::Input {
        field: name.key.into(),
        reason: format!("'{}' is not a number", value.trim()),
    })
}

/// Parse a percentage; reductions and shares are capped at 100.
fn parse_percent(name: FieldName, value: &str, capped: bool) -> CalculationResult<Percent> {
    let pct = parse_decimal(name, value)?;
    if pct < Decimal::ZERO {
        return Err(CalculationError::Range {
            field: name.key.into(),
            reason: "Percentage cannot be negative".into(),
        });
    }
    if capped && pct > Decimal::ONE_HUNDRED {
        return Err(CalculationError::Range {
            field: name.key.into(),
            reason: "Percentage cannot exceed 100".into(),
        });
    }
    Ok(pct)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ReductionSemantics, RoundingMode};
    use rust_decimal_macros::dec;

    fn raw(words: &str, reduction: &str, down: &str, years: &str, interest: &str) -> RawLoanInput {
        RawLoanInput {
            customer_reference: "AB 123".into(),
            customer_name: "jane q public".into(),
            city_state: "Austin, TX".into(),
            purchase_value_words: words.into(),
            purchase_reduction_pct: reduction.into(),
            down_payment_pct: down.into(),
            loan_period_years: years.into(),
            annual_interest_pct: interest.into(),
            monthly_principal_reduction_pct: "100".into(),
            total_interest_reduction_pct: "100".into(),
            guarantor_name: "john doe".into(),
            guarantor_reference: "G77".into(),
        }
    }

    fn standard() -> RawLoanInput {
        raw("one hundred thousand dollars", "10", "20", "15", "5")
    }

    #[test]
    fn test_pipeline_hand_traced() {
        let a = LoanCalculator::default().derive(&standard()).unwrap();
        assert_eq!(a.purchase_value, dec!(100000));
        assert_eq!(a.purchase_reduction_amount, dec!(10000.00));
        assert_eq!(a.purchase_value_after_reduction, dec!(90000.00));
        assert_eq!(a.down_payment_amount, dec!(18000.00));
        assert_eq!(a.loan_amount, dec!(72000.00));
        assert_eq!(a.annual_principal, dec!(4800.00));
        assert_eq!(a.monthly_principal, dec!(400.00));
        assert_eq!(a.reduced_monthly_principal, dec!(400.00));
        assert_eq!(a.annual_interest, dec!(3600.00));
        assert_eq!(a.total_interest, dec!(54000.00));
        assert_eq!(a.reduced_total_interest, dec!(54000.00));
        assert_eq!(a.loan_to_value_pct, dec!(80));
        assert_eq!(a.property_insurance_rate, dec!(0.0032));
        // 72000 * 0.0032 = 230.40; / 12 = 19.20
        assert_eq!(a.property_insurance_annual, dec!(230.40));
        assert_eq!(a.property_insurance_monthly, dec!(19.20));
        assert_eq!(a.mortgage_insurance, MortgageInsurance::NotApplicable);
    }

    #[test]
    fn test_each_step_rounds_before_the_next() {
        // 123457 * 7% = 8641.99; after = 114815.01
        // down 13% = 14925.9513 -> 14925.95; loan = 99889.06
        // annual principal /7 = 14269.865714.. -> 14269.87
        // monthly /12 = 1189.1558.. -> 1189.16
        let input = raw(
            "one hundred twenty three thousand four hundred fifty seven",
            "7",
            "13",
            "7",
            "3.3",
        );
        let a = LoanCalculator::default().derive(&input).unwrap();
        assert_eq!(a.purchase_reduction_amount, dec!(8641.99));
        assert_eq!(a.purchase_value_after_reduction, dec!(114815.01));
        assert_eq!(a.down_payment_amount, dec!(14925.95));
        assert_eq!(a.loan_amount, dec!(99889.06));
        assert_eq!(a.annual_principal, dec!(14269.87));
        assert_eq!(a.monthly_principal, dec!(1189.16));
        // 99889.06 * 3.3% = 3296.33898 -> 3296.34; * 7 = 23074.38
        assert_eq!(a.annual_interest, dec!(3296.34));
        assert_eq!(a.total_interest, dec!(23074.38));
        // LTV 87 -> 0.41% property, 0.23% mortgage (term <= 20)
        assert_eq!(a.property_insurance_annual, dec!(409.55));
        assert_eq!(a.property_insurance_monthly, dec!(34.13));
        assert_eq!(
            a.mortgage_insurance,
            MortgageInsurance::Applicable {
                rate: dec!(0.0023),
                annual: dec!(229.74)
            }
        );
    }

    #[test]
    fn test_truncate_rounding_mode() {
        let config = CalculationConfig {
            rounding: RoundingMode::Truncate,
            ..CalculationConfig::default()
        };
        let input = raw("one thousand", "0", "0", "7", "0");
        let a = LoanCalculator::new(config).derive(&input).unwrap();
        // 1000 / 7 = 142.857.. -> 142.85 ; / 12 = 11.904.. -> 11.90
        assert_eq!(a.annual_principal, dec!(142.85));
        assert_eq!(a.monthly_principal, dec!(11.90));

        let half_even = LoanCalculator::default().derive(&input).unwrap();
        assert_eq!(half_even.annual_principal, dec!(142.86));
        // 142.86 / 12 = 11.905 exactly; the midpoint goes to the even digit
        assert_eq!(half_even.monthly_principal, dec!(11.90));
    }

    #[test]
    fn test_keep_semantics_for_purchase_reduction() {
        let config = CalculationConfig {
            purchase_reduction: ReductionSemantics::Keep,
            ..CalculationConfig::default()
        };
        let a = LoanCalculator::new(config).derive(&standard()).unwrap();
        assert_eq!(a.purchase_value_after_reduction, dec!(10000.00));
        assert_eq!(a.purchase_reduction_amount, dec!(90000.00));
        assert_eq!(a.loan_amount, dec!(8000.00));
    }

    #[test]
    fn test_reduce_by_semantics_for_payments() {
        let config = CalculationConfig {
            payment_reduction: ReductionSemantics::ReduceBy,
            ..CalculationConfig::default()
        };
        let mut input = standard();
        input.monthly_principal_reduction_pct = "25".into();
        input.total_interest_reduction_pct = "10".into();
        let a = LoanCalculator::new(config).derive(&input).unwrap();
        assert_eq!(a.reduced_monthly_principal, dec!(300.00));
        assert_eq!(a.reduced_total_interest, dec!(48600.00));
    }

    #[test]
    fn test_zero_period_is_input_error() {
        let err = LoanCalculator::default()
            .derive(&raw("one thousand", "0", "0", "0", "5"))
            .unwrap_err();
        assert_eq!(err.field(), "loan_period_years");
        assert!(matches!(err, CalculationError::Input { .. }));
    }

    #[test]
    fn test_tiny_period_is_range_error() {
        let err = LoanCalculator::default()
            .derive(&raw("nine hundred trillion", "0", "0", "0.00000000000000000001", "5"))
            .unwrap_err();
        assert!(matches!(err, CalculationError::Range { .. }));
        assert_eq!(err.field(), "loan_period_years");

        let err = calculate(raw("one thousand", "0", "0", "0.009", "5")).unwrap_err();
        assert!(matches!(err, CalculationError::Range { .. }));
        assert!(LoanCalculator::default()
            .derive(&raw("one thousand", "0", "0", "0.01", "5"))
            .is_ok());
    }

    #[test]
    fn test_unvalidated_tiny_period_does_not_overflow() {
        let terms = LoanTerms {
            purchase_value: dec!(900_000_000_000_000),
            purchase_reduction_pct: dec!(0),
            down_payment_pct: dec!(0),
            loan_period_years: dec!(0.00000000000000000001),
            annual_interest_pct: dec!(5),
            monthly_principal_reduction_pct: dec!(100),
            total_interest_reduction_pct: dec!(100),
        };
        let err = LoanCalculator::default().derive_amounts(&terms).unwrap_err();
        assert!(matches!(err, CalculationError::Range { .. }));
        assert_eq!(err.field(), "loan_period_years");
    }

    #[test]
    fn test_interest_above_cap_is_range_error() {
        let err = LoanCalculator::default()
            .derive(&raw("one thousand", "0", "0", "10", "100.01"))
            .unwrap_err();
        assert!(matches!(err, CalculationError::Range { .. }));
        assert_eq!(err.field(), "annual_interest_pct");
        assert!(LoanCalculator::default()
            .derive(&raw("one thousand", "0", "0", "10", "100"))
            .is_ok());
    }

    #[test]
    fn test_purchase_value_above_cap_is_range_error() {
        let err = LoanCalculator::default()
            .derive(&raw("one hundred hundred trillion", "0", "0", "10", "5"))
            .unwrap_err();
        assert!(matches!(err, CalculationError::Range { .. }));
        assert_eq!(err.field(), "purchase_value_words");
        assert!(LoanCalculator::default()
            .derive(&raw("nine hundred trillion", "0", "0", "10", "5"))
            .is_ok());
    }

    #[test]
    fn test_non_numeric_is_input_error() {
        let err = LoanCalculator::default()
            .derive(&raw("one thousand", "ten", "0", "10", "5"))
            .unwrap_err();
        assert_eq!(err.field(), "purchase_reduction_pct");
        assert!(matches!(err, CalculationError::Input { .. }));
    }

    #[test]
    fn test_blank_name_is_input_error() {
        let mut input = standard();
        input.customer_name = "  ".into();
        let err = LoanCalculator::default().derive(&input).unwrap_err();
        assert_eq!(err.field(), "customer_name");
    }

    #[test]
    fn test_negative_and_oversized_percentages_are_range_errors() {
        let err = LoanCalculator::default()
            .derive(&raw("one thousand", "0", "-5", "10", "5"))
            .unwrap_err();
        assert!(matches!(err, CalculationError::Range { .. }));
        assert_eq!(err.field(), "down_payment_pct");

        let err = LoanCalculator::default()
            .derive(&raw("one thousand", "120", "0", "10", "5"))
            .unwrap_err();
        assert!(matches!(err, CalculationError::Range { .. }));
        assert_eq!(err.field(), "purchase_reduction_pct");
    }

    #[test]
    fn test_unparseable_words_are_parse_errors() {
        let err = LoanCalculator::default()
            .derive(&raw("lots of money", "0", "0", "10", "5"))
            .unwrap_err();
        assert!(matches!(err, CalculationError::Parse { .. }));
        assert_eq!(err.field(), "purchase_value_words");
    }

    #[test]
    fn test_percent_sign_is_accepted() {
        let a = LoanCalculator::default()
            .derive(&raw("one hundred thousand", "10 %", "20%", "15", "5%"))
            .unwrap();
        assert_eq!(a.loan_amount, dec!(72000.00));
    }

    #[test]
    fn test_report_carries_warnings() {
        let mut input = standard();
        input.purchase_value_words = "one hundred thousnd dollars".into();
        let out = LoanCalculator::default().calculate_with_report(input).unwrap();
        assert_eq!(out.result.amounts.purchase_value, dec!(100));
        assert!(out.warnings.iter().any(|w| w.contains("thousnd")));
        assert!(out.warnings.iter().any(|w| w.contains("Mortgage insurance")));
    }
}
