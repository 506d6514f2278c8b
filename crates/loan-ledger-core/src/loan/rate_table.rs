//! Insurance rate tiers keyed on loan-to-value and term.
//!
//! Tiers are ordered and evaluated top-down; the first tier whose guard
//! holds wins, so boundary values resolve exactly as listed.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Percent, Rate, Years};

// ---------------------------------------------------------------------------
// Standard tiers
// ---------------------------------------------------------------------------

/// (upper LTV bound inclusive, annual property insurance rate)
const STANDARD_PROPERTY_TIERS: [(Decimal, Decimal); 4] = [
    (dec!(84.99), dec!(0.0032)),
    // Drops below the 84.99 tier on purpose.
    (dec!(85), dec!(0.0021)),
    (dec!(90), dec!(0.0041)),
    (dec!(95), dec!(0.0067)),
];

/// Property insurance rate above the last LTV tier.
const STANDARD_PROPERTY_CEILING_RATE: Decimal = dec!(0.0085);

/// Term boundary for the mortgage insurance bands, in years.
const STANDARD_TERM_SPLIT: Decimal = dec!(20);

/// (min LTV, max LTV, rate for term <= split, rate for term > split)
const STANDARD_MORTGAGE_BANDS: [(Decimal, Decimal, Decimal, Decimal); 3] = [
    (dec!(80.01), dec!(85), dec!(0.0019), dec!(0.0032)),
    (dec!(85.01), dec!(90), dec!(0.0023), dec!(0.0052)),
    (dec!(90.01), dec!(95), dec!(0.0026), dec!(0.0078)),
];

// ---------------------------------------------------------------------------
// Tier types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyInsuranceTier {
    /// Inclusive upper bound on loan-to-value %.
    pub max_ltv: Percent,
    pub rate: Rate,
}

/// Loan term guard for a mortgage insurance tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermBand {
    AtMost(Years),
    Above(Years),
}

impl TermBand {
    pub fn contains(&self, term: Years) -> bool {
        match *self {
            TermBand::AtMost(limit) => term <= limit,
            TermBand::Above(limit) => term > limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MortgageInsuranceTier {
    /// Inclusive lower bound on loan-to-value %.
    pub min_ltv: Percent,
    /// Inclusive upper bound on loan-to-value %.
    pub max_ltv: Percent,
    pub term: TermBand,
    pub rate: Rate,
}

impl MortgageInsuranceTier {
    pub fn matches(&self, ltv: Percent, term: Years) -> bool {
        self.min_ltv <= ltv && ltv <= self.max_ltv && self.term.contains(term)
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTable {
    pub property_insurance: Vec<PropertyInsuranceTier>,
    /// Rate applied when the LTV exceeds every property tier.
    pub property_insurance_ceiling_rate: Rate,
    pub mortgage_insurance: Vec<MortgageInsuranceTier>,
}

impl Default for RateTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl RateTable {
    /// The house rate card.
    pub fn standard() -> Self {
        let property_insurance = STANDARD_PROPERTY_TIERS
            .iter()
            .map(|&(max_ltv, rate)| PropertyInsuranceTier { max_ltv, rate })
            .collect();

        let mortgage_insurance = STANDARD_MORTGAGE_BANDS
            .iter()
            .flat_map(|&(min_ltv, max_ltv, short_rate, long_rate)| {
                [
                    MortgageInsuranceTier {
                        min_ltv,
                        max_ltv,
                        term: TermBand::AtMost(STANDARD_TERM_SPLIT),
                        rate: short_rate,
                    },
                    MortgageInsuranceTier {
                        min_ltv,
                        max_ltv,
                        term: TermBand::Above(STANDARD_TERM_SPLIT),
                        rate: long_rate,
                    },
                ]
            })
            .collect();

        Self {
            property_insurance,
            property_insurance_ceiling_rate: STANDARD_PROPERTY_CEILING_RATE,
            mortgage_insurance,
        }
    }

    /// Annual property insurance rate for a loan-to-value %.
    pub fn property_insurance_rate(&self, ltv: Percent) -> Rate {
        self.property_insurance
            .iter()
            .find(|tier| ltv <= tier.max_ltv)
            .map(|tier| tier.rate)
            .unwrap_or(self.property_insurance_ceiling_rate)
    }

    /// Annual mortgage insurance rate, or `None` when no tier applies.
    pub fn mortgage_insurance_rate(&self, ltv: Percent, term: Years) -> Option<Rate> {
        self.mortgage_insurance
            .iter()
            .find(|tier| tier.matches(ltv, term))
            .map(|tier| tier.rate)
    }
}
