//! Calculation settings.
//!
//! Every knob that differed between the historical entry screens is an
//! explicit value here rather than a process-wide decimal context, so two
//! calculators with different settings can run side by side.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::loan::rate_table::RateTable;
use crate::types::{Money, Percent};
use crate::words::{UnknownWordPolicy, WordMode};

/// Decimal places carried by every monetary amount.
pub const MONEY_DP: u32 = 2;

/// How a monetary step is brought to two decimal places.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Round half to even (banker's rounding).
    #[default]
    HalfEven,
    /// Drop digits beyond the second decimal place.
    Truncate,
}

impl RoundingMode {
    fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
            RoundingMode::Truncate => RoundingStrategy::ToZero,
        }
    }

    /// Round `value` to exactly two decimal places, scale included.
    pub fn round(self, value: Decimal) -> Money {
        let mut rounded = value.round_dp_with_strategy(MONEY_DP, self.strategy());
        rounded.rescale(MONEY_DP);
        rounded
    }
}

/// Meaning of a reduction percentage entered on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReductionSemantics {
    /// "Reduce by X%": the rounded X% share is subtracted from the base.
    ReduceBy,
    /// "Keep X%": the rounded X% share is the result.
    Keep,
}

/// Outcome of applying a reduction percentage to a base amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reduction {
    /// Amount remaining after the reduction.
    pub remaining: Money,
    /// Amount taken away from the base.
    pub removed: Money,
}

impl ReductionSemantics {
    /// Apply `pct` to `base`; exactly one rounding happens, on the share.
    pub fn apply(self, base: Money, pct: Percent, rounding: RoundingMode) -> Reduction {
        let share = rounding.round(base * pct / Decimal::ONE_HUNDRED);
        match self {
            ReductionSemantics::ReduceBy => Reduction {
                remaining: base - share,
                removed: share,
            },
            ReductionSemantics::Keep => Reduction {
                remaining: share,
                removed: base - share,
            },
        }
    }
}

/// Settings threaded through one [`LoanCalculator`](crate::loan::calculator::LoanCalculator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculationConfig {
    pub rounding: RoundingMode,
    /// Semantics of the purchase value reduction percentage.
    pub purchase_reduction: ReductionSemantics,
    /// Semantics of the monthly principal and total interest reduction percentages.
    pub payment_reduction: ReductionSemantics,
    pub word_mode: WordMode,
    pub unknown_words: UnknownWordPolicy,
    pub rate_table: RateTable,
}

impl Default for CalculationConfig {
    fn default() -> Self {
        Self {
            rounding: RoundingMode::HalfEven,
            purchase_reduction: ReductionSemantics::ReduceBy,
            payment_reduction: ReductionSemantics::Keep,
            word_mode: WordMode::Integer,
            unknown_words: UnknownWordPolicy::Ignore,
            rate_table: RateTable::standard(),
        }
    }
}
