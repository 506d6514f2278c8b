pub mod config;
pub mod error;
pub mod formatting;
pub mod loan;
pub mod record;
pub mod types;
pub mod words;

pub use config::{CalculationConfig, ReductionSemantics, RoundingMode};
pub use error::{CalculationError, ParseError};
pub use loan::calculator::{calculate, LoanCalculator};
pub use loan::rate_table::RateTable;
pub use record::{
    DerivedAmounts, DisplayFields, LoanRecord, LoanTerms, MortgageInsurance, RawLoanInput,
};
pub use types::*;
pub use words::{words_to_number, UnknownWordPolicy, WordMode, WordNumberParser};

/// Standard result type for all loan calculations
pub type CalculationResult<T> = Result<T, CalculationError>;
