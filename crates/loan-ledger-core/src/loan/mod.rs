pub mod calculator;
pub mod rate_table;

pub use calculator::{calculate, LoanCalculator};
pub use rate_table::RateTable;
