//! Display rendering for loan record fields.
//!
//! Every function here is total: well-typed input never fails, and values
//! that cannot be shown render as the [`NOT_APPLICABLE`] sentinel.

pub mod currency;
pub mod fields;

pub use currency::{
    format_currency, format_optional_currency, format_percent, format_whole_percent,
    format_years, join_pair,
};
pub use fields::{format_city_state, format_name, format_reference_number};

/// Placeholder for a value that is zero, absent or not offered.
pub const NOT_APPLICABLE: &str = "NA";
