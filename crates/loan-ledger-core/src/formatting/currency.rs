use rust_decimal::{Decimal, RoundingStrategy};

use super::NOT_APPLICABLE;
use crate::config::MONEY_DP;
use crate::types::{Money, Percent, Years};

const CURRENCY_PREFIX: &str = "$  ";
const GROUP_SEPARATOR: &str = "  ,  ";
const PAIR_SEPARATOR: &str = " AND ";

fn to_two_places(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(MONEY_DP);
    rounded
}

/// Split an ASCII digit string into thousands groups, most significant first.
fn group_thousands(digits: &str) -> String {
    let lead = match digits.len() % 3 {
        0 => 3.min(digits.len()),
        n => n,
    };
    let mut groups = vec![&digits[..lead]];
    groups.extend((lead..digits.len()).step_by(3).map(|i| &digits[i..i + 3]));
    groups.join(GROUP_SEPARATOR)
}

/// `$  1  ,  234  ,  567.50`; zero renders as "NA".
pub fn format_currency(value: Money) -> String {
    let rounded = to_two_places(value);
    if rounded.is_zero() {
        return NOT_APPLICABLE.to_string();
    }

    let text = rounded.abs().to_string();
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let sign = if rounded.is_sign_negative() { "-" } else { "" };

    format!("{sign}{CURRENCY_PREFIX}{}.{cents}", group_thousands(whole))
}

/// Like [`format_currency`], with an absent amount rendered as "NA".
pub fn format_optional_currency(value: Option<Money>) -> String {
    value.map_or_else(|| NOT_APPLICABLE.to_string(), format_currency)
}

/// Whole-number percentage, fraction truncated: `20%`.
pub fn format_whole_percent(pct: Percent) -> String {
    format!("{}%", pct.trunc().normalize())
}

/// Percentage to two places: `5.00%`.
pub fn format_percent(pct: Percent) -> String {
    format!("{}%", to_two_places(pct))
}

/// Whole years, fraction truncated: `15 YEARS`.
pub fn format_years(years: Years) -> String {
    format!("{} YEARS", years.trunc().normalize())
}

/// Two rendered values joined by the literal word AND.
pub fn join_pair(left: &str, right: &str) -> String {
    format!("{left}{PAIR_SEPARATOR}{right}")
}
