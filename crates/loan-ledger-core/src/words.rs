//! English amount phrases to exact decimals.
//!
//! Handles cardinal words up to the trillions ("two hundred fifty thousand
//! dollars and fifty cents"). Words are folded into a 0-999 chunk that is
//! flushed into the running total at each scale word, so the result is
//! exact at any magnitude the decimal type can hold.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ParseError;

const UNITS: &[(&str, i64)] = &[
    ("zero", 0),
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
    ("eleven", 11),
    ("twelve", 12),
    ("thirteen", 13),
    ("fourteen", 14),
    ("fifteen", 15),
    ("sixteen", 16),
    ("seventeen", 17),
    ("eighteen", 18),
    ("nineteen", 19),
];

const TENS: &[(&str, i64)] = &[
    ("twenty", 20),
    ("thirty", 30),
    ("forty", 40),
    ("fifty", 50),
    ("sixty", 60),
    ("seventy", 70),
    ("eighty", 80),
    ("ninety", 90),
];

const SCALES: &[(&str, i64)] = &[
    ("thousand", 1_000),
    ("million", 1_000_000),
    ("billion", 1_000_000_000),
    ("trillion", 1_000_000_000_000),
];

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Largest scale a decimal fraction may reach.
const MAX_FRACTION_DIGITS: u32 = 28;

/// Whether anything below one dollar is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordMode {
    /// Whole dollars only; cents and "point" fractions are dropped.
    #[default]
    Integer,
    /// Cents phrases and "point" digit sequences become a decimal fraction.
    Decimal,
}

/// What to do with a word that is not part of the number vocabulary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownWordPolicy {
    /// Skip the word; it is reported in [`ParsedAmount::ignored_words`].
    #[default]
    Ignore,
    /// Fail with [`ParseError::UnknownWord`].
    Reject,
}

/// A parsed amount together with the words that played no part in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedAmount {
    pub value: Decimal,
    pub ignored_words: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Word {
    Value(i64),
    Hundred,
    Scale(i64),
    Dollars,
    Cents,
    Point,
    Filler,
    Unknown,
}

fn classify(token: &str) -> Word {
    if let Some(&(_, n)) = UNITS.iter().chain(TENS).find(|(w, _)| *w == token) {
        return Word::Value(n);
    }
    if let Some(&(_, s)) = SCALES.iter().find(|(w, _)| *w == token) {
        return Word::Scale(s);
    }
    match token {
        "hundred" => Word::Hundred,
        "dollar" | "dollars" => Word::Dollars,
        "cent" | "cents" => Word::Cents,
        "point" => Word::Point,
        "and" => Word::Filler,
        _ => Word::Unknown,
    }
}

fn digit_value(token: &str) -> Option<i64> {
    UNITS[..10]
        .iter()
        .find(|(w, _)| *w == token)
        .map(|&(_, n)| n)
}

/// Strip trailing punctuation so "thousand," still reads as a scale word.
fn clean(token: &str) -> &str {
    token.trim_end_matches(|c: char| matches!(c, ',' | '.' | ';' | ':'))
}

/// Converts amount phrases to decimals. Cheap to copy and thread-safe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WordNumberParser {
    mode: WordMode,
    policy: UnknownWordPolicy,
}

impl WordNumberParser {
    pub fn new(mode: WordMode, policy: UnknownWordPolicy) -> Self {
        Self { mode, policy }
    }

    pub fn mode(&self) -> WordMode {
        self.mode
    }

    /// Parse `text` and return only the value.
    pub fn parse(&self, text: &str) -> Result<Decimal, ParseError> {
        self.parse_detailed(text).map(|parsed| parsed.value)
    }

    /// Parse `text`, also reporting every word that was skipped.
    pub fn parse_detailed(&self, text: &str) -> Result<ParsedAmount, ParseError> {
        if text.trim().is_empty() {
            return Err(ParseError::Empty);
        }

        let lowered = text.to_lowercase().replace('-', " ");
        let mut tokens = lowered.split_whitespace().map(clean).filter(|t| !t.is_empty());

        let mut total = Decimal::ZERO;
        let mut current = Decimal::ZERO;
        let mut fraction = Decimal::ZERO;
        let mut saw_number = false;
        let mut ignored: Vec<String> = Vec::new();

        while let Some(token) = tokens.next() {
            match classify(token) {
                Word::Value(n) => {
                    current = current
                        .checked_add(Decimal::from(n))
                        .ok_or(ParseError::Overflow)?;
                    saw_number = true;
                }
                Word::Hundred => {
                    current = current.checked_mul(HUNDRED).ok_or(ParseError::Overflow)?;
                    saw_number = true;
                }
                Word::Scale(scale) => {
                    let chunk = current
                        .checked_mul(Decimal::from(scale))
                        .ok_or(ParseError::Overflow)?;
                    total = total.checked_add(chunk).ok_or(ParseError::Overflow)?;
                    current = Decimal::ZERO;
                    saw_number = true;
                }
                Word::Dollars => {
                    total = total.checked_add(current).ok_or(ParseError::Overflow)?;
                    current = Decimal::ZERO;
                }
                Word::Cents => {
                    // Words since the last dollar boundary are the cents.
                    let cents = std::mem::take(&mut current);
                    if self.mode == WordMode::Decimal {
                        if cents >= HUNDRED {
                            return Err(ParseError::CentsOutOfRange(cents.to_string()));
                        }
                        fraction = cents / HUNDRED;
                    }
                    break;
                }
                Word::Point => {
                    if self.mode == WordMode::Decimal {
                        fraction = self.parse_fraction(&mut tokens, &mut ignored)?;
                    }
                    break;
                }
                Word::Filler => {}
                Word::Unknown => self.skip(token, &mut ignored)?,
            }
        }

        if !saw_number {
            return Err(ParseError::NoNumberWords(text.trim().to_string()));
        }

        let value = total
            .checked_add(current)
            .and_then(|v| v.checked_add(fraction))
            .ok_or(ParseError::Overflow)?;

        debug!(%value, ignored = ignored.len(), "parsed amount words");
        Ok(ParsedAmount {
            value,
            ignored_words: ignored,
        })
    }

    /// Digits after "point", one word per decimal place.
    fn parse_fraction<'a>(
        &self,
        tokens: &mut impl Iterator<Item = &'a str>,
        ignored: &mut Vec<String>,
    ) -> Result<Decimal, ParseError> {
        let mut fraction = Decimal::ZERO;
        let mut places = 0u32;
        for token in tokens {
            match digit_value(token) {
                Some(d) => {
                    places += 1;
                    if places > MAX_FRACTION_DIGITS {
                        return Err(ParseError::Overflow);
                    }
                    fraction += Decimal::new(d, places);
                }
                None if classify(token) == Word::Filler => {}
                None => self.skip(token, ignored)?,
            }
        }
        Ok(fraction)
    }

    fn skip(&self, token: &str, ignored: &mut Vec<String>) -> Result<(), ParseError> {
        match self.policy {
            UnknownWordPolicy::Ignore => {
                ignored.push(token.to_string());
                Ok(())
            }
            UnknownWordPolicy::Reject => Err(ParseError::UnknownWord(token.to_string())),
        }
    }
}

/// Parse with the default whole-dollar, ignore-unknown settings.
pub fn words_to_number(text: &str) -> Result<Decimal, ParseError> {
    WordNumberParser::default().parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn decimal_parser() -> WordNumberParser {
        WordNumberParser::new(WordMode::Decimal, UnknownWordPolicy::Ignore)
    }

    #[test]
    fn test_simple_scales() {
        assert_eq!(words_to_number("one hundred thousand dollars").unwrap(), dec!(100000));
        assert_eq!(words_to_number("seven").unwrap(), dec!(7));
        assert_eq!(words_to_number("zero dollars").unwrap(), dec!(0));
    }

    #[test]
    fn test_full_phrase_with_hyphens() {
        let v = words_to_number(
            "One Million Two Hundred Thirty-Four Thousand Five Hundred Sixty-Seven",
        )
        .unwrap();
        assert_eq!(v, dec!(1234567));
    }

    #[test]
    fn test_and_is_a_separator() {
        assert_eq!(words_to_number("one thousand and one").unwrap(), dec!(1001));
    }

    #[test]
    fn test_cents_dropped_in_integer_mode() {
        let v = words_to_number("two hundred fifty thousand dollars and fifty cents").unwrap();
        assert_eq!(v, dec!(250000));
    }

    #[test]
    fn test_cents_kept_in_decimal_mode() {
        let v = decimal_parser()
            .parse("two hundred fifty thousand dollars and fifty cents")
            .unwrap();
        assert_eq!(v, dec!(250000.50));
    }

    #[test]
    fn test_cents_without_dollar_word() {
        let v = decimal_parser().parse("five thousand twenty cents").unwrap();
        assert_eq!(v, dec!(5000.20));
    }

    #[test]
    fn test_cents_without_dollar_word_dropped_in_integer_mode() {
        // Everything after "thousand" is the cents chunk, so only 5000 remains.
        let v = words_to_number("five thousand twenty cents").unwrap();
        assert_eq!(v, dec!(5000));
    }

    #[test]
    fn test_cents_out_of_range() {
        let err = decimal_parser().parse("one hundred fifty cents").unwrap_err();
        assert_eq!(err, ParseError::CentsOutOfRange("150".into()));
    }

    #[test]
    fn test_point_fraction() {
        assert_eq!(decimal_parser().parse("three point one four").unwrap(), dec!(3.14));
        assert_eq!(words_to_number("three point one four").unwrap(), dec!(3));
    }

    #[test]
    fn test_trailing_punctuation_is_stripped() {
        assert_eq!(words_to_number("five thousand, two hundred.").unwrap(), dec!(5200));
    }

    #[test]
    fn test_unknown_words_are_reported_not_counted() {
        let parsed = WordNumberParser::default()
            .parse_detailed("two hundred thosand dollars")
            .unwrap();
        assert_eq!(parsed.value, dec!(200));
        assert_eq!(parsed.ignored_words, vec!["thosand".to_string()]);
    }

    #[test]
    fn test_strict_policy_rejects_unknown_words() {
        let strict = WordNumberParser::new(WordMode::Integer, UnknownWordPolicy::Reject);
        assert_eq!(
            strict.parse("two hundred thosand").unwrap_err(),
            ParseError::UnknownWord("thosand".into())
        );
        assert_eq!(strict.parse("two hundred dollars").unwrap(), dec!(200));
    }

    #[test]
    fn test_empty_and_wordless_input() {
        assert_eq!(words_to_number("   ").unwrap_err(), ParseError::Empty);
        assert_eq!(
            words_to_number("dollars").unwrap_err(),
            ParseError::NoNumberWords("dollars".into())
        );
    }

    #[test]
    fn test_overflow_is_an_error() {
        let text = format!("nine{}", " hundred".repeat(15));
        assert_eq!(words_to_number(&text).unwrap_err(), ParseError::Overflow);
    }

    #[test]
    fn test_same_text_same_value() {
        let text = "forty-two thousand three hundred";
        assert_eq!(words_to_number(text).unwrap(), words_to_number(text).unwrap());
    }
}
