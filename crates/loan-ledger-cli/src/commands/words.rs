use clap::Args;
use serde_json::{json, Value};

use loan_ledger_core::{UnknownWordPolicy, WordMode, WordNumberParser};

/// Arguments for converting an amount written in words
#[derive(Args)]
pub struct WordsArgs {
    /// Amount in words, e.g. "two hundred fifty thousand dollars"
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,

    /// Keep cents and "point" fractions instead of whole dollars
    #[arg(long)]
    pub decimal: bool,

    /// Fail on words that are not part of the number vocabulary
    #[arg(long)]
    pub strict: bool,
}

pub fn run_words(args: WordsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mode = if args.decimal {
        WordMode::Decimal
    } else {
        WordMode::Integer
    };
    let policy = if args.strict {
        UnknownWordPolicy::Reject
    } else {
        UnknownWordPolicy::Ignore
    };

    let text = args.text.join(" ");
    let parsed = WordNumberParser::new(mode, policy).parse_detailed(&text)?;
    Ok(json!({
        "text": text,
        "value": parsed.value.to_string(),
        "ignored_words": parsed.ignored_words,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(text: &str, decimal: bool, strict: bool) -> WordsArgs {
        WordsArgs {
            text: text.split(' ').map(String::from).collect(),
            decimal,
            strict,
        }
    }

    #[test]
    fn test_run_words_integer() {
        let out = run_words(args("one hundred twenty three", false, false)).unwrap();
        assert_eq!(out["value"], "123");
    }

    #[test]
    fn test_run_words_decimal_cents() {
        let out = run_words(args("five dollars and fifty five cents", true, false)).unwrap();
        assert_eq!(out["value"], "5.55");
    }

    #[test]
    fn test_run_words_strict_rejects_unknown() {
        assert!(run_words(args("five bananas", false, true)).is_err());
        let out = run_words(args("five bananas", false, false)).unwrap();
        assert_eq!(out["ignored_words"][0], "bananas");
    }
}
