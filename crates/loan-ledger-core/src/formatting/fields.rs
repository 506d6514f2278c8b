use super::NOT_APPLICABLE;

const REFERENCE_SEPARATOR: &str = "   ";
const NAME_SEPARATOR: &str = "  ";

/// Jurisdiction marker that is not serviced; any occurrence yields "NA".
const UNSUPPORTED_JURISDICTION: &str = "DC";

/// Reference numbers typed with any whitespace are re-spaced one character
/// per cell: `"AB 123"` becomes `"A   B   1   2   3"`. Without whitespace
/// the text is returned as is.
pub fn format_reference_number(raw: &str) -> String {
    let cleaned: Vec<char> = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.len() == raw.chars().count() {
        return cleaned.into_iter().collect();
    }
    cleaned
        .iter()
        .map(char::to_string)
        .collect::<Vec<_>>()
        .join(REFERENCE_SEPARATOR)
}

/// Upper-cased name tokens. With three or more tokens the first two are
/// joined by a period: `"john quincy public"` becomes `"JOHN.QUINCY  PUBLIC"`.
pub fn format_name(raw: &str) -> String {
    let upper = raw.to_uppercase();
    let parts: Vec<&str> = upper
        .split(|c: char| c == '.' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();

    match parts.as_slice() {
        [first, middle, rest @ ..] if !rest.is_empty() => {
            format!("{first}.{middle}{NAME_SEPARATOR}{}", rest.join(NAME_SEPARATOR))
        }
        _ => parts.join(NAME_SEPARATOR),
    }
}

/// `"Austin, TX"` becomes `"AUSTIN , TX"`.
pub fn format_city_state(raw: &str) -> String {
    let upper = raw.to_uppercase();
    if upper.contains(UNSUPPORTED_JURISDICTION) {
        return NOT_APPLICABLE.to_string();
    }
    match upper.split_once(',') {
        Some((city, state)) => format!("{} , {}", city.trim(), state.trim()),
        None => upper,
    }
}
