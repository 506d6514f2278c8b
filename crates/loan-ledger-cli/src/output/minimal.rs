use serde_json::Value;

/// Print just the key answer value from the output.
///
/// Looks for well-known answer fields in order of priority, then inside a
/// loan record's display section, then falls back to the first field.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_text(value));
}

fn minimal_text(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let priority_keys = [
        "formatted",
        "value",
        "property_insurance_rate",
        "exported",
        "version",
    ];

    let Value::Object(map) = result_obj else {
        return format_minimal(result_obj);
    };

    for key in &priority_keys {
        if let Some(val) = map.get(*key).filter(|v| !v.is_null()) {
            return format_minimal(val);
        }
    }

    if let Some(val) = map
        .get("display")
        .and_then(|d| d.get("loan_amount_and_principal"))
    {
        return format_minimal(val);
    }

    match map.iter().next() {
        Some((key, val)) => format!("{}: {}", key, format_minimal(val)),
        None => String::new(),
    }
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_prefers_known_keys() {
        assert_eq!(minimal_text(&json!({ "formatted": "AUSTIN , TX" })), "AUSTIN , TX");
        assert_eq!(minimal_text(&json!({ "text": "five", "value": "5" })), "5");
    }

    #[test]
    fn test_minimal_reads_record_display() {
        let out = json!({
            "result": {
                "display": { "loan_amount_and_principal": "$  72  ,  000.00 AND $  400.00" },
                "raw": {},
            }
        });
        assert_eq!(minimal_text(&out), "$  72  ,  000.00 AND $  400.00");
    }
}
