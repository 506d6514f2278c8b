use std::fs;
use std::path::Path;

use loan_ledger_core::CalculationConfig;

/// Load calculation settings. No path means the house defaults.
///
/// Files ending in `.json` are read as JSON; anything else as YAML.
pub fn load(path: Option<&str>) -> Result<CalculationConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(CalculationConfig::default());
    };

    let p = Path::new(path);
    let contents = fs::read_to_string(p)
        .map_err(|e| format!("Failed to read config '{}': {}", p.display(), e))?;

    let is_json = p
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let config: CalculationConfig = if is_json {
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse config '{}': {}", p.display(), e))?
    } else {
        serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config '{}': {}", p.display(), e))?
    };

    tracing::debug!(path = %p.display(), "loaded calculation settings");
    Ok(config)
}
