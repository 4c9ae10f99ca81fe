use crate::output;
use kanban_domain::{color_hex, PASTEL_COLORS};

pub fn handle() {
    let colors: Vec<serde_json::Value> = PASTEL_COLORS
        .iter()
        .map(|(name, hex)| serde_json::json!({"name": name, "hex": hex}))
        .collect();
    output::output_success(colors);
}

/// A `--color` value: palette names become their hex value, anything else is
/// passed on for the store to validate.
pub fn resolve_color(raw: String) -> String {
    match color_hex(&raw) {
        Some(hex) => hex.to_string(),
        None => raw,
    }
}
