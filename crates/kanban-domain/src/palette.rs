/// Pastel colours offered by the column and task editors, with display names.
pub const PASTEL_COLORS: [(&str, &str); 8] = [
    ("Pink", "#FFD6E0"),
    ("Blue", "#D6E8FF"),
    ("Green", "#C1FBA4"),
    ("Yellow", "#FFF4B7"),
    ("Purple", "#E8D6FF"),
    ("Orange", "#FFE4B7"),
    ("Teal", "#B7F4E8"),
    ("Gray", "#E8E8E8"),
];

pub const DEFAULT_TASK_COLOR: &str = "#D6E8FF";

/// Hex value of a palette colour looked up by name, ignoring case.
pub fn color_hex(name: &str) -> Option<&'static str> {
    let name = name.trim();
    PASTEL_COLORS
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
        .map(|(_, hex)| *hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex_is_case_insensitive() {
        assert_eq!(color_hex("blue"), Some("#D6E8FF"));
        assert_eq!(color_hex(" Teal "), Some("#B7F4E8"));
        assert_eq!(color_hex("#123456"), None);
    }
}
