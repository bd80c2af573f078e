//! Text color validation

/// Named colors accepted by the `textColor` mark
pub const NAMED_COLORS: &[&str] = &[
    "red", "green", "blue", "yellow", "orange", "purple", "pink", "brown", "black", "white",
    "gray", "grey", "cyan", "magenta",
];

/// Check whether `value` is an acceptable color.
///
/// Accepts 3- or 6-digit hex values with or without a leading `#`, and the
/// names in [`NAMED_COLORS`] in any letter case.
pub fn is_valid_color(value: &str) -> bool {
    let hex = value.strip_prefix('#').unwrap_or(value);
    if matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return true;
    }
    NAMED_COLORS
        .iter()
        .any(|name| name.eq_ignore_ascii_case(value))
}
