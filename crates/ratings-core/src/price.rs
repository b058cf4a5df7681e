/// Parse a textual target price such as `"$1,234.50"` into a number.
///
/// Returns `None` for empty, non-numeric, non-finite or non-positive input; callers skip those.
pub fn parse_price(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let unsigned = trimmed.strip_prefix('$').unwrap_or(trimmed).trim_start();
    if unsigned.is_empty() {
        return None;
    }

    let cleaned: String = unsigned.chars().filter(|c| *c != ',').collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p > 0.0)
}
