/// 1) Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// 2) Reduce a numeric-looking cell to something `str::parse` accepts:
/// thousands separators and a trailing `%` are dropped. Blank → None.
fn numeric_text(raw: &str) -> Option<String> {
    let cleaned = clean_str(raw);
    let cleaned = cleaned.strip_suffix('%').unwrap_or(&cleaned).trim_end();
    let digits: String = cleaned.chars().filter(|c| *c != ',').collect();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

/// 3) Parse a ridership count. Reals are rounded to the nearest integer;
/// anything non-numeric (including NaN/inf) is a null.
pub fn parse_count(raw: &str) -> Option<i64> {
    let text = numeric_text(raw)?;
    if let Ok(v) = text.parse::<i64>() {
        return Some(v);
    }
    let v: f64 = text.parse().ok()?;
    v.is_finite().then(|| v.round() as i64)
}

/// 4) Parse a real-valued cell; non-finite values are nulls.
pub fn parse_real(raw: &str) -> Option<f64> {
    let v: f64 = numeric_text(raw)?.parse().ok()?;
    v.is_finite().then_some(v)
}
