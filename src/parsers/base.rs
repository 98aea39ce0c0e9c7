//! Shared scanners for the flow DSL and CSV import: amount parsing,
//! hex color validation, comparison classification.

/// Classification of the second bracket field (`[amount, <comparison>]`).
#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    /// A raw prior-period value; the display delta is derived from it.
    Previous(f64),
    /// A literal label (leading `+`/`-` or trailing `%`), stored verbatim.
    Label(String),
}

/// Parse a human-entered amount.
///
/// Accepts thousands separators (`1,500`), a leading currency symbol
/// (`$1500`), and case-insensitive magnitude suffixes: `k`, `m`, `b`, `bn`,
/// `million`, `billion`. Returns None for anything that does not resolve to
/// a finite number.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let lower = raw.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }
    let body = lower
        .trim_start_matches(['$', '€', '£', '¥'])
        .trim_start();
    let (body, multiplier) = strip_magnitude_suffix(body);
    let cleaned: String = body
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    let value: f64 = cleaned.parse().ok()?;
    if value.is_finite() {
        Some(value * multiplier)
    } else {
        None
    }
}

/// Longest-match-first magnitude suffixes (the input is already lowercased).
const MAGNITUDE_SUFFIXES: &[(&str, f64)] = &[
    ("billion", 1e9),
    ("million", 1e6),
    ("bn", 1e9),
    ("k", 1e3),
    ("m", 1e6),
    ("b", 1e9),
];

fn strip_magnitude_suffix(body: &str) -> (&str, f64) {
    for (suffix, mult) in MAGNITUDE_SUFFIXES {
        if let Some(stripped) = body.strip_suffix(suffix) {
            return (stripped.trim_end(), *mult);
        }
    }
    (body, 1.0)
}

/// Validate a hex color (3 or 6 digits, optional leading `#`).
///
/// Returns the normalized lowercase form with a leading `#`, or None.
pub fn parse_hex_color(raw: &str) -> Option<String> {
    let digits = raw.trim().strip_prefix('#').unwrap_or_else(|| raw.trim());
    if !matches!(digits.len(), 3 | 6) || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!("#{}", digits.to_lowercase()))
}

/// Classify the comparison field of a flow line.
///
/// A value that parses as a nonzero number is a raw previous value; otherwise
/// text with a leading sign or trailing `%` is a literal label. Anything else
/// is dropped (parse-skip).
pub fn classify_comparison(raw: &str) -> Option<Comparison> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(value) = parse_amount(trimmed) {
        if value != 0.0 {
            return Some(Comparison::Previous(value));
        }
    }
    if trimmed.starts_with('+') || trimmed.starts_with('-') || trimmed.ends_with('%') {
        return Some(Comparison::Label(trimmed.to_string()));
    }
    None
}

/// Derive the display delta for a raw previous value:
/// signed, percentage, rounded to whole percent (`+20%`, `-7%`).
pub fn delta_label(value: f64, previous: f64) -> String {
    let pct = ((value - previous) / previous * 100.0).round() as i64;
    format!("{:+}%", pct)
}

/// Split bracket content into `(amount, comparison)`.
///
/// A comma followed by a space always separates the two fields; a bare comma
/// is a thousands separator when exactly three digits follow it.
pub fn split_bracket_content(content: &str) -> (&str, Option<&str>) {
    if let Some(idx) = content.find(", ") {
        return (content[..idx].trim(), Some(content[idx + 2..].trim()));
    }
    if let Some(idx) = content.rfind(',') {
        let tail = content[idx + 1..].trim();
        let bytes = tail.as_bytes();
        let is_thousands_group = bytes.len() >= 3
            && bytes[..3].iter().all(u8::is_ascii_digit)
            && (bytes.len() == 3 || bytes[3] == b'.');
        if !is_thousands_group {
            return (content[..idx].trim(), Some(tail));
        }
    }
    (content.trim(), None)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_plain() {
        assert_eq!(parse_amount("1500"), Some(1500.0));
        assert_eq!(parse_amount("  42.5 "), Some(42.5));
        assert_eq!(parse_amount("-3"), Some(-3.0));
    }

    #[test]
    fn test_parse_amount_thousands_separators() {
        assert_eq!(parse_amount("1,500"), Some(1500.0));
        assert_eq!(parse_amount("1,234,567.89"), Some(1234567.89));
        assert_eq!(parse_amount("1 200"), Some(1200.0));
    }

    #[test]
    fn test_parse_amount_currency_prefix() {
        assert_eq!(parse_amount("$1500"), Some(1500.0));
        assert_eq!(parse_amount("€ 2,000"), Some(2000.0));
    }

    #[test]
    fn test_parse_amount_suffixes() {
        assert_eq!(parse_amount("2k"), Some(2000.0));
        assert_eq!(parse_amount("1.5K"), Some(1500.0));
        assert_eq!(parse_amount("3m"), Some(3_000_000.0));
        assert_eq!(parse_amount("1b"), Some(1e9));
        assert_eq!(parse_amount("2bn"), Some(2e9));
        assert_eq!(parse_amount("1.2 million"), Some(1_200_000.0));
        assert_eq!(parse_amount("0.5 Billion"), Some(5e8));
    }

    #[test]
    fn test_parse_amount_garbage() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("$"), None);
        assert_eq!(parse_amount("12x"), None);
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FF0000").as_deref(), Some("#ff0000"));
        assert_eq!(parse_hex_color("abc").as_deref(), Some("#abc"));
        assert_eq!(parse_hex_color("#3a5").as_deref(), Some("#3a5"));
        assert_eq!(parse_hex_color("#ff00"), None);
        assert_eq!(parse_hex_color("gghhii"), None);
    }

    #[test]
    fn test_classify_comparison_previous() {
        assert_eq!(classify_comparison("1200"), Some(Comparison::Previous(1200.0)));
        assert_eq!(classify_comparison("1,200"), Some(Comparison::Previous(1200.0)));
    }

    #[test]
    fn test_classify_comparison_zero_is_not_previous() {
        assert_eq!(classify_comparison("0"), None);
    }

    #[test]
    fn test_classify_comparison_literal() {
        assert_eq!(
            classify_comparison("+10%"),
            Some(Comparison::Label("+10%".to_string()))
        );
        assert_eq!(
            classify_comparison("down 5%"),
            Some(Comparison::Label("down 5%".to_string()))
        );
    }

    #[test]
    fn test_delta_label() {
        assert_eq!(delta_label(1200.0, 1000.0), "+20%");
        assert_eq!(delta_label(930.0, 1000.0), "-7%");
        assert_eq!(delta_label(1000.0, 1000.0), "+0%");
    }

    #[test]
    fn test_split_bracket_content_amount_only() {
        assert_eq!(split_bracket_content("1500"), ("1500", None));
        assert_eq!(split_bracket_content("1,500"), ("1,500", None));
        assert_eq!(split_bracket_content("1,234,567"), ("1,234,567", None));
        assert_eq!(split_bracket_content("1,500.25"), ("1,500.25", None));
    }

    #[test]
    fn test_split_bracket_content_with_comparison() {
        assert_eq!(split_bracket_content("1500, 1200"), ("1500", Some("1200")));
        assert_eq!(split_bracket_content("1500, +10%"), ("1500", Some("+10%")));
        assert_eq!(split_bracket_content("1500,+10%"), ("1500", Some("+10%")));
    }
}
