//! Value formatting for node and link captions.

/// Format a flow value for display, with an optional prefix (e.g. "$").
///
/// Values below 1000 render verbatim; `[1000, 1e6)` as thousands with a `K`
/// suffix; `>= 1e6` as millions with an `M` suffix. A suffix always carries
/// exactly one decimal digit (`1000` renders as `"1.0K"`, never `"1K"`).
pub fn format_value(value: f64, prefix: &str) -> String {
    if value >= 1_000_000.0 {
        format!("{}{:.1}M", prefix, value / 1_000_000.0)
    } else if value >= 1000.0 {
        format!("{}{:.1}K", prefix, value / 1000.0)
    } else {
        format!("{}{}", prefix, value)
    }
}
