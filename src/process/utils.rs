use once_cell::sync::Lazy;
use regex::Regex;

static NON_ALNUM_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("literal regex compiles"));

/// 1) Drop every thousands-separator character from `raw`.
pub fn strip_separators(raw: &str, separators: &[char]) -> String {
    raw.chars().filter(|c| !separators.contains(c)).collect()
}

/// 2) Whole-number parse. Empty strings are not numbers.
pub fn parse_integer(s: &str) -> Option<i64> {
    s.parse::<i64>().ok()
}

/// 3) Real-number parse. Rejects `inf`/`NaN` spellings so a player called
///    "Nan" never turns a column numeric.
pub fn parse_real(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Turn `<year>_<category>` into a table name: every run of characters
/// outside `[A-Za-z0-9]` becomes a single `_`.
pub fn sanitize_table_name(raw: &str) -> String {
    NON_ALNUM_RUN.replace_all(raw, "_").into_owned()
}

/// Table name for one (year, category) pair.
pub fn table_name(year: &str, category: &str) -> String {
    sanitize_table_name(&format!("{}_{}", year, category))
}
