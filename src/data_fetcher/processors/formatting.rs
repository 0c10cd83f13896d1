//! Display formatting for subject statistics.
//!
//! All functions are total: inputs are assumed to be well-formed numbers
//! coming from the API.

/// Compacts large counts using the `万` (ten thousand) unit.
///
/// # Examples
///
/// ```
/// use bangumi_rank::data_fetcher::processors::format_number;
///
/// assert_eq!(format_number(12345.0), "1.2万");
/// assert_eq!(format_number(9999.0), "9999");
/// ```
pub fn format_number(num: f64) -> String {
    if num >= 10000.0 {
        format!("{:.1}万", num / 10000.0)
    } else {
        format!("{num}")
    }
}

/// Fixed one-decimal score.
///
/// Exact ties round half to even (`7.25` -> `7.2`, `7.75` -> `7.8`), which
/// is how `{:.1}` formats; every one-decimal value in this module follows it.
pub fn format_score(score: f64) -> String {
    format!("{score:.1}")
}

/// Fraction rendered as a percentage with one decimal, `0.234` -> `23.4%`
pub fn format_drop_rate(drop_rate: f64) -> String {
    format!("{:.1}%", drop_rate * 100.0)
}

/// Rank column text; unranked subjects show a dash
pub fn format_rank(rank: u32) -> String {
    if rank == 0 {
        "-".to_string()
    } else {
        rank.to_string()
    }
}
