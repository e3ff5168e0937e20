//! Progress extraction from chdman output.
//!
//! chdman reports progress as free-form lines such as
//! `Compressing, 42% complete... (ratio=38.1%)`. The only convention relied on
//! is a percentage written as digits directly followed by `%`.

use once_cell::sync::Lazy;
use regex_lite::Regex;

/// Sentinel used on event channels when a line carried no percentage.
pub const PROGRESS_UNKNOWN: f64 = -1.0;

static PERCENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,3})%").expect("percent pattern is valid"));

/// Parses the first `NN%` occurrence of a line into a fraction in `[0.0, 1.0]`.
///
/// Returns `None` when the line has no percentage. `None` means "unknown",
/// not zero: callers should keep whatever value they displayed before.
pub fn parse_percent(line: &str) -> Option<f64> {
    let caps = PERCENT_RE.captures(line)?;
    let value: u32 = caps.get(1)?.as_str().parse().ok()?;
    Some((f64::from(value) / 100.0).clamp(0.0, 1.0))
}

/// Converts an optional fraction into the value sent on event channels.
pub fn progress_or_sentinel(progress: Option<f64>) -> f64 {
    progress.unwrap_or(PROGRESS_UNKNOWN)
}
