//! Display-metric derivation.
//!
//! Pure functions that turn raw counters into percentages and severity bands.
//! Everything here is synchronous, deterministic and safe to call on every
//! render.

use serde::{Deserialize, Serialize};

/// Percentage at or above which a metric is considered healthy.
pub const HIGH_THRESHOLD: i64 = 80;

/// Percentage at or above which a metric is considered acceptable.
pub const MEDIUM_THRESHOLD: i64 = 60;

/// Three-band classification of a percentage, driving color-coding of
/// coverage and pass-rate bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// Classify a percentage: `High` at 80 and above, `Medium` from 60 to
    /// 79, `Low` below 60.
    pub fn from_percentage(percentage: i64) -> Self {
        if percentage >= HIGH_THRESHOLD {
            Self::High
        } else if percentage >= MEDIUM_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Visual tone for this band.
    pub fn tone(&self) -> Tone {
        match self {
            Self::High => Tone::Success,
            Self::Medium => Tone::Warning,
            Self::Low => Tone::Error,
        }
    }
}

/// Visual tone of a badge or progress indicator.
///
/// Mirrors the frontend's color palette; serialized as the lowercase palette
/// name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Success,
    Error,
    Warning,
    Primary,
    Muted,
    Secondary,
}

/// Percentage of `covered` out of `total`, rounded half away from zero.
///
/// Returns 0 when `total` is 0: an empty metric pair reads as "nothing
/// covered", not as an error. Assumes `covered <= total`; the result is not
/// clamped for over-counts.
pub fn coverage_percentage(covered: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    ((covered as f64 / total as f64) * 100.0).round() as i64
}

/// Percentage form of a 0.0–1.0 ratio (e.g. the aggregate `lineRate`),
/// rounded half away from zero. Non-finite ratios read as 0.
pub fn rate_percentage(rate: f64) -> i64 {
    if !rate.is_finite() {
        return 0;
    }
    (rate * 100.0).round() as i64
}

/// Pass rate of a test run: passed tests (`total - failures - errors`) as a
/// percentage of `total`, rounded half away from zero.
///
/// Returns 0 when `total` is 0. The result is clamped to [0, 100]:
/// inconsistent upstream counters (`failures + errors > total`) would
/// otherwise produce a negative rate, and a progress bar cannot render one.
pub fn test_pass_rate(total: i64, failures: i64, errors: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    let passed = total - failures - errors;
    let rate = ((passed as f64 / total as f64) * 100.0).round() as i64;
    rate.clamp(0, 100)
}
