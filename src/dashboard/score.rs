//! Score interpretation: percentage, bands, gauge colors.
//!
//! The scoring service returns a raw agri score on a 0–850 scale. The
//! dashboard shows `raw / 850 * 100` without clamping; only the band and
//! color lookups fold out-of-range values into the nearest band.

use serde::Serialize;
use serde_json::Value;

use super::gauge;

/// Top of the agri score scale.
pub const MAX_SCORE: f64 = 850.0;

/// Percentage at or above which a score is excellent.
pub const EXCELLENT_THRESHOLD: f64 = 70.0;

/// Percentage at or above which a score is moderate.
pub const MODERATE_THRESHOLD: f64 = 40.0;

pub const GREEN: &str = "#10b981";
pub const AMBER: &str = "#f59e0b";
pub const RED: &str = "#ef4444";

/// Convert a raw agri score to a display percentage.
pub fn percentage(raw: f64) -> f64 {
    raw / MAX_SCORE * 100.0
}

/// Gauge color for a percentage.
pub fn gauge_color(percentage: f64) -> &'static str {
    if percentage >= EXCELLENT_THRESHOLD {
        GREEN
    } else if percentage >= MODERATE_THRESHOLD {
        AMBER
    } else {
        RED
    }
}

/// Qualitative interpretation of a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Excellent,
    Moderate,
    Limited,
    NoData,
}

impl Band {
    /// Total over all inputs: anything not strictly positive (including NaN)
    /// is [`Band::NoData`].
    pub fn for_percentage(percentage: f64) -> Self {
        if percentage >= EXCELLENT_THRESHOLD {
            Self::Excellent
        } else if percentage >= MODERATE_THRESHOLD {
            Self::Moderate
        } else if percentage > 0.0 {
            Self::Limited
        } else {
            Self::NoData
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent Potential",
            Self::Moderate => "Moderate Potential",
            Self::Limited => "Limited Potential",
            Self::NoData => "No Data",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Excellent => "High yield and investment return expected",
            Self::Moderate => "Reasonable yield with moderate investment",
            Self::Limited => "Consider alternative crops or methods",
            Self::NoData => "Submit data to see potential",
        }
    }
}

/// The scoring service's answer as the dashboard reads it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreResult {
    pub agri_score: f64,
}

impl ScoreResult {
    /// Read `agri_score` from a response body. Missing, null or non-numeric
    /// values read as zero; numeric strings are accepted.
    pub fn from_value(body: &Value) -> Self {
        let agri_score = match body.get("agri_score") {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
            _ => 0.0,
        };
        Self {
            agri_score: if agri_score.is_finite() { agri_score } else { 0.0 },
        }
    }

    pub fn percentage(&self) -> f64 {
        percentage(self.agri_score)
    }
}

/// Format a raw score the way the gauge prints it: integers without a
/// decimal point, other values as-is.
pub fn format_raw(raw: f64) -> String {
    if raw == 0.0 {
        // also folds -0.0
        "0".to_string()
    } else {
        format!("{raw}")
    }
}

/// Everything the result panel needs to draw one score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreView {
    pub raw_score: f64,
    pub raw_display: String,
    pub percentage: f64,
    pub percentage_display: String,
    pub color: &'static str,
    pub band: Band,
    pub label: &'static str,
    pub description: &'static str,
    pub gauge_svg: String,
}

impl ScoreView {
    /// View for a raw score and its already-computed percentage.
    pub fn new(raw_score: f64, percentage: f64) -> Self {
        let band = Band::for_percentage(percentage);
        Self {
            raw_score,
            raw_display: format_raw(raw_score),
            percentage,
            percentage_display: format!("{percentage:.1}"),
            color: gauge_color(percentage),
            band,
            label: band.label(),
            description: band.description(),
            gauge_svg: gauge::svg(raw_score, percentage),
        }
    }

    pub fn from_raw(raw_score: f64) -> Self {
        Self::new(raw_score, percentage(raw_score))
    }

    /// The zero/no-data view shown before a submission and after an error.
    pub fn empty() -> Self {
        Self::new(0.0, 0.0)
    }
}
