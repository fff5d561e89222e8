//! Gauge rendering: SVG for the web page, a colored bar for the terminal.
//!
//! The SVG gauge is a half-circle track drawn in a `0 0 100 100` viewBox.
//! The active track is the same path with a dash pattern whose visible
//! length is the score percentage of the arc.

use std::f64::consts::PI;

use colored::Colorize;

use super::score::{self, AMBER, GREEN, format_raw};

/// Half-circle from (10,70) to (90,70) around (50,70), radius 40.
pub const ARC_PATH: &str = "M 10 70 A 40 40 0 1 1 90 70";

/// Length of [`ARC_PATH`].
pub const ARC_LENGTH: f64 = 40.0 * PI;

const TRACK_COLOR: &str = "#e5e7eb";

/// Visible dash length for a percentage, clamped to the arc.
pub fn filled_length(percentage: f64) -> f64 {
    if percentage.is_nan() {
        return 0.0;
    }
    (percentage / 100.0 * ARC_LENGTH).clamp(0.0, ARC_LENGTH)
}

/// Render the gauge as an inline SVG element.
pub fn svg(raw_score: f64, percentage: f64) -> String {
    let color = score::gauge_color(percentage);
    let filled = filled_length(percentage);
    let raw = format_raw(raw_score);

    format!(
        r##"<svg class="gauge" viewBox="0 0 100 100" role="img" aria-label="Score {raw}">
  <path d="{ARC_PATH}" fill="none" stroke="{TRACK_COLOR}" stroke-width="10" stroke-linecap="round"/>
  <path class="gauge-fill" d="{ARC_PATH}" fill="none" stroke="{color}" stroke-width="10" stroke-linecap="round" stroke-dasharray="{filled:.2} {ARC_LENGTH:.2}"/>
  <circle cx="50" cy="70" r="5" fill="white"/>
  <text class="gauge-value" x="50" y="60" font-family="sans-serif" font-size="20" text-anchor="middle" fill="currentColor">{raw}</text>
  <text x="50" y="78" font-family="sans-serif" font-size="10" text-anchor="middle" fill="gray">Score</text>
</svg>"##
    )
}

/// Render the gauge as a fixed-width terminal bar, e.g.
/// `[████████████████████████░░░░░░]  80.0%`.
pub fn terminal_bar(percentage: f64, width: usize) -> String {
    let fraction = if percentage.is_nan() {
        0.0
    } else {
        (percentage / 100.0).clamp(0.0, 1.0)
    };
    let filled = (fraction * width as f64).round() as usize;
    let bar = "█".repeat(filled);
    let rest = "░".repeat(width - filled);

    let colored_bar = match score::gauge_color(percentage) {
        GREEN => bar.green(),
        AMBER => bar.yellow(),
        _ => bar.red(),
    };

    format!("[{}{}] {:>5.1}%", colored_bar, rest.dimmed(), percentage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filled_length_is_proportional() {
        assert_eq!(filled_length(0.0), 0.0);
        assert!((filled_length(50.0) - ARC_LENGTH / 2.0).abs() < 1e-9);
        assert!((filled_length(100.0) - ARC_LENGTH).abs() < 1e-9);
    }

    #[test]
    fn filled_length_clamps_to_arc() {
        assert_eq!(filled_length(150.0), ARC_LENGTH);
        assert_eq!(filled_length(-20.0), 0.0);
        assert_eq!(filled_length(f64::NAN), 0.0);
    }

    #[test]
    fn svg_carries_score_and_color() {
        let svg = svg(680.0, 80.0);
        assert!(svg.contains(">680</text>"));
        assert!(svg.contains(r#"<text class="gauge-value""#));
        assert!(svg.contains(r##"stroke="#10b981""##));
        assert!(svg.contains(ARC_PATH));
        assert!(svg.contains(">Score</text>"));
    }

    #[test]
    fn svg_zero_state_has_empty_fill() {
        let svg = svg(0.0, 0.0);
        assert!(svg.contains(">0</text>"));
        assert!(svg.contains(r#"stroke-dasharray="0.00 125.66""#));
    }

    #[test]
    fn terminal_bar_width_is_fixed() {
        colored::control::set_override(false);
        let bar = terminal_bar(80.0, 10);
        assert_eq!(bar, "[████████░░]  80.0%");
        let bar = terminal_bar(140.0, 10);
        assert_eq!(bar, "[██████████] 140.0%");
        let bar = terminal_bar(-3.0, 4);
        assert_eq!(bar, "[░░░░]  -3.0%");
    }
}
