//! Easing curves for time-based overlay fades
//!
//! Curves map normalized fade progress (0.0 at fade start, 1.0 at fade end)
//! to a blend factor. Progress is derived from elapsed wall-clock time, so a
//! fade lasts the same duration at any frame rate.

use serde::{Deserialize, Serialize};

/// Fade curve types for opacity animation
///
/// - Linear: constant rate of change
/// - Exponential: slow start, fast finish
/// - Logarithmic: fast start, slow finish
/// - SCurve: smooth acceleration and deceleration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeCurve {
    /// v(t) = t
    Linear,

    /// v(t) = t²
    Exponential,

    /// v(t) = 1 - (1-t)²
    Logarithmic,

    /// v(t) = 0.5 × (1 - cos(π × t))
    #[default]
    SCurve,
}

impl FadeCurve {
    /// Blend factor at normalized progress `t`
    ///
    /// Input is clamped to `0.0..=1.0`; output is 0.0 at the start of the
    /// fade and 1.0 at its end.
    pub fn progress(&self, t: f32) -> f32 {
        let t = if t.is_nan() { 1.0 } else { t.clamp(0.0, 1.0) };

        match self {
            FadeCurve::Linear => t,
            FadeCurve::Exponential => t * t,
            FadeCurve::Logarithmic => {
                let inv = 1.0 - t;
                1.0 - inv * inv
            }
            FadeCurve::SCurve => 0.5 * (1.0 - (std::f32::consts::PI * t).cos()),
        }
    }

    /// Interpolate from `from` to `to` along this curve
    pub fn interpolate(&self, from: f32, to: f32, t: f32) -> f32 {
        from + (to - from) * self.progress(t)
    }

    /// Canonical config string
    pub fn as_str(&self) -> &'static str {
        match self {
            FadeCurve::Linear => "linear",
            FadeCurve::Exponential => "exponential",
            FadeCurve::Logarithmic => "logarithmic",
            FadeCurve::SCurve => "s_curve",
        }
    }
}

impl std::fmt::Display for FadeCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [FadeCurve; 4] = [
        FadeCurve::Linear,
        FadeCurve::Exponential,
        FadeCurve::Logarithmic,
        FadeCurve::SCurve,
    ];

    #[test]
    fn test_progress_endpoints() {
        for curve in ALL {
            assert!(curve.progress(0.0).abs() < 1e-6, "{} at 0", curve);
            assert!((curve.progress(1.0) - 1.0).abs() < 1e-6, "{} at 1", curve);
        }
    }

    #[test]
    fn test_progress_clamps_out_of_range() {
        for curve in ALL {
            assert_eq!(curve.progress(-3.0), curve.progress(0.0));
            assert_eq!(curve.progress(7.5), curve.progress(1.0));
        }
    }

    #[test]
    fn test_progress_is_monotonic() {
        for curve in ALL {
            let mut last = 0.0;
            for step in 0..=100 {
                let value = curve.progress(step as f32 / 100.0);
                assert!(value + 1e-6 >= last, "{} not monotonic at {}", curve, step);
                last = value;
            }
        }
    }

    #[test]
    fn test_interpolate_fade_out() {
        let curve = FadeCurve::Linear;
        assert_eq!(curve.interpolate(1.0, 0.0, 0.0), 1.0);
        assert_eq!(curve.interpolate(1.0, 0.0, 0.25), 0.75);
        assert_eq!(curve.interpolate(1.0, 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_default_is_s_curve() {
        assert_eq!(FadeCurve::default(), FadeCurve::SCurve);
    }
}
