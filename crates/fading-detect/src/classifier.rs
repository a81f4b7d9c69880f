//! Rule-based fading classification over the tail of the sample history.
//!
//! Rules are evaluated in a fixed priority order and the first match wins:
//!
//! | priority | kind               | lookback | condition |
//! |----------|--------------------|----------|-----------|
//! | 1        | fast fading        | 2        | `\|Δ\| >= fast` |
//! | 2        | slow fading        | 5        | non-increasing, `first - last >= slow` |
//! | 3        | multipath fading   | 4..=5    | `>= count` sign reversals of magnitude `>= osc` |
//! | 4        | moderate variation | 2        | `moderate <= \|Δ\| < fast` |
//!
//! All thresholds are inclusive lower bounds.

use fading_core::{Error, Event, EventKind, Result, Sample};
use serde::{Deserialize, Serialize};

use crate::history::SampleHistory;

/// Samples inspected for slow and multipath fading.
pub const LOOKBACK_WINDOW: usize = 5;

/// Samples required for the slow fading rule.
pub const SLOW_FADING_WINDOW: usize = 5;

/// Samples required for the multipath rule.
pub const MULTIPATH_MIN_SAMPLES: usize = 4;

/// Classification thresholds, fixed at classifier construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FadingThresholds {
    /// Single-step jump that counts as fast fading (dBm)
    pub fast_fading_threshold: i32,
    /// Smallest single-step change reported as moderate variation (dBm)
    pub moderate_variation_threshold: i32,
    /// Total drop across the slow fading window (dBm)
    pub slow_fading_threshold: i32,
    /// Sign reversals needed for multipath fading
    pub multipath_oscillation_count: usize,
    /// Smallest step that counts as an oscillation (dBm)
    pub multipath_oscillation_threshold: i32,
}

impl Default for FadingThresholds {
    fn default() -> Self {
        Self {
            fast_fading_threshold: 10,
            moderate_variation_threshold: 6,
            slow_fading_threshold: 8,
            multipath_oscillation_count: 3,
            multipath_oscillation_threshold: 5,
        }
    }
}

impl FadingThresholds {
    pub fn validate(&self) -> Result<()> {
        if self.fast_fading_threshold <= 0
            || self.moderate_variation_threshold <= 0
            || self.slow_fading_threshold <= 0
            || self.multipath_oscillation_threshold <= 0
        {
            return Err(Error::Config("thresholds must be positive dBm values".into()));
        }
        if self.moderate_variation_threshold >= self.fast_fading_threshold {
            return Err(Error::Config(format!(
                "moderate variation threshold ({}) must be below fast fading threshold ({})",
                self.moderate_variation_threshold, self.fast_fading_threshold
            )));
        }
        if self.multipath_oscillation_count == 0 {
            return Err(Error::Config(
                "multipath oscillation count must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Stateless classifier: every call is a pure function of the window it sees.
#[derive(Debug, Clone, Default)]
pub struct FadingClassifier {
    thresholds: FadingThresholds,
}

impl FadingClassifier {
    pub fn new(thresholds: FadingThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &FadingThresholds {
        &self.thresholds
    }

    /// Classify the newest sample in `history`.
    ///
    /// Call once per appended sample, after the append.
    pub fn evaluate(&self, history: &SampleHistory) -> Option<Event> {
        self.evaluate_window(history.tail(LOOKBACK_WINDOW))
    }

    /// Classify the last sample of `window` (oldest first).
    ///
    /// Only the last [`LOOKBACK_WINDOW`] samples are considered.
    pub fn evaluate_window(&self, window: &[Sample]) -> Option<Event> {
        let start = window.len().saturating_sub(LOOKBACK_WINDOW);
        let window = &window[start..];

        let kind = self.classify(window)?;
        window.last().map(|curr| Event::from_sample(kind, curr))
    }

    fn classify(&self, window: &[Sample]) -> Option<EventKind> {
        let [.., prev, curr] = window else {
            return None;
        };

        let step = delta(prev, curr).abs();
        if step == 0 {
            return None;
        }

        if step >= i64::from(self.thresholds.fast_fading_threshold) {
            return Some(EventKind::FastFading);
        }

        if self.is_slow_fading(window) {
            return Some(EventKind::SlowFading);
        }

        if self.is_multipath(window) {
            return Some(EventKind::MultipathFading);
        }

        if step >= i64::from(self.thresholds.moderate_variation_threshold) {
            return Some(EventKind::ModerateVariation);
        }

        None
    }

    fn is_slow_fading(&self, window: &[Sample]) -> bool {
        if window.len() != SLOW_FADING_WINDOW {
            return false;
        }

        let non_increasing = window.windows(2).all(|pair| pair[1].rssi <= pair[0].rssi);
        let total_drop = -delta(&window[0], &window[SLOW_FADING_WINDOW - 1]);

        non_increasing && total_drop >= i64::from(self.thresholds.slow_fading_threshold)
    }

    fn is_multipath(&self, window: &[Sample]) -> bool {
        if window.len() < MULTIPATH_MIN_SAMPLES {
            return false;
        }

        oscillation_count(window, self.thresholds.multipath_oscillation_threshold)
            >= self.thresholds.multipath_oscillation_count
    }
}

/// Count consecutive differences that reverse the sign of the previous
/// difference with magnitude at least `min_step`.
///
/// The first difference has no predecessor and never counts.
pub fn oscillation_count(window: &[Sample], min_step: i32) -> usize {
    let deltas: Vec<i64> = window
        .windows(2)
        .map(|pair| delta(&pair[0], &pair[1]))
        .collect();

    deltas
        .windows(2)
        .filter(|pair| {
            pair[0].signum() * pair[1].signum() < 0 && pair[1].abs() >= i64::from(min_step)
        })
        .count()
}

/// RSSI change from `from` to `to`, widened so any pair of readings fits.
fn delta(from: &Sample, to: &Sample) -> i64 {
    i64::from(to.rssi) - i64::from(from.rssi)
}
