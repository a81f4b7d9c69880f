//! Context handed to narrators alongside an event.

use fading_core::{Event, Sample};
use serde::{Deserialize, Serialize};

/// Samples preceding an event that narrators look at
pub const DEFAULT_CONTEXT_SAMPLES: usize = 40;

/// Event plus the recent signal history that led to it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportContext {
    pub event: Event,
    /// Most recent samples, oldest first, ending with the triggering sample
    pub recent: Vec<Sample>,
    /// Change from the previous sample to the triggering one (dBm)
    pub delta_dbm: i32,
    /// Drop from the start of the five-sample window to the triggering sample (dBm)
    pub window_drop_dbm: i32,
    pub min_rssi: i32,
    pub max_rssi: i32,
    pub mean_rssi: f64,
}

impl ReportContext {
    /// Build a context from an event and the history tail.
    ///
    /// Samples after the triggering one are ignored, and only the last
    /// [`DEFAULT_CONTEXT_SAMPLES`] are kept.
    pub fn new(event: Event, history: &[Sample]) -> Self {
        Self::with_len(event, history, DEFAULT_CONTEXT_SAMPLES)
    }

    pub fn with_len(event: Event, history: &[Sample], len: usize) -> Self {
        let end = history
            .iter()
            .rposition(|s| s.timestamp == event.timestamp)
            .map_or(history.len(), |i| i + 1);
        let start = end.saturating_sub(len);
        let recent = history[start..end].to_vec();

        let delta_dbm = match recent.as_slice() {
            [.., prev, curr] => curr.rssi.saturating_sub(prev.rssi),
            _ => 0,
        };

        let window = &recent[recent.len().saturating_sub(5)..];
        let window_drop_dbm = match (window.first(), window.last()) {
            (Some(first), Some(last)) => first.rssi.saturating_sub(last.rssi),
            _ => 0,
        };

        let min_rssi = recent.iter().map(|s| s.rssi).min().unwrap_or(event.rssi);
        let max_rssi = recent.iter().map(|s| s.rssi).max().unwrap_or(event.rssi);
        let mean_rssi = if recent.is_empty() {
            event.rssi as f64
        } else {
            recent.iter().map(|s| s.rssi as f64).sum::<f64>() / recent.len() as f64
        };

        Self {
            event,
            recent,
            delta_dbm,
            window_drop_dbm,
            min_rssi,
            max_rssi,
            mean_rssi,
        }
    }

    /// Peak-to-peak variation across the context (dBm)
    pub fn span_dbm(&self) -> i32 {
        self.max_rssi.saturating_sub(self.min_rssi)
    }
}
