//! Append-only log of signal samples.

use fading_core::{Sample, Timestamp};

/// Ordered log of samples for one monitoring session.
///
/// Insertion order is chronological order. Nothing is evicted: the
/// classifier looks at the tail, export and reporting read the whole log.
#[derive(Debug, Clone, Default)]
pub struct SampleHistory {
    samples: Vec<Sample>,
}

impl SampleHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample to the end of the log.
    ///
    /// No plausibility check happens here; implausible readings are the
    /// ingestion boundary's concern.
    pub fn append(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    /// The most recent `n` samples, oldest first.
    ///
    /// Returns fewer than `n` when the history is shorter.
    pub fn tail(&self, n: usize) -> &[Sample] {
        let start = self.samples.len().saturating_sub(n);
        &self.samples[start..]
    }

    /// Up to `n` samples ending with the newest one taken at `timestamp`.
    ///
    /// Empty when no sample carries that timestamp.
    pub fn tail_until(&self, timestamp: Timestamp, n: usize) -> &[Sample] {
        match self.samples.iter().rposition(|s| s.timestamp == timestamp) {
            Some(i) => {
                let end = i + 1;
                &self.samples[end.saturating_sub(n)..end]
            }
            None => &[],
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn size(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.last()
    }

    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }
}

impl Extend<Sample> for SampleHistory {
    fn extend<T: IntoIterator<Item = Sample>>(&mut self, iter: T) {
        self.samples.extend(iter);
    }
}

impl FromIterator<Sample> for SampleHistory {
    fn from_iter<T: IntoIterator<Item = Sample>>(iter: T) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fading_core::Band;

    fn sample(i: i64, rssi: i32) -> Sample {
        Sample::new(Timestamp::from_millis(i * 500), rssi, 6, Band::Band2_4GHz)
    }

    #[test]
    fn test_tail_returns_most_recent_oldest_first() {
        let history: SampleHistory = (0..8).map(|i| sample(i, -40 - i as i32)).collect();

        let tail = history.tail(3);
        let rssi: Vec<i32> = tail.iter().map(|s| s.rssi).collect();
        assert_eq!(rssi, vec![-45, -46, -47]);
    }

    #[test]
    fn test_tail_shorter_than_requested() {
        let mut history = SampleHistory::new();
        history.append(sample(0, -40));
        history.append(sample(1, -41));

        assert_eq!(history.tail(5).len(), 2);
        assert_eq!(history.tail(0).len(), 0);
    }

    #[test]
    fn test_tail_of_empty_history() {
        let history = SampleHistory::new();
        assert!(history.tail(5).is_empty());
        assert!(history.latest().is_none());
    }

    #[test]
    fn test_tail_until_ends_at_timestamp() {
        let history: SampleHistory = (0..10).map(|i| sample(i, -40 - i as i32)).collect();

        let rssi: Vec<i32> = history
            .tail_until(sample(4, 0).timestamp, 3)
            .iter()
            .map(|s| s.rssi)
            .collect();
        assert_eq!(rssi, vec![-42, -43, -44]);

        assert_eq!(history.tail_until(sample(1, 0).timestamp, 5).len(), 2);
        assert!(history.tail_until(sample(42, 0).timestamp, 5).is_empty());
    }

    #[test]
    fn test_implausible_rssi_is_still_recorded() {
        let mut history = SampleHistory::new();
        history.append(sample(0, 25));
        assert_eq!(history.size(), 1);
        assert_eq!(history.latest().map(|s| s.rssi), Some(25));
    }

    #[test]
    fn test_clear_resets_to_empty() {
        let mut history: SampleHistory = (0..4).map(|i| sample(i, -50)).collect();
        history.clear();

        assert_eq!(history.size(), 0);
        assert!(history.tail(5).is_empty());

        history.append(sample(5, -48));
        assert_eq!(history.tail(5).len(), 1);
    }
}
