//! Monitoring loop: acquisition, ingestion and classification per tick.
//!
//! The monitor is the single owner of the sample history and the event log.
//! Readers (export, reporting) get snapshots through the shared handles.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use fading_core::{Error, Event, Result, Sample, Timestamp};

use crate::acquisition::SignalSource;
use crate::classifier::{FadingClassifier, FadingThresholds};
use crate::history::SampleHistory;
use crate::reading::RawReading;

/// Configuration for the monitoring loop
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Classification thresholds
    pub thresholds: FadingThresholds,

    /// Time between polls
    pub poll_interval: Duration,

    /// Samples handed to reporting alongside an event
    pub report_context_len: usize,

    /// Output queue size
    pub event_queue_size: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            thresholds: FadingThresholds::default(),
            poll_interval: Duration::from_millis(500),
            report_context_len: 40,
            event_queue_size: 256,
        }
    }
}

impl MonitorConfig {
    pub fn with_poll_interval_secs(mut self, secs: f64) -> Self {
        self.poll_interval = Duration::from_secs_f64(secs.max(0.001));
        self
    }
}

/// The fading monitor
pub struct FadingMonitor {
    config: MonitorConfig,
    classifier: FadingClassifier,
    history: Arc<RwLock<SampleHistory>>,
    events: Arc<RwLock<Vec<Event>>>,
    paused: Arc<AtomicBool>,
}

impl FadingMonitor {
    pub fn new(config: MonitorConfig) -> Self {
        let classifier = FadingClassifier::new(config.thresholds);

        Self {
            config,
            classifier,
            history: Arc::new(RwLock::new(SampleHistory::new())),
            events: Arc::new(RwLock::new(Vec::new())),
            paused: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Ingest one reading taken at `timestamp`.
    ///
    /// An unavailable reading skips the tick and leaves the history
    /// untouched. A malformed reading is rejected with an error, also without
    /// touching the history.
    pub fn ingest(&mut self, reading: RawReading, timestamp: Timestamp) -> Result<Option<Event>> {
        match reading.into_sample(timestamp) {
            Ok(sample) => Ok(self.record(sample)),
            Err(Error::AcquisitionUnavailable) => {
                tracing::warn!("Interface unavailable, skipping tick");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Append a validated sample and classify it.
    pub fn record(&mut self, sample: Sample) -> Option<Event> {
        let event = {
            let mut history = self.history.write();
            history.append(sample);
            self.classifier.evaluate(&history)
        };

        tracing::debug!(
            rssi = sample.rssi,
            channel = sample.channel,
            band = %sample.band,
            "Sample recorded"
        );

        if let Some(event) = event {
            tracing::info!(
                kind = %event.kind,
                rssi = event.rssi,
                channel = event.channel,
                "Fading event at {}",
                event.timestamp
            );
            self.events.write().push(event);
        }

        event
    }

    /// Poll `source` once and ingest the reading.
    ///
    /// Acquisition failures and a paused monitor skip the tick.
    pub async fn poll_once<S: SignalSource + ?Sized>(
        &mut self,
        source: &mut S,
    ) -> Result<Option<Event>> {
        if self.is_paused() {
            tracing::debug!("Monitor paused, skipping tick");
            return Ok(None);
        }

        let reading = match source.read().await {
            Ok(reading) => reading,
            Err(e) if e.is_skippable() => {
                tracing::warn!("Acquisition error from {}: {}", source.name(), e);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        self.ingest(reading, Timestamp::now())
    }

    /// Run the monitor on a background task.
    ///
    /// Events are delivered on the returned channel. The task keeps polling
    /// until [`MonitorHandle::stop`] is called or either end is dropped. A
    /// full event queue does not block shutdown.
    pub fn start_streaming<S: SignalSource + 'static>(
        self,
        mut source: S,
    ) -> (mpsc::Receiver<Event>, MonitorHandle) {
        let (tx, rx) = mpsc::channel(self.config.event_queue_size);

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let history = self.history.clone();
        let events = self.events.clone();
        let paused = self.paused.clone();
        let interval = self.config.poll_interval;

        tracing::info!(
            "Starting monitor on {} source, polling every {:?}",
            source.name(),
            interval
        );

        let task = tokio::spawn(async move {
            let mut monitor = self;
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = stop_rx.changed() => break,
                    _ = ticker.tick() => {}
                }

                match monitor.poll_once(&mut source).await {
                    Ok(Some(event)) => {
                        tokio::select! {
                            biased;
                            _ = stop_rx.changed() => break,
                            sent = tx.send(event) => {
                                if sent.is_err() {
                                    break; // Receiver dropped
                                }
                            }
                        }
                    }
                    Ok(None) => continue,
                    Err(e) => {
                        tracing::warn!("Rejected reading: {}", e);
                    }
                }
            }

            tracing::info!("Monitor stopped after {} samples", monitor.sample_count());
            monitor
        });

        let handle = MonitorHandle {
            stop_tx,
            paused,
            history,
            events,
            task,
        };

        (rx, handle)
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Discard all samples and events
    pub fn clear(&mut self) {
        self.history.write().clear();
        self.events.write().clear();
    }

    /// Copy of the full history, oldest first
    pub fn snapshot(&self) -> Vec<Sample> {
        self.history.read().as_slice().to_vec()
    }

    /// Copy of the most recent `n` samples, oldest first
    pub fn recent(&self, n: usize) -> Vec<Sample> {
        self.history.read().tail(n).to_vec()
    }

    /// Up to `n` samples ending with the one taken at `timestamp`
    pub fn recent_until(&self, timestamp: Timestamp, n: usize) -> Vec<Sample> {
        self.history.read().tail_until(timestamp, n).to_vec()
    }

    /// Samples handed to reporting alongside an event
    pub fn report_context(&self) -> Vec<Sample> {
        self.recent(self.config.report_context_len)
    }

    /// Copy of the event log, oldest first
    pub fn events(&self) -> Vec<Event> {
        self.events.read().clone()
    }

    pub fn last_event(&self) -> Option<Event> {
        self.events.read().last().copied()
    }

    pub fn event_count(&self) -> usize {
        self.events.read().len()
    }

    pub fn sample_count(&self) -> usize {
        self.history.read().size()
    }

    /// Shared read access to the history
    pub fn history_handle(&self) -> Arc<RwLock<SampleHistory>> {
        self.history.clone()
    }

    /// Get current configuration
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }
}

impl Default for FadingMonitor {
    fn default() -> Self {
        Self::new(MonitorConfig::default())
    }
}

/// Control handle for a monitor running on a background task
pub struct MonitorHandle {
    stop_tx: watch::Sender<bool>,
    paused: Arc<AtomicBool>,
    history: Arc<RwLock<SampleHistory>>,
    events: Arc<RwLock<Vec<Event>>>,
    task: JoinHandle<FadingMonitor>,
}

impl MonitorHandle {
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Copy of the full history so far
    pub fn snapshot(&self) -> Vec<Sample> {
        self.history.read().as_slice().to_vec()
    }

    /// Copy of the most recent `n` samples
    pub fn recent(&self, n: usize) -> Vec<Sample> {
        self.history.read().tail(n).to_vec()
    }

    /// Up to `n` samples ending with the one taken at `timestamp`.
    ///
    /// Lets a lagging consumer rebuild the history as it was when an event
    /// fired.
    pub fn recent_until(&self, timestamp: Timestamp, n: usize) -> Vec<Sample> {
        self.history.read().tail_until(timestamp, n).to_vec()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.read().clone()
    }

    /// Stop polling and take the monitor back.
    pub async fn stop(self) -> Result<FadingMonitor> {
        // Err only means the task already exited.
        let _ = self.stop_tx.send(true);
        self.task
            .await
            .map_err(|e| Error::Acquisition(format!("monitor task failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::ScriptedSource;
    use fading_core::{Band, EventKind};

    fn ts(i: i64) -> Timestamp {
        Timestamp::from_millis(i * 500)
    }

    #[test]
    fn test_ingest_classifies_each_sample() {
        let mut monitor = FadingMonitor::default();

        let kinds: Vec<Option<EventKind>> = [-40, -46, -40, -47, -41]
            .iter()
            .enumerate()
            .map(|(i, &rssi)| {
                monitor
                    .ingest(RawReading::new(rssi, 6, Band::Band2_4GHz), ts(i as i64))
                    .unwrap()
                    .map(|e| e.kind)
            })
            .collect();

        assert_eq!(
            kinds,
            vec![
                None,
                Some(EventKind::ModerateVariation),
                Some(EventKind::ModerateVariation),
                Some(EventKind::ModerateVariation),
                Some(EventKind::MultipathFading),
            ]
        );
        assert_eq!(monitor.event_count(), 4);
        assert_eq!(monitor.last_event().map(|e| e.kind), Some(EventKind::MultipathFading));
    }

    #[test]
    fn test_unavailable_reading_skips_tick() {
        let mut monitor = FadingMonitor::default();
        monitor
            .ingest(RawReading::new(-40, 6, Band::Band2_4GHz), ts(0))
            .unwrap();

        let result = monitor.ingest(RawReading::unavailable(), ts(1)).unwrap();
        assert!(result.is_none());
        assert_eq!(monitor.sample_count(), 1);

        // The next real sample is compared to the last real one.
        let event = monitor
            .ingest(RawReading::new(-52, 6, Band::Band2_4GHz), ts(2))
            .unwrap();
        assert_eq!(event.map(|e| e.kind), Some(EventKind::FastFading));
    }

    #[test]
    fn test_malformed_reading_is_rejected() {
        let mut monitor = FadingMonitor::default();
        let result = monitor.ingest(RawReading::new(15, 6, Band::Band2_4GHz), ts(0));

        assert!(matches!(result, Err(Error::MalformedSample(_))));
        assert_eq!(monitor.sample_count(), 0);
    }

    #[test]
    fn test_clear_resets_history_and_events() {
        let mut monitor = FadingMonitor::default();
        for (i, rssi) in [-40, -52].into_iter().enumerate() {
            monitor
                .ingest(RawReading::new(rssi, 6, Band::Band2_4GHz), ts(i as i64))
                .unwrap();
        }
        assert_eq!(monitor.event_count(), 1);

        monitor.clear();
        assert_eq!(monitor.sample_count(), 0);
        assert_eq!(monitor.event_count(), 0);
        assert!(monitor.snapshot().is_empty());
    }

    #[test]
    fn test_report_context_is_bounded() {
        let config = MonitorConfig {
            report_context_len: 3,
            ..Default::default()
        };
        let mut monitor = FadingMonitor::new(config);
        for i in 0..10 {
            monitor
                .ingest(RawReading::new(-50, 6, Band::Band2_4GHz), ts(i))
                .unwrap();
        }

        assert_eq!(monitor.report_context().len(), 3);
        assert_eq!(monitor.snapshot().len(), 10);
    }

    #[tokio::test]
    async fn test_paused_monitor_skips_polls() {
        let mut monitor = FadingMonitor::default();
        let mut source = ScriptedSource::from_rssi(&[-40, -52], 6);

        monitor.pause();
        assert!(monitor.poll_once(&mut source).await.unwrap().is_none());
        assert_eq!(monitor.sample_count(), 0);
        assert_eq!(source.remaining(), 2);

        monitor.resume();
        monitor.poll_once(&mut source).await.unwrap();
        let event = monitor.poll_once(&mut source).await.unwrap();
        assert_eq!(event.map(|e| e.kind), Some(EventKind::FastFading));
    }

    #[tokio::test]
    async fn test_acquisition_error_skips_tick() {
        let mut monitor = FadingMonitor::default();
        let mut source = ScriptedSource::default();

        assert!(monitor.poll_once(&mut source).await.unwrap().is_none());
        assert_eq!(monitor.sample_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_streaming_delivers_events() {
        let config = MonitorConfig::default().with_poll_interval_secs(0.1);
        let monitor = FadingMonitor::new(config);
        let source = ScriptedSource::from_rssi(&[-40, -42, -44, -46, -48, -48], 36);

        let (mut rx, handle) = monitor.start_streaming(source);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.kind, EventKind::SlowFading);
        assert_eq!(first.rssi, -48);
        assert_eq!(first.band, Band::Band5GHz);

        let monitor = handle.stop().await.unwrap();
        assert!(monitor.sample_count() >= 5);
        assert_eq!(monitor.event_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_with_full_event_queue() {
        let config = MonitorConfig {
            event_queue_size: 1,
            ..Default::default()
        }
        .with_poll_interval_secs(0.01);
        let monitor = FadingMonitor::new(config);
        let source = ScriptedSource::from_rssi(&[-40, -52, -40, -52, -40, -52], 6);

        // Held but never drained.
        let (_rx, handle) = monitor.start_streaming(source);
        tokio::time::sleep(Duration::from_millis(200)).await;

        let stopped = tokio::time::timeout(Duration::from_secs(2), handle.stop()).await;
        let monitor = stopped.expect("stop blocked on a full queue").unwrap();
        assert!(monitor.event_count() >= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_pause_stops_appending() {
        let config = MonitorConfig::default().with_poll_interval_secs(0.5);
        let monitor = FadingMonitor::new(config);
        let rssi: Vec<i32> = (0..40).map(|i| if i % 2 == 0 { -40 } else { -52 }).collect();
        let source = ScriptedSource::from_rssi(&rssi, 6);

        let (mut rx, handle) = monitor.start_streaming(source);
        let first = rx.recv().await.unwrap();
        assert_eq!(first.kind, EventKind::FastFading);

        handle.pause();
        assert!(handle.is_paused());
        let paused_at = handle.snapshot().len();
        let events_at = handle.events().len();
        assert!(paused_at >= 2);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(handle.snapshot().len(), paused_at);
        assert_eq!(handle.events().len(), events_at);

        handle.resume();
        assert!(!handle.is_paused());
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(handle.snapshot().len() > paused_at);
        assert_eq!(handle.recent(2).len(), 2);

        let fired = handle.recent_until(first.timestamp, 40);
        assert_eq!(fired.last().map(|s| s.timestamp), Some(first.timestamp));
        assert_eq!(fired.len(), 2);

        drop(rx);
        let monitor = handle.stop().await.unwrap();
        assert!(monitor.sample_count() > paused_at);
    }
}
