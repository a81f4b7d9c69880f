//! End-to-end checks: readings in, events and exports out.

use fading_core::{Band, EventKind, Timestamp};
use fading_detect::{
    write_joined_csv, FadingMonitor, FadingThresholds, MonitorConfig, RawReading, ScriptedSource,
};

fn run(rssi: &[i32]) -> Vec<Option<EventKind>> {
    let mut monitor = FadingMonitor::default();
    rssi.iter()
        .enumerate()
        .map(|(i, &r)| {
            monitor
                .ingest(
                    RawReading::new(r, 11, Band::Band2_4GHz),
                    Timestamp::from_millis(i as i64 * 500),
                )
                .unwrap()
                .map(|e| e.kind)
        })
        .collect()
}

#[test]
fn scenario_outcomes_on_last_sample() {
    let cases: [(&[i32], Option<EventKind>); 5] = [
        (&[-40, -39], None),
        (&[-40, -52], Some(EventKind::FastFading)),
        (&[-40, -42, -44, -46, -48], Some(EventKind::SlowFading)),
        (&[-40, -46, -40, -47, -41], Some(EventKind::MultipathFading)),
        (&[-40, -46], Some(EventKind::ModerateVariation)),
    ];

    for (rssi, expected) in cases {
        let outcomes = run(rssi);
        assert_eq!(outcomes.last().copied().flatten(), expected, "sequence {rssi:?}");
    }
}

#[test]
fn fast_fading_wins_over_every_other_rule() {
    // Monotonic drop of 18 over five samples, last step 10.
    let outcomes = run(&[-40, -42, -44, -48, -58]);
    assert_eq!(outcomes.last().copied().flatten(), Some(EventKind::FastFading));
}

#[test]
fn shadowing_reported_on_consecutive_ticks() {
    let outcomes = run(&[-40, -42, -44, -46, -48, -50, -52]);
    assert_eq!(
        &outcomes[4..],
        &[
            Some(EventKind::SlowFading),
            Some(EventKind::SlowFading),
            Some(EventKind::SlowFading),
        ]
    );
}

#[test]
fn disconnected_ticks_do_not_break_the_window() {
    let mut monitor = FadingMonitor::default();
    let readings = [
        RawReading::new(-40, 6, Band::Band2_4GHz),
        RawReading::unavailable(),
        RawReading::new(-42, 6, Band::Band2_4GHz),
        RawReading::new(-44, 6, Band::Band2_4GHz),
        RawReading::unavailable(),
        RawReading::new(-46, 6, Band::Band2_4GHz),
        RawReading::new(-48, 6, Band::Band2_4GHz),
    ];

    let mut last = None;
    for (i, reading) in readings.into_iter().enumerate() {
        last = monitor
            .ingest(reading, Timestamp::from_millis(i as i64 * 500))
            .unwrap();
    }

    assert_eq!(monitor.sample_count(), 5);
    assert_eq!(last.map(|e| e.kind), Some(EventKind::SlowFading));
}

#[test]
fn thresholds_are_injected_per_monitor() {
    let strict = MonitorConfig {
        thresholds: FadingThresholds {
            fast_fading_threshold: 20,
            moderate_variation_threshold: 15,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut strict = FadingMonitor::new(strict);
    let mut default = FadingMonitor::default();

    for (i, rssi) in [-40, -52].into_iter().enumerate() {
        let ts = Timestamp::from_millis(i as i64);
        let reading = RawReading::new(rssi, 6, Band::Band2_4GHz);
        strict.ingest(reading, ts).unwrap();
        default.ingest(reading, ts).unwrap();
    }

    assert_eq!(strict.event_count(), 0);
    assert_eq!(default.event_count(), 1);
}

#[tokio::test]
async fn polled_session_exports_joined_table() {
    let mut monitor = FadingMonitor::default();
    let mut source = ScriptedSource::from_rssi(&[-50, -51, -63, -62], 149);

    while !source.is_exhausted() {
        monitor.poll_once(&mut source).await.unwrap();
    }

    let mut buf = Vec::new();
    write_joined_csv(&mut buf, &monitor.snapshot(), &monitor.events()).unwrap();
    let text = String::from_utf8(buf).unwrap();

    let rows: Vec<&str> = text.lines().skip(1).collect();
    assert_eq!(rows.len(), 4);
    assert!(rows[2].ends_with(",-63,149,5GHz,Fast Fading"));
    assert!(rows[3].contains(",-62,149,5GHz"));
    assert_eq!(monitor.event_count(), 1);
}
