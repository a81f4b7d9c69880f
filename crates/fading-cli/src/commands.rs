//! Command implementations.

use anyhow::Context;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Duration;

use fading_core::{Band, Event, Sample, Timestamp};
use fading_detect::{
    write_events_json, write_joined_csv, FadingMonitor, IwLinkSource, MonitorHandle,
    NetshInterfaceSource, RawReading, SignalSource, SimulatedSource,
};
use fading_report::{format_report_prompt, Narrator, ReportContext, TemplateNarrator};

use crate::config::{AppConfig, SourceConfig, SourceKind};
use crate::{ClassifyArgs, RunArgs};

/// Create the signal source described by `config`
pub fn build_source(config: &SourceConfig) -> Box<dyn SignalSource> {
    match config.kind {
        SourceKind::Simulated => match config.seed {
            Some(seed) => Box::new(SimulatedSource::seeded(seed)),
            None => Box::new(SimulatedSource::new()),
        },
        SourceKind::Netsh => match &config.interface {
            Some(name) => Box::new(NetshInterfaceSource::with_interface(name.clone())),
            None => Box::new(NetshInterfaceSource::new()),
        },
        SourceKind::Iw => match &config.interface {
            Some(name) => Box::new(IwLinkSource::with_interface(name.clone())),
            None => Box::new(IwLinkSource::new()),
        },
    }
}

/// Apply command-line overrides on top of the loaded configuration
pub fn apply_overrides(config: &mut AppConfig, args: &RunArgs) -> fading_core::Result<()> {
    if let Some(kind) = args.source {
        config.source.kind = kind;
    }
    if let Some(interface) = &args.interface {
        config.source.interface = Some(interface.clone());
    }
    if let Some(seed) = args.seed {
        config.source.seed = Some(seed);
    }
    if let Some(interval) = args.interval {
        config.monitor.poll_interval_secs = interval;
    }
    config.validate()
}

/// Poll the configured interface until the duration elapses or Ctrl-C.
pub async fn run(mut config: AppConfig, args: RunArgs) -> anyhow::Result<()> {
    apply_overrides(&mut config, &args)?;

    let context_len = config.monitor.report_context_len;
    let source = build_source(&config.source);
    let monitor = FadingMonitor::new(config.monitor_config());
    let narrator = TemplateNarrator::new();

    let (mut rx, handle) = monitor.start_streaming(source);

    let deadline = async {
        match args.duration {
            Some(secs) => tokio::time::sleep(Duration::from_secs_f64(secs.max(0.0))).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);

    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);

    loop {
        tokio::select! {
            maybe_event = rx.recv() => {
                let Some(event) = maybe_event else { break };
                let context = event_context(&handle, event, context_len);
                announce(&narrator, &context, args.show_prompt).await;
            }
            _ = &mut deadline => break,
            _ = &mut interrupt => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    drop(rx);
    let monitor = handle.stop().await?;
    let samples = monitor.snapshot();
    let events = monitor.events();

    print_summary(&samples, &events);
    export(&samples, &events, args.export.as_deref(), args.events_json.as_deref())?;

    Ok(())
}

/// Feed a fixed RSSI sequence through a fresh monitor.
pub async fn classify(config: &AppConfig, args: &ClassifyArgs) -> anyhow::Result<()> {
    let monitor_config = config.monitor_config();
    let step = monitor_config.poll_interval.as_nanos() as i64;
    let context_len = monitor_config.report_context_len;
    let mut monitor = FadingMonitor::new(monitor_config);
    let band = Band::from_channel(args.channel);
    let start = Timestamp::now();

    println!("{:>4}  {:>9}  {:>6}  event", "#", "rssi", "step");

    let mut previous: Option<i32> = None;
    for (i, &rssi) in args.rssi.iter().enumerate() {
        let timestamp = Timestamp::from_nanos(start.as_nanos() + i as i64 * step);
        let reading = RawReading::new(rssi, args.channel, band);

        let (outcome, accepted) = match monitor.ingest(reading, timestamp) {
            Ok(Some(event)) => (event.kind.to_string(), true),
            Ok(None) => ("-".to_string(), true),
            Err(e) => (format!("rejected: {e}"), false),
        };

        let step = match previous {
            Some(prev) if accepted => format!("{:+}", rssi - prev),
            _ => String::new(),
        };
        if accepted {
            previous = Some(rssi);
        }

        println!("{:>4}  {:>5} dBm  {:>6}  {}", i, rssi, step, outcome);
    }

    let narrator = TemplateNarrator::new();
    let history = monitor.snapshot();
    for event in monitor.events() {
        let context = ReportContext::with_len(event, &history, context_len);
        announce(&narrator, &context, false).await;
    }

    print_summary(&history, &monitor.events());
    Ok(())
}

/// Context as it was when `event` fired, however far the monitor has moved on.
fn event_context(handle: &MonitorHandle, event: Event, len: usize) -> ReportContext {
    let recent = handle.recent_until(event.timestamp, len);
    ReportContext::with_len(event, &recent, len)
}

async fn announce(narrator: &TemplateNarrator, context: &ReportContext, show_prompt: bool) {
    match narrator.narrate(context).await {
        Ok(report) => println!("\n{report}"),
        Err(e) => tracing::warn!("Could not narrate {}: {}", context.event.kind, e),
    }

    if show_prompt {
        println!("\n{}", format_report_prompt(context));
    }
}

fn print_summary(samples: &[Sample], events: &[Event]) {
    let mut per_kind: BTreeMap<&str, usize> = BTreeMap::new();
    for event in events {
        *per_kind.entry(event.kind.name()).or_default() += 1;
    }

    println!("\n{} samples, {} events", samples.len(), events.len());
    for (kind, count) in per_kind {
        println!("  {kind:<24} {count}");
    }
}

fn export(
    samples: &[Sample],
    events: &[Event],
    csv_path: Option<&Path>,
    json_path: Option<&Path>,
) -> anyhow::Result<()> {
    if let Some(path) = csv_path {
        let file = File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        write_joined_csv(BufWriter::new(file), samples, events)?;
        tracing::info!("Exported {} samples to {}", samples.len(), path.display());
    }

    if let Some(path) = json_path {
        let file = File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        write_events_json(BufWriter::new(file), events)?;
        tracing::info!("Exported {} events to {}", events.len(), path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fading_detect::ScriptedSource;

    fn run_args() -> RunArgs {
        RunArgs {
            source: None,
            interface: None,
            interval: None,
            duration: None,
            seed: None,
            export: None,
            events_json: None,
            show_prompt: false,
        }
    }

    #[test]
    fn test_overrides_replace_config_values() {
        let mut config = AppConfig::default();
        let args = RunArgs {
            source: Some(SourceKind::Iw),
            interface: Some("wlp3s0".into()),
            interval: Some(1.0),
            ..run_args()
        };

        apply_overrides(&mut config, &args).unwrap();
        assert_eq!(config.source.kind, SourceKind::Iw);
        assert_eq!(config.source.interface.as_deref(), Some("wlp3s0"));
        assert_eq!(config.monitor.poll_interval_secs, 1.0);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let mut config = AppConfig::default();
        let args = RunArgs {
            interval: Some(-1.0),
            ..run_args()
        };
        assert!(apply_overrides(&mut config, &args).is_err());
    }

    #[test]
    fn test_build_source_names() {
        let mut config = SourceConfig::default();
        assert_eq!(build_source(&config).name(), "simulated");

        config.kind = SourceKind::Netsh;
        assert_eq!(build_source(&config).name(), "netsh");

        config.kind = SourceKind::Iw;
        assert_eq!(build_source(&config).name(), "iw");
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_simulated_with_export() {
        let dir = std::env::temp_dir().join(format!("fading-run-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let csv_path = dir.join("session.csv");

        let args = RunArgs {
            duration: Some(5.0),
            interval: Some(0.5),
            seed: Some(42),
            export: Some(csv_path.clone()),
            ..run_args()
        };

        run(AppConfig::default(), args).await.unwrap();

        let text = std::fs::read_to_string(&csv_path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("timestamp,rssi,channel,band,event_kind"));
        assert!(lines.count() >= 5);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_context_survives_consumer_lag() {
        let monitor = FadingMonitor::new(AppConfig::default().monitor_config());
        let rssi: Vec<i32> = [-40, -52].into_iter().chain((0..20).map(|i| -51 + i % 2)).collect();
        let source = ScriptedSource::from_rssi(&rssi, 6);

        let (mut rx, handle) = monitor.start_streaming(source);
        let event = rx.recv().await.unwrap();

        // Let the monitor move well past the triggering sample.
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(handle.snapshot().len() > 5);

        let context = event_context(&handle, event, 3);
        assert_eq!(context.recent.len(), 2);
        assert_eq!(context.recent.last().map(|s| s.timestamp), Some(event.timestamp));
        assert_eq!(context.delta_dbm, -12);

        drop(rx);
        handle.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_classify_sequence() {
        let args = ClassifyArgs {
            rssi: vec![-40, -46, -40, -47, -41],
            channel: 6,
        };
        classify(&AppConfig::default(), &args).await.unwrap();
    }
}
