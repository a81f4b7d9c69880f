//! Tabular export of the sample history and event log.

use serde::Serialize;
use std::collections::HashMap;
use std::io::Write;

use fading_core::{Event, EventKind, Result, Sample, Timestamp};

/// One exported sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleRow {
    /// RFC 3339 wall-clock time
    pub timestamp: String,
    pub rssi: i32,
    pub channel: u32,
    pub band: String,
}

impl From<&Sample> for SampleRow {
    fn from(sample: &Sample) -> Self {
        Self {
            timestamp: sample.timestamp.to_datetime().to_rfc3339(),
            rssi: sample.rssi,
            channel: sample.channel,
            band: sample.band.to_string(),
        }
    }
}

/// One exported sample joined with the event it triggered, if any
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRow {
    pub timestamp: String,
    pub rssi: i32,
    pub channel: u32,
    pub band: String,
    pub event_kind: Option<String>,
}

/// Write one CSV row per sample: `timestamp,rssi,channel,band`.
pub fn write_samples_csv<W: Write>(writer: W, samples: &[Sample]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for sample in samples {
        wtr.serialize(SampleRow::from(sample))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write one CSV row per sample with an extra nullable `event_kind` column.
///
/// A sample gets the kind of the event carrying its timestamp.
pub fn write_joined_csv<W: Write>(writer: W, samples: &[Sample], events: &[Event]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in joined_rows(samples, events) {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the event log as a JSON array.
pub fn write_events_json<W: Write>(writer: W, events: &[Event]) -> Result<()> {
    serde_json::to_writer_pretty(writer, events)?;
    Ok(())
}

/// Join samples with events by timestamp.
pub fn joined_rows(samples: &[Sample], events: &[Event]) -> Vec<EventRow> {
    let kinds: HashMap<Timestamp, EventKind> =
        events.iter().map(|e| (e.timestamp, e.kind)).collect();

    samples
        .iter()
        .map(|sample| {
            let row = SampleRow::from(sample);
            EventRow {
                timestamp: row.timestamp,
                rssi: row.rssi,
                channel: row.channel,
                band: row.band,
                event_kind: kinds.get(&sample.timestamp).map(|k| k.name().to_string()),
            }
        })
        .collect()
}
