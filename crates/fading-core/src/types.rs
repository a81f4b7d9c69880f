//! Fundamental types for the WiFi fading detector.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp wrapper with nanosecond precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp_nanos_opt().unwrap_or(0))
    }

    pub fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    pub fn from_millis(millis: i64) -> Self {
        Self(millis.saturating_mul(1_000_000))
    }

    pub fn as_nanos(&self) -> i64 {
        self.0
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / 1_000_000_000.0
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_datetime().format("%H:%M:%S%.3f"))
    }
}

/// WiFi frequency band of the connected channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Band {
    /// 2.4 GHz band (channels 1-14)
    #[serde(rename = "2.4GHz")]
    Band2_4GHz,
    /// 5 GHz band (channels 32-177)
    #[serde(rename = "5GHz")]
    Band5GHz,
    #[serde(rename = "unknown")]
    Unknown,
}

impl Band {
    /// Infer the band from an 802.11 channel number.
    pub fn from_channel(channel: u32) -> Self {
        match channel {
            1..=14 => Band::Band2_4GHz,
            32..=177 => Band::Band5GHz,
            _ => Band::Unknown,
        }
    }

    /// Infer the band from a center frequency in MHz.
    pub fn from_frequency_mhz(freq_mhz: u32) -> Self {
        match freq_mhz {
            2400..=2500 => Band::Band2_4GHz,
            5150..=5900 => Band::Band5GHz,
            _ => Band::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Band::Band2_4GHz => "2.4GHz",
            Band::Band5GHz => "5GHz",
            Band::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One signal-strength reading taken at a poll tick.
///
/// Immutable once created; the history owns it after insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: Timestamp,
    /// Received Signal Strength Indicator (dBm)
    pub rssi: i32,
    /// 802.11 channel number
    pub channel: u32,
    pub band: Band,
}

impl Sample {
    pub fn new(timestamp: Timestamp, rssi: i32, channel: u32, band: Band) -> Self {
        Self {
            timestamp,
            rssi,
            channel,
            band,
        }
    }
}

/// Fading phenomenon recognised by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Large single-step jump
    FastFading,
    /// Sustained attenuation over several samples (shadowing)
    SlowFading,
    /// Sawtooth oscillation from multiple propagation paths
    MultipathFading,
    ModerateVariation,
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::FastFading => "Fast Fading",
            EventKind::SlowFading => "Slow Fading / Shadowing",
            EventKind::MultipathFading => "Multipath Fading",
            EventKind::ModerateVariation => "Moderate Variation",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            EventKind::FastFading => {
                "Abrupt single-step signal change, typical of rapid multipath interference"
            }
            EventKind::SlowFading => {
                "Sustained signal attenuation over several samples, typical of a physical obstruction"
            }
            EventKind::MultipathFading => {
                "Oscillating signal from paths arriving with varying phase"
            }
            EventKind::ModerateVariation => "Noticeable but moderate signal change",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A classified fading event.
///
/// Carries the timestamp, RSSI, channel and band of the sample that
/// triggered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub timestamp: Timestamp,
    pub rssi: i32,
    pub channel: u32,
    pub band: Band,
}

impl Event {
    pub fn from_sample(kind: EventKind, sample: &Sample) -> Self {
        Self {
            kind,
            timestamp: sample.timestamp,
            rssi: sample.rssi,
            channel: sample.channel,
            band: sample.band,
        }
    }
}
