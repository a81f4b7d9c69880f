//! Raw interface readings and their conversion into samples.

use fading_core::{Band, Error, Result, Sample, Timestamp};
use serde::{Deserialize, Serialize};

/// Lowest RSSI accepted at the ingestion boundary (dBm)
pub const MIN_PLAUSIBLE_RSSI: i32 = -120;

/// Highest RSSI accepted at the ingestion boundary (dBm)
pub const MAX_PLAUSIBLE_RSSI: i32 = 0;

/// One poll of the wireless interface.
///
/// A `None` field means the interface could not report it, usually because
/// it is down or not associated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawReading {
    /// Received Signal Strength Indicator (dBm)
    pub rssi: Option<i32>,
    pub channel: Option<u32>,
    pub band: Option<Band>,
}

impl RawReading {
    pub fn new(rssi: i32, channel: u32, band: Band) -> Self {
        Self {
            rssi: Some(rssi),
            channel: Some(channel),
            band: Some(band),
        }
    }

    /// Reading from a disconnected interface
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Whether every field was reported
    pub fn is_available(&self) -> bool {
        self.rssi.is_some() && self.channel.is_some() && self.band.is_some()
    }

    /// Convert into a [`Sample`] stamped with `timestamp`.
    ///
    /// Missing fields are [`Error::AcquisitionUnavailable`]; an RSSI outside
    /// `[-120, 0]` dBm or channel 0 is [`Error::MalformedSample`]. No
    /// placeholder values are ever substituted.
    pub fn into_sample(self, timestamp: Timestamp) -> Result<Sample> {
        let (Some(rssi), Some(channel), Some(band)) = (self.rssi, self.channel, self.band) else {
            return Err(Error::AcquisitionUnavailable);
        };

        if !(MIN_PLAUSIBLE_RSSI..=MAX_PLAUSIBLE_RSSI).contains(&rssi) {
            return Err(Error::MalformedSample(format!(
                "RSSI {rssi} dBm is out of expected range [{MIN_PLAUSIBLE_RSSI}, {MAX_PLAUSIBLE_RSSI}]"
            )));
        }

        if channel == 0 {
            return Err(Error::MalformedSample("channel must be positive".into()));
        }

        Ok(Sample::new(timestamp, rssi, channel, band))
    }
}

/// Approximate dBm from a signal quality percentage, as reported by
/// Windows (`quality / 2 - 100`).
pub fn quality_to_dbm(quality_pct: u32) -> i32 {
    (quality_pct.min(100) as i32) / 2 - 100
}
