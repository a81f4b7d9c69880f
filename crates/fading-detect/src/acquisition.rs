//! Signal acquisition from wireless interfaces.
//!
//! This module provides abstractions for polling the signal strength of the
//! connected access point on various platforms:
//!
//! - Windows via `netsh wlan show interfaces`
//! - Linux via `iw dev <iface> link`
//! - A simulated source with random fades, for demos and tests

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::collections::VecDeque;
use tokio::process::Command;

use fading_core::{Band, Error, Result};

use crate::reading::{quality_to_dbm, RawReading};

/// Trait for signal acquisition backends
#[async_trait]
pub trait SignalSource: Send {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Poll the interface once.
    ///
    /// A disconnected interface is not an error: it yields a reading with
    /// missing fields.
    async fn read(&mut self) -> Result<RawReading>;
}

#[async_trait]
impl SignalSource for Box<dyn SignalSource> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn read(&mut self) -> Result<RawReading> {
        (**self).read().await
    }
}

/// Simulated interface: steady signal with gaussian noise and random deep fades.
pub struct SimulatedSource {
    rng: StdRng,
    base_rssi: f64,
    noise_std_db: f64,
    fade_probability: f64,
    channel: u32,
}

impl SimulatedSource {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic source for reproducible runs
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            base_rssi: -50.0,
            noise_std_db: 2.0,
            fade_probability: 0.10,
            channel: 6,
        }
    }

    pub fn with_base_rssi(mut self, rssi: f64) -> Self {
        self.base_rssi = rssi;
        self
    }

    pub fn with_noise(mut self, std_db: f64) -> Self {
        self.noise_std_db = std_db;
        self
    }

    pub fn with_fade_probability(mut self, probability: f64) -> Self {
        self.fade_probability = probability.clamp(0.0, 1.0);
        self
    }

    pub fn with_channel(mut self, channel: u32) -> Self {
        self.channel = channel;
        self
    }
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalSource for SimulatedSource {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn read(&mut self) -> Result<RawReading> {
        let noise = Normal::new(0.0, self.noise_std_db)
            .map_err(|e| Error::Acquisition(format!("invalid noise level: {e}")))?;

        let mut rssi = self.base_rssi + noise.sample(&mut self.rng);

        // Obstacle crossing the line of sight
        if self.rng.gen::<f64>() < self.fade_probability {
            rssi -= self.rng.gen_range(10_i32..25) as f64;
        }

        Ok(RawReading::new(
            rssi.round() as i32,
            self.channel,
            Band::from_channel(self.channel),
        ))
    }
}

/// Replays a fixed sequence of readings, then reports acquisition errors.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    readings: VecDeque<RawReading>,
}

impl ScriptedSource {
    pub fn new(readings: impl IntoIterator<Item = RawReading>) -> Self {
        Self {
            readings: readings.into_iter().collect(),
        }
    }

    /// Script of RSSI values on a single channel
    pub fn from_rssi(rssi: &[i32], channel: u32) -> Self {
        let band = Band::from_channel(channel);
        Self::new(rssi.iter().map(|&r| RawReading::new(r, channel, band)))
    }

    pub fn remaining(&self) -> usize {
        self.readings.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.readings.is_empty()
    }
}

#[async_trait]
impl SignalSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn read(&mut self) -> Result<RawReading> {
        self.readings
            .pop_front()
            .ok_or_else(|| Error::Acquisition("script exhausted".into()))
    }
}

/// Windows source that shells out to `netsh wlan show interfaces`.
pub struct NetshInterfaceSource {
    interface: Option<String>,
}

impl NetshInterfaceSource {
    pub fn new() -> Self {
        Self { interface: None }
    }

    /// Only report the interface with this name (e.g. `"Wi-Fi"`).
    pub fn with_interface(name: impl Into<String>) -> Self {
        Self {
            interface: Some(name.into()),
        }
    }
}

impl Default for NetshInterfaceSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalSource for NetshInterfaceSource {
    fn name(&self) -> &str {
        "netsh"
    }

    async fn read(&mut self) -> Result<RawReading> {
        let output = Command::new("netsh")
            .args(["wlan", "show", "interfaces"])
            .output()
            .await
            .map_err(|e| Error::Acquisition(format!("failed to run `netsh`: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Acquisition(format!(
                "netsh exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_netsh_interfaces(&stdout, self.interface.as_deref()))
    }
}

/// Linux source that shells out to `iw dev <iface> link`.
pub struct IwLinkSource {
    interface: String,
}

impl IwLinkSource {
    pub fn new() -> Self {
        Self::with_interface("wlan0")
    }

    pub fn with_interface(iface: impl Into<String>) -> Self {
        Self {
            interface: iface.into(),
        }
    }
}

impl Default for IwLinkSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalSource for IwLinkSource {
    fn name(&self) -> &str {
        "iw"
    }

    async fn read(&mut self) -> Result<RawReading> {
        let output = Command::new("iw")
            .args(["dev", self.interface.as_str(), "link"])
            .output()
            .await
            .map_err(|e| Error::Acquisition(format!("failed to run `iw`: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Acquisition(format!(
                "iw exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_iw_link(&stdout))
    }
}

/// Parse the output of `netsh wlan show interfaces`.
///
/// English and Portuguese labels are recognised. Only the first interface
/// block (or the one named `interface`) is considered. A disconnected
/// interface yields [`RawReading::unavailable`].
pub fn parse_netsh_interfaces(output: &str, interface: Option<&str>) -> RawReading {
    let mut reading = RawReading::unavailable();
    let mut in_block = false;
    let mut seen_block = false;
    let mut connected = true;
    let mut radio_band = None;

    for line in output.lines() {
        let Some((key, value)) = split_kv(line) else {
            continue;
        };

        match key.as_str() {
            "name" | "nome" => {
                if seen_block && in_block {
                    break;
                }
                in_block = interface.map_or(true, |name| name.eq_ignore_ascii_case(value));
                seen_block = true;
            }
            _ if !in_block && seen_block => {}
            "state" | "estado" => {
                let state = value.to_ascii_lowercase();
                connected = !state.starts_with("disconnected") && !state.starts_with("desconectado");
            }
            "signal" | "sinal" => {
                reading.rssi = value
                    .trim_end_matches('%')
                    .trim()
                    .parse::<u32>()
                    .ok()
                    .map(quality_to_dbm);
            }
            "channel" | "canal" => {
                reading.channel = value.parse::<u32>().ok().filter(|&c| c > 0);
            }
            "band" | "banda" => {
                reading.band = parse_band_label(value);
            }
            "radio type" | "tipo de rádio" | "tipo de radio" => {
                radio_band = band_from_radio_type(value);
            }
            _ => {}
        }
    }

    if !connected || (interface.is_some() && !in_block) {
        return RawReading::unavailable();
    }

    reading.band = reading
        .band
        .or(radio_band)
        .or_else(|| reading.channel.map(Band::from_channel));

    reading
}

/// Parse the output of `iw dev <iface> link`.
///
/// ```text
/// Connected to aa:bb:cc:dd:ee:ff (on wlan0)
///         SSID: home
///         freq: 5180
///         signal: -52 dBm
/// ```
pub fn parse_iw_link(output: &str) -> RawReading {
    if !output.trim_start().starts_with("Connected to") {
        return RawReading::unavailable();
    }

    let mut reading = RawReading::unavailable();

    for line in output.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("signal:") {
            reading.rssi = rest
                .split_whitespace()
                .next()
                .and_then(|n| n.parse::<f64>().ok())
                .map(|dbm| dbm.round() as i32);
        } else if let Some(rest) = trimmed.strip_prefix("freq:") {
            if let Some(freq) = rest
                .split_whitespace()
                .next()
                .and_then(|n| n.parse::<f64>().ok())
            {
                let freq_mhz = freq.round() as u32;
                reading.channel = Some(freq_to_channel(freq_mhz)).filter(|&c| c > 0);
                reading.band = Some(Band::from_frequency_mhz(freq_mhz));
            }
        }
    }

    reading
}

/// Convert a frequency in MHz to an 802.11 channel number (0 if unknown).
pub fn freq_to_channel(freq_mhz: u32) -> u32 {
    match freq_mhz {
        2412..=2472 => (freq_mhz - 2407) / 5,
        2484 => 14,
        5170..=5885 => (freq_mhz - 5000) / 5,
        5955..=7115 => (freq_mhz - 5950) / 5,
        _ => 0,
    }
}

fn parse_band_label(value: &str) -> Option<Band> {
    let lower = value.to_ascii_lowercase();
    if lower.starts_with("2.4") || lower.starts_with("2,4") {
        Some(Band::Band2_4GHz)
    } else if lower.starts_with('5') {
        Some(Band::Band5GHz)
    } else if lower.is_empty() {
        None
    } else {
        Some(Band::Unknown)
    }
}

/// Band implied by an 802.11 PHY name. Dual-band PHYs (n, ax, be) imply nothing.
fn band_from_radio_type(value: &str) -> Option<Band> {
    let phy = value.trim().to_ascii_lowercase();
    match phy.strip_prefix("802.11").unwrap_or(&phy) {
        "b" | "g" => Some(Band::Band2_4GHz),
        "a" | "ac" => Some(Band::Band5GHz),
        _ => None,
    }
}

/// Split `"    Key name     : value"` into a lowercase key and trimmed value.
fn split_kv(line: &str) -> Option<(String, &str)> {
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_ascii_lowercase(), value.trim()))
}
