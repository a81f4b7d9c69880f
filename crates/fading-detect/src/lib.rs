//! # Fading-Detect
//!
//! Signal engine of the WiFi fading detector.
//!
//! Each poll tick produces one RSSI reading from the wireless interface. The
//! reading is appended to an in-memory [`SampleHistory`], and the
//! [`FadingClassifier`] looks at the tail of that history to decide whether
//! the newest sample completes a fading pattern.
//!
//! ## Pipeline Stages
//!
//! 1. **Acquisition**: Read RSSI, channel and band from the interface
//!    (`netsh` on Windows, `iw` on Linux, or a simulated source)
//! 2. **Ingestion**: Reject unavailable or malformed readings at the boundary
//! 3. **Classification**: First matching rule wins, in priority order:
//!    fast fading, slow fading, multipath fading, moderate variation
//! 4. **Export**: Full history and event log as CSV or JSON
//!
//! ## Lookback
//!
//! Classification never inspects more than the five most recent samples.
//! Retention is unbounded: the detection window and the export view are two
//! separate views over the same append-only log.

pub mod acquisition;
pub mod classifier;
pub mod export;
pub mod history;
pub mod monitor;
pub mod reading;

pub use acquisition::*;
pub use classifier::*;
pub use export::*;
pub use history::*;
pub use monitor::*;
pub use reading::*;
