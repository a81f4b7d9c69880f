//! # Fading-Core
//!
//! Core types and utilities for the WiFi fading detector: signal samples,
//! classified fading events, and the shared error type.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
