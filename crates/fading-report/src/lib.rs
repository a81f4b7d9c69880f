//! # Fading-Report
//!
//! Turns a classified fading event into a short narrative for the operator.
//!
//! ## Flow
//!
//! ```text
//! Event + last ~40 samples
//!     ↓
//! [ReportContext]  → step delta, window drop, min / max / mean RSSI
//!     ↓
//! [Narrator]       → headline + explanation
//! ```
//!
//! [`TemplateNarrator`] produces deterministic explanations offline. A
//! language-model backed narrator can implement [`Narrator`] and use
//! [`format_report_prompt`] to build its request.

pub mod context;
pub mod narrator;
pub mod prompts;
pub mod template;

pub use context::*;
pub use narrator::*;
pub use prompts::*;
pub use template::*;
