//! Offline narrator: rule-based explanations per fading kind.

use async_trait::async_trait;
use fading_core::{EventKind, Timestamp};

use crate::context::ReportContext;
use crate::narrator::{Narrator, Report, ReportResult, Severity};

/// Deterministic narrator that needs no external service
pub struct TemplateNarrator {
    name: String,
}

impl TemplateNarrator {
    pub fn new() -> Self {
        Self {
            name: "Template".to_string(),
        }
    }

    /// Variation that best describes the event
    fn magnitude(context: &ReportContext) -> i32 {
        match context.event.kind {
            EventKind::SlowFading => context.window_drop_dbm,
            EventKind::MultipathFading => context.span_dbm(),
            EventKind::FastFading | EventKind::ModerateVariation => context.delta_dbm,
        }
    }

    fn headline(context: &ReportContext, severity: Severity, magnitude: i32) -> String {
        format!(
            "{} ({}, {} dBm) on channel {} / {}",
            context.event.kind,
            severity.label(),
            magnitude.unsigned_abs(),
            context.event.channel,
            context.event.band
        )
    }

    fn body(context: &ReportContext, severity: Severity, magnitude: i32) -> String {
        let cause = match (context.event.kind, severity) {
            (EventKind::FastFading, Severity::Severe) => {
                "The jump is very abrupt. This points to a severe blockage of the line of sight, \
                 such as a thick concrete wall or a metal door closing suddenly."
            }
            (EventKind::FastFading, _) => {
                "This has the character of fast fading, most likely multipath from reflections \
                 as people move around the room or objects near the antenna shift."
            }
            (EventKind::SlowFading, _) => {
                "The signal fell steadily over several polls without recovering. This is \
                 shadowing: an obstacle is gradually blocking the path, or the device is \
                 moving away from the access point."
            }
            (EventKind::MultipathFading, _) => {
                "The signal is oscillating up and down. Reflected copies of the signal are \
                 arriving with shifting phase and alternately reinforcing and cancelling it."
            }
            (EventKind::ModerateVariation, _) => {
                "Moderate variation. This may be natural environmental noise or co-channel \
                 interference from a neighbouring network."
            }
        };

        format!(
            "Variation of {} dBm detected at {} (RSSI {} dBm). Over the last {} samples the \
             signal ranged from {} to {} dBm (mean {:.1} dBm).\n{}",
            magnitude.unsigned_abs(),
            context.event.timestamp,
            context.event.rssi,
            context.recent.len(),
            context.min_rssi,
            context.max_rssi,
            context.mean_rssi,
            cause
        )
    }
}

impl Default for TemplateNarrator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Narrator for TemplateNarrator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn narrate(&self, context: &ReportContext) -> ReportResult<Report> {
        self.validate_context(context)?;

        let magnitude = Self::magnitude(context);
        let severity = Severity::from_variation(magnitude);

        tracing::debug!(
            kind = %context.event.kind,
            severity = severity.label(),
            "Narrating event"
        );

        Ok(Report {
            kind: context.event.kind,
            severity,
            headline: Self::headline(context, severity, magnitude),
            body: Self::body(context, severity, magnitude),
            narrator: self.name.clone(),
            generated_at: Timestamp::now(),
        })
    }
}
