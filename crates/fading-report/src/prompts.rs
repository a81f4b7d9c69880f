//! Prompt templates for language-model narrators.

use std::fmt::Write;

use crate::context::ReportContext;

/// System prompt for an RF analyst narrator
pub const FADING_ANALYST_SYSTEM_PROMPT: &str = r#"You are a wireless networking expert specializing in radio propagation. Your role is to explain signal-strength events detected on a WiFi link to a non-specialist.

You will receive:
1. The classified event (Fast Fading, Slow Fading / Shadowing, Multipath Fading or Moderate Variation)
2. The channel and frequency band of the link
3. A table of the most recent RSSI samples in dBm, oldest first

Your task is to provide a short explanation that:
- Names the most likely physical cause
- Relates it to the sample pattern you were given
- Suggests one practical action to improve the link

Do not claim measurement precision the data does not have. Keep your response under 120 words."#;

/// Format the user prompt for an event
pub fn format_report_prompt(context: &ReportContext) -> String {
    let event = &context.event;
    let mut prompt = format!(
        "## Event\n{} at {} (RSSI {} dBm, step {:+} dBm)\nChannel {} / {}\n\n",
        event.kind, event.timestamp, event.rssi, context.delta_dbm, event.channel, event.band
    );

    prompt.push_str("## Recent Samples\ntime,rssi_dbm\n");
    for sample in &context.recent {
        let _ = writeln!(prompt, "{},{}", sample.timestamp, sample.rssi);
    }

    let _ = write!(
        prompt,
        "\n## Summary\nmin {} dBm, max {} dBm, mean {:.1} dBm\n\nExplain this event.",
        context.min_rssi, context.max_rssi, context.mean_rssi
    );

    prompt
}
