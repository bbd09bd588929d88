//! Time conversions and display helpers.

use crate::models::ClockRules;

/// Minutes + seconds from the setup form, as total seconds.
pub fn parse_time_to_seconds(minutes: u32, seconds: u32) -> u32 {
    minutes.saturating_mul(60).saturating_add(seconds)
}

/// Apply a signed adjustment to a clock. Never below zero.
pub fn apply_delta(seconds: u32, delta: i64) -> u32 {
    let adjusted = i64::from(seconds)
        .saturating_add(delta)
        .clamp(0, i64::from(u32::MAX));
    adjusted as u32
}

/// `MM:SS`. Negative input shows as `00:00`; minutes are not capped at 99.
pub fn format_time(total_seconds: i64) -> String {
    let total = total_seconds.max(0);
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// `HH:MM:SS` once an hour has passed, otherwise `MM:SS`.
pub fn format_time_detailed(total_seconds: i64) -> String {
    let total = total_seconds.max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Completed laps, as shown to people. Round 1 is the unfinished first lap, so it shows as 0.
pub fn rounds_for_display(rounds: u32) -> u32 {
    if rounds > 1 {
        rounds - 1
    } else {
        0
    }
}

/// Volume of the low-time warning for a clock showing `remaining` seconds.
///
/// None outside `1..=warning_threshold`. Inside, scales linearly from
/// `min_warning_volume` at the threshold up to full volume at one second.
pub fn warning_volume(remaining: u32, rules: &ClockRules) -> Option<f32> {
    let threshold = rules.warning_threshold;
    if remaining == 0 || remaining > threshold {
        return None;
    }
    let floor = rules.min_warning_volume.clamp(0.0, 1.0);
    let span = threshold.saturating_sub(1).max(1) as f32;
    let progress = ((threshold - remaining) as f32 / span).clamp(0.0, 1.0);
    Some(floor + (1.0 - floor) * progress)
}
