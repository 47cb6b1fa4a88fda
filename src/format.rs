//! Human-readable durations.

const CENTIS_PER_SECOND: u64 = 100;
const CENTIS_PER_MINUTE: u64 = 60 * CENTIS_PER_SECOND;
const CENTIS_PER_HOUR: u64 = 60 * CENTIS_PER_MINUTE;
const CENTIS_PER_DAY: u64 = 24 * CENTIS_PER_HOUR;

/// Formats seconds as `"1 days, 1 hours, 1 minutes, 1 seconds"`.
///
/// Only non-zero components are emitted, largest unit first. A zero duration
/// gives an empty string. Fractional input is kept to two decimals on the
/// seconds component; negative or non-finite input counts as zero.
pub fn format_duration(seconds: f64) -> String {
    let centis = if seconds.is_finite() && seconds > 0.0 {
        (seconds * CENTIS_PER_SECOND as f64).round() as u64
    } else {
        0
    };

    let days = centis / CENTIS_PER_DAY;
    let hours = centis % CENTIS_PER_DAY / CENTIS_PER_HOUR;
    let minutes = centis % CENTIS_PER_HOUR / CENTIS_PER_MINUTE;
    let secs = centis % CENTIS_PER_MINUTE;

    let mut parts = Vec::with_capacity(4);
    if days > 0 {
        parts.push(format!("{days} days"));
    }
    if hours > 0 {
        parts.push(format!("{hours} hours"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes} minutes"));
    }
    if secs > 0 {
        parts.push(format!("{} seconds", format_seconds(secs)));
    }
    parts.join(", ")
}

fn format_seconds(centis: u64) -> String {
    let whole = centis / CENTIS_PER_SECOND;
    match centis % CENTIS_PER_SECOND {
        0 => whole.to_string(),
        f if f % 10 == 0 => format!("{whole}.{}", f / 10),
        f => format!("{whole}.{f:02}"),
    }
}
