use std::time::Duration;

const UNIT_THRESHOLD: f64 = 0.85;

struct Units {
    scale: f64,
    base: &'static str,
    steps: &'static [&'static str],
}

const BINARY: Units = Units {
    scale: 1024.0,
    base: "",
    steps: &["KB", "MB", "GB", "TB", "PB"],
};

const TIME_US: Units = Units {
    scale: 1000.0,
    base: "us",
    steps: &["ms", "s"],
};

const TIME_S: Units = Units {
    scale: 60.0,
    base: "s",
    steps: &["m", "h"],
};

/// Moves up a unit once the value reaches 85% of the next scale step.
fn format_units(value: f64, units: &Units) -> String {
    let mut amount = value;
    let mut unit = units.base;
    let threshold = units.scale * UNIT_THRESHOLD;
    for step in units.steps {
        if amount < threshold {
            break;
        }
        amount /= units.scale;
        unit = step;
    }
    format!("{:.2}{}", amount, unit)
}

/// Formats a byte count with binary prefixes, e.g. `1.50KB`.
#[must_use]
pub fn format_binary(bytes: f64) -> String {
    format_units(bytes, &BINARY)
}

/// Formats a duration given in microseconds, e.g. `812.40us`, `3.10ms`, `2.00m`.
#[must_use]
pub fn format_time_us(micros: f64) -> String {
    if micros >= 1_000_000.0 {
        format_units(micros / 1_000_000.0, &TIME_S)
    } else {
        format_units(micros, &TIME_US)
    }
}

/// Formats a run duration the way it was most likely typed, e.g. `10s`,
/// `1m30s`, `250ms`.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();
    if total_ms < 1_000 {
        return format!("{}ms", total_ms);
    }
    let millis = total_ms.checked_rem(1_000).unwrap_or(0);
    let total_secs = duration.as_secs();
    let hours = total_secs.checked_div(3_600).unwrap_or(0);
    let minutes = total_secs
        .checked_rem(3_600)
        .and_then(|rest| rest.checked_div(60))
        .unwrap_or(0);
    let seconds = total_secs.checked_rem(60).unwrap_or(0);

    let mut parts = Vec::with_capacity(3);
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    if seconds > 0 || millis > 0 {
        let fraction = if millis > 0 {
            format!(".{:03}", millis).trim_end_matches('0').to_owned()
        } else {
            String::new()
        };
        parts.push(format!("{}{}s", seconds, fraction));
    }
    parts.concat()
}
