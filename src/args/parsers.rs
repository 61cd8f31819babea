use std::time::Duration;

use url::Url;

use super::types::{OutputFormat, PositiveU64, PrintSpec};
use crate::error::ValidationError;

pub(crate) fn parse_header(s: &str) -> Result<(String, String), ValidationError> {
    match s.split_once(':') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_owned(), value.trim().to_owned()))
        }
        Some(_) | None => Err(ValidationError::InvalidHeaderFormat {
            value: s.to_owned(),
        }),
    }
}

pub(super) fn parse_positive_u64(s: &str) -> Result<PositiveU64, ValidationError> {
    s.parse::<PositiveU64>()
}

pub(super) fn parse_print_spec(s: &str) -> Result<PrintSpec, ValidationError> {
    s.parse::<PrintSpec>()
}

pub(crate) fn parse_output_format(s: &str) -> Result<OutputFormat, ValidationError> {
    s.parse::<OutputFormat>()
}

/// Parses durations such as `500ms`, `1.5s`, `2m` or `1h30m`. Each number
/// may carry a decimal fraction. A bare number is read as seconds. Zero is
/// accepted; callers decide what it means.
pub(crate) fn parse_duration_arg(s: &str) -> Result<Duration, ValidationError> {
    let value = s.trim();
    if value.is_empty() {
        return Err(ValidationError::DurationEmpty);
    }
    if value.bytes().all(|byte| byte.is_ascii_digit() || byte == b'.') {
        let nanos = segment_nanos(value, value, NANOS_PER_SEC)?;
        return nanos_to_duration(nanos);
    }

    let mut total: u128 = 0;
    let mut rest = value;
    while !rest.is_empty() {
        let number_len = rest
            .find(|ch: char| !ch.is_ascii_digit() && ch != '.')
            .unwrap_or(rest.len());
        if number_len == 0 {
            return Err(ValidationError::InvalidDurationFormat {
                value: value.to_owned(),
            });
        }
        let (number, tail) = rest.split_at(number_len);
        let unit_len = tail
            .find(|ch: char| ch.is_ascii_digit() || ch == '.')
            .unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_len);
        let part = segment_nanos(value, number, unit_nanos(number, unit)?)?;
        total = total
            .checked_add(part)
            .ok_or(ValidationError::DurationOverflow)?;
        rest = next;
    }
    nanos_to_duration(total)
}

const NANOS_PER_SEC: u128 = 1_000_000_000;

fn unit_nanos(number: &str, unit: &str) -> Result<u128, ValidationError> {
    match unit {
        "ns" => Ok(1),
        "us" | "µs" => Ok(1_000),
        "ms" => Ok(1_000_000),
        "s" => Ok(NANOS_PER_SEC),
        "m" => Ok(60_000_000_000),
        "h" => Ok(3_600_000_000_000),
        "" => Err(ValidationError::InvalidDurationFormat {
            value: number.to_owned(),
        }),
        _ => Err(ValidationError::InvalidDurationUnit {
            unit: unit.to_owned(),
        }),
    }
}

/// Nanoseconds in `number` units of `scale` nanoseconds each. Fraction digits
/// finer than a nanosecond are dropped.
fn segment_nanos(value: &str, number: &str, scale: u128) -> Result<u128, ValidationError> {
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if (whole.is_empty() && fraction.is_empty()) || fraction.contains('.') {
        return Err(ValidationError::InvalidDurationFormat {
            value: value.to_owned(),
        });
    }
    let whole_units = if whole.is_empty() {
        0
    } else {
        whole
            .parse::<u64>()
            .map_err(|err| ValidationError::InvalidDurationNumber {
                value: value.to_owned(),
                source: err,
            })?
    };
    let mut nanos = u128::from(whole_units)
        .checked_mul(scale)
        .ok_or(ValidationError::DurationOverflow)?;
    let mut place = scale;
    for digit in fraction.chars().filter_map(|ch| ch.to_digit(10)) {
        place = place.checked_div(10).unwrap_or(0);
        if place == 0 {
            break;
        }
        let step = u128::from(digit)
            .checked_mul(place)
            .ok_or(ValidationError::DurationOverflow)?;
        nanos = nanos
            .checked_add(step)
            .ok_or(ValidationError::DurationOverflow)?;
    }
    Ok(nanos)
}

fn nanos_to_duration(nanos: u128) -> Result<Duration, ValidationError> {
    let secs = nanos
        .checked_div(NANOS_PER_SEC)
        .and_then(|secs| u64::try_from(secs).ok())
        .ok_or(ValidationError::DurationOverflow)?;
    let subsec = nanos
        .checked_rem(NANOS_PER_SEC)
        .and_then(|subsec| u32::try_from(subsec).ok())
        .ok_or(ValidationError::DurationOverflow)?;
    Ok(Duration::new(secs, subsec))
}

/// Normalizes a target URL. A missing scheme means `http://`; anything other
/// than http or https is rejected, as is a URL without a host.
pub(crate) fn parse_target_url(raw: &str) -> Result<Url, ValidationError> {
    let trimmed = raw.trim();
    let candidate = match trimmed.split_once("://") {
        Some((scheme, _)) => {
            if scheme != "http" && scheme != "https" {
                return Err(ValidationError::UnsupportedScheme {
                    scheme: scheme.to_owned(),
                    url: raw.to_owned(),
                });
            }
            trimmed.to_owned()
        }
        None => format!("http://{}", trimmed),
    };
    let url = Url::parse(&candidate).map_err(|err| ValidationError::InvalidUrl {
        url: raw.to_owned(),
        source: err,
    })?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::MissingHost {
            url: raw.to_owned(),
        });
    }
    Ok(url)
}
