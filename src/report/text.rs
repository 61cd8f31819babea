use std::io::{self, Write};

use super::types::Report;
use super::units::{format_binary, format_time_us};
use crate::metrics::PERCENTILES;

/// Renders the human-readable result table.
///
/// # Errors
///
/// Returns an error when writing to `out` fails.
pub fn write_plain_text<W>(report: &Report, with_latencies: bool, out: &mut W) -> io::Result<()>
where
    W: Write,
{
    let result = &report.result;
    writeln!(out, "{:<10} {:>10} {:>10} {:>10}", "Statistics", "Avg", "Stdev", "Max")?;
    writeln!(
        out,
        "  {:<8} {:>10.2} {:>10.2} {:>10.2}",
        "Reqs/sec", result.rps.mean, result.rps.stddev, result.rps.max
    )?;
    writeln!(
        out,
        "  {:<8} {:>10} {:>10} {:>10}",
        "Latency",
        format_time_us(result.latency.mean),
        format_time_us(result.latency.stddev),
        format_time_us(result.latency.max)
    )?;

    if with_latencies {
        writeln!(out, "  Latency Distribution")?;
        for percentile in PERCENTILES {
            let value = result.latency.percentile(percentile).unwrap_or(0.0);
            writeln!(
                out,
                "  {:>6}% {:>10}",
                percentile,
                format_time_us(value)
            )?;
        }
    }

    let statuses = &result.statuses;
    writeln!(out, "  HTTP codes:")?;
    writeln!(
        out,
        "    1xx - {}, 2xx - {}, 3xx - {}, 4xx - {}, 5xx - {}",
        statuses.req1xx, statuses.req2xx, statuses.req3xx, statuses.req4xx, statuses.req5xx
    )?;
    writeln!(out, "    others - {}", statuses.others)?;

    if !result.errors.is_empty() {
        writeln!(out, "  Errors:")?;
        for error in &result.errors {
            writeln!(out, "    {:>10} - {}", error.description, error.count)?;
        }
    }

    writeln!(
        out,
        "  Throughput: {:>10}/s",
        format_binary(result.throughput())
    )?;
    Ok(())
}
