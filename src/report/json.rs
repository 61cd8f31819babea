use std::io::Write;

use super::types::Report;
use crate::error::AppResult;

/// Writes the report as a single JSON document followed by a newline.
///
/// # Errors
///
/// Returns an error when serialization or writing fails.
pub fn write_json<W>(report: &Report, out: &mut W) -> AppResult<()>
where
    W: Write,
{
    serde_json::to_writer(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}
