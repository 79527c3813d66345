//! Reading and writing `position;time` lap data files.
//!
//! Raw recordings and processed output share the same layout: one sample
//! per line, two `;` separated floating point fields, no header. Blank
//! lines and `#` comment lines are ignored on input. Output values are
//! written with a fixed number of decimals.

use crate::constants::{FIELD_DELIMITER, OUTPUT_PRECISION};
use crate::error::{LapDataError, Result};
use crate::models::{RawTrace, ResampledTrace};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fmt::Write as _;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Read a lap data file into a trace.
pub fn read_trace(path: &Path) -> Result<RawTrace> {
    let file = std::fs::File::open(path)?;
    let trace = parse_trace(file, path)?;
    debug!("Read {} samples from {}", trace.len(), path.display());
    Ok(trace)
}

/// Parse lap data rows from any reader; `path` is only used for errors.
pub fn parse_trace<R: Read>(reader: R, path: &Path) -> Result<RawTrace> {
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(FIELD_DELIMITER)
        .has_headers(false)
        .comment(Some(b'#'))
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut positions = Vec::new();
    let mut times = Vec::new();
    let mut record = StringRecord::new();

    while csv_reader.read_record(&mut record)? {
        let line = record.position().map_or(0, |pos| pos.line());
        let (position, time) = parse_row(&record, path, line)?;
        positions.push(position);
        times.push(time);
    }

    Ok(RawTrace::new(positions, times))
}

fn parse_row(record: &StringRecord, path: &Path, line: u64) -> Result<(f64, f64)> {
    if record.len() != 2 {
        return Err(LapDataError::MalformedInput {
            path: path.to_path_buf(),
            line,
            reason: format!("expected 2 fields, found {}", record.len()),
        });
    }

    let field = |index: usize, name: &str| -> Result<f64> {
        let raw = &record[index];
        raw.parse::<f64>().map_err(|e| LapDataError::MalformedInput {
            path: path.to_path_buf(),
            line,
            reason: format!("invalid {} '{}': {}", name, raw, e),
        })
    };

    Ok((field(0, "position")?, field(1, "time")?))
}

/// Format a resampled trace as output text.
pub fn format_trace(trace: &ResampledTrace) -> String {
    let delimiter = FIELD_DELIMITER as char;
    let mut out = String::with_capacity(trace.len() * (2 * (OUTPUT_PRECISION + 4) + 2));
    for (position, time) in trace.rows() {
        // Writing into a String cannot fail
        let _ = writeln!(
            out,
            "{:.prec$}{}{:.prec$}",
            position,
            delimiter,
            time,
            prec = OUTPUT_PRECISION
        );
    }
    out
}

/// Write a resampled trace to `path`, creating its directory if needed.
pub async fn write_trace(path: &Path, trace: &ResampledTrace) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, format_trace(trace)).await?;
    debug!("Wrote {} rows to {}", trace.len(), path.display());
    Ok(())
}
