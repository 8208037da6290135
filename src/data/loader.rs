use std::path::Path;

use crate::data::datetime::{detect_date_format, TimestampFormat};
use crate::data::parser;
use crate::error::{Error, Result};
use crate::processing::statistics::Statistic;
use crate::state::table::{Row, Table};

/// Load a CSV file into a [`Table`].
///
/// The first record is the header; its first name labels the timestamp
/// column. Reading stops at the first record whose first field is a
/// statistics label, so previously produced files load back cleanly.
pub fn read_table(path: &Path, timestamp_format: Option<&str>) -> Result<Table> {
    let content = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    let text = parser::decode_text(content);
    let table = read_table_from_str(&text, timestamp_format)?;
    tracing::debug!(
        "Loaded {} rows x {} columns from {:?}",
        table.row_count(),
        table.header_count(),
        path
    );
    Ok(table)
}

/// Parse CSV text into a [`Table`]. See [`read_table`].
pub fn read_table_from_str(text: &str, timestamp_format: Option<&str>) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = reader.records();

    let header_record = match records.next() {
        Some(record) => record?,
        None => return Err(Error::Input("CSV file is empty".to_string())),
    };
    let headers: Vec<String> = header_record.iter().map(|s| s.trim().to_string()).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(Error::Input("CSV header is empty".to_string()));
    }
    let value_columns = headers.len() - 1;

    // (line, raw timestamp, cells)
    let mut raw_rows: Vec<(usize, String, Vec<String>)> = Vec::new();
    for result in records {
        let record = result?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);

        let first = record.get(0).unwrap_or("").trim();
        if Statistic::from_label(first).is_some() {
            tracing::debug!("Statistics block starts at line {line}; ignoring the rest");
            break;
        }
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }

        if record.len() > headers.len() {
            tracing::debug!(
                "Line {line}: {} fields, ignoring those past the {} header columns",
                record.len(),
                headers.len()
            );
        }
        let cells: Vec<String> = (1..=value_columns)
            .map(|idx| record.get(idx).map(|s| s.trim().to_string()).unwrap_or_default())
            .collect();
        raw_rows.push((line, first.to_string(), cells));
    }

    let format = match timestamp_format {
        Some(fmt) => TimestampFormat::from_user(fmt),
        None => {
            let stamps: Vec<&str> = raw_rows.iter().map(|(_, ts, _)| ts.as_str()).collect();
            match detect_date_format(&stamps) {
                Some(format) => format,
                None => {
                    return match raw_rows.first() {
                        Some((line, value, _)) => Err(Error::Timestamp {
                            line: *line,
                            value: value.clone(),
                        }),
                        None => Table::new(headers, Vec::new()),
                    };
                }
            }
        }
    };

    let mut rows = Vec::with_capacity(raw_rows.len());
    for (line, raw_ts, cells) in raw_rows {
        let timestamp = format
            .parse(&raw_ts)
            .ok_or(Error::Timestamp { line, value: raw_ts })?;
        rows.push(Row::new(timestamp, cells));
    }

    Table::new(headers, rows)
}
