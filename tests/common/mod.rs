#![allow(dead_code)]

use std::path::{Path, PathBuf};

use gapfill::data::loader::read_table_from_str;
use gapfill::Table;

type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

pub fn write_fixture(dir: &Path, name: &str, contents: &str) -> TestResult<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, contents)?;
    Ok(path)
}

/// Hourly RFC 3339 timestamp `hours` after 2025-01-01T00:00:00Z.
pub fn hour(hours: u32) -> String {
    let day = 1 + hours / 24;
    format!("2025-01-{:02}T{:02}:00:00Z", day, hours % 24)
}

/// Read an output file, splitting the data section from the statistics lines.
pub fn read_output(path: &Path) -> TestResult<(Table, Vec<String>)> {
    let text = std::fs::read_to_string(path)?;
    let stats: Vec<String> = text
        .lines()
        .skip_while(|l| !l.starts_with("Average,"))
        .map(str::to_string)
        .collect();
    Ok((read_table_from_str(&text, None)?, stats))
}

pub fn row_at(table: &Table, timestamp: &str) -> usize {
    table
        .rows()
        .iter()
        .position(|r| gapfill::data::datetime::format_timestamp(r.timestamp()) == timestamp)
        .unwrap_or_else(|| panic!("timestamp not found in rows: {timestamp}"))
}
