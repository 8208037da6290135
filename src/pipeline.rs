//! End-to-end run: read, sort, infer the step, complete the grid, interpolate,
//! compute statistics, write.

use std::path::{Path, PathBuf};

use chrono::TimeDelta;

use crate::data::{loader, naming, writer};
use crate::error::{Error, Result};
use crate::job::CancelFlag;
use crate::processing::grid::complete_grid;
use crate::processing::interpolate::interpolate_all;
use crate::processing::statistics::TableStats;
use crate::processing::step::infer_step;
use crate::state::options::ProcessOptions;
use crate::state::table::Table;
use crate::upload::{ArtifactUploader, DirectoryUploader, ObjectStoreUploader};

/// Outcome of [`process_table`].
#[derive(Debug, Clone)]
pub struct Processed {
    pub table: Table,
    pub step: TimeDelta,
    /// Placeholder rows added by grid completion.
    pub inserted: usize,
    /// Original rows that did not make it onto the grid.
    pub dropped: usize,
    /// Rows moved onto the grid by snapping.
    pub snapped: usize,
    /// Cells filled by interpolation.
    pub filled: usize,
    pub stats: TableStats,
}

/// Run the gap-filling engine over an in-memory table.
///
/// `cancel` is checked before each column is interpolated.
pub fn process_table(table: Table, options: &ProcessOptions, cancel: &CancelFlag) -> Result<Processed> {
    let (headers, mut rows) = table.into_parts();
    let value_columns = headers.len().saturating_sub(1);

    // Stable, so duplicates keep their file order.
    rows.sort_by_key(|r| r.timestamp());

    let step = infer_step(&rows)?;
    let grid = complete_grid(step, rows, value_columns, options.alignment)?;
    let mut table = Table::new(headers, grid.rows)?;

    let filled = interpolate_all(table.rows_mut(), value_columns, cancel)?;

    let stats = TableStats::compute(&table);

    Ok(Processed {
        table,
        step,
        inserted: grid.inserted,
        dropped: grid.dropped.len(),
        snapped: grid.snapped,
        filled,
        stats,
    })
}

/// Process one file and return the path of the written output.
pub fn process_file(input: &Path, options: &ProcessOptions) -> Result<PathBuf> {
    process_file_with_cancel(input, options, &CancelFlag::default())
}

/// The uploader configured by `options`, if any.
pub fn uploader(options: &ProcessOptions) -> Result<Option<Box<dyn ArtifactUploader>>> {
    let uploader: Box<dyn ArtifactUploader> = match (&options.upload_dir, &options.object_store) {
        (Some(dir), Some(target)) => Box::new(ObjectStoreUploader::new(target.clone(), dir)),
        (Some(dir), None) => Box::new(DirectoryUploader::new(dir)),
        (None, Some(target)) => {
            return Err(Error::Upload(format!(
                "object store bucket '{}' needs an upload directory to stage into",
                target.bucket
            )))
        }
        (None, None) => return Ok(None),
    };
    Ok(Some(uploader))
}

pub fn process_file_with_cancel(
    input: &Path,
    options: &ProcessOptions,
    cancel: &CancelFlag,
) -> Result<PathBuf> {
    let uploader = uploader(options)?;
    let table = loader::read_table(input, options.timestamp_format.as_deref())?;
    let source_rows = table.row_count();

    let processed = process_table(table, options, cancel)?;
    tracing::info!(
        "{:?}: {} rows -> {} rows at step {}, {} inserted, {} cells filled",
        input,
        source_rows,
        processed.table.row_count(),
        processed.step,
        processed.inserted,
        processed.filled
    );
    if processed.dropped > 0 {
        tracing::warn!(
            "{:?}: {} rows left off the {} grid (alignment: {})",
            input,
            processed.dropped,
            processed.step,
            options.alignment.label()
        );
    }
    if processed.snapped > 0 {
        tracing::warn!("{:?}: {} rows snapped onto the grid", input, processed.snapped);
    }

    let output = naming::output_path(input, &options.suffix, options.output_dir.as_deref());
    if naming::overwrites_input(input, &output) {
        tracing::warn!("{:?}: no suffix or output directory given, overwriting the input", input);
    }
    if let Some(dir) = &options.output_dir {
        std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }
    writer::write_table(&output, &processed.table, &processed.stats)?;

    if options.stats_json {
        let report = naming::stats_report_path(&output);
        let json = processed.stats.to_json()?;
        std::fs::write(&report, json).map_err(|e| Error::io(&report, e))?;
        tracing::info!("Statistics report saved to {:?}", report);
    }

    if let Some(uploader) = uploader {
        let locator = uploader.upload(&output)?;
        tracing::info!("Uploaded {:?} to {}", output, locator);
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::table::Row;
    use crate::upload::ObjectStoreTarget;
    use chrono::{DateTime, TimeZone, Utc};

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn table(rows: &[(i64, &str)]) -> Table {
        Table::new(
            vec!["t".into(), "v".into()],
            rows.iter()
                .map(|&(s, v)| Row::new(ts(s), vec![v.to_string()]))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn scenario_midpoint() {
        let input = table(&[(0, "10"), (3600, ""), (7200, "20")]);
        let out = process_table(input, &ProcessOptions::default(), &CancelFlag::default()).unwrap();
        assert_eq!(out.step, TimeDelta::hours(1));
        assert_eq!(out.table.cell(1, 0), Some("15"));
        assert_eq!(out.filled, 1);
    }

    #[test]
    fn sorts_unordered_input() {
        let input = table(&[(7200, "20"), (0, "10"), (10800, "")]);
        let out = process_table(input, &ProcessOptions::default(), &CancelFlag::default()).unwrap();
        let stamps: Vec<i64> = out.table.rows().iter().map(|r| r.timestamp().timestamp()).collect();
        assert_eq!(stamps, vec![0, 3600, 7200, 10800]);
        assert_eq!(out.table.cell(1, 0), Some("15"));
        assert_eq!(out.table.cell(3, 0), Some(""));
        assert_eq!(out.inserted, 1);
    }

    #[test]
    fn cancelled_run_stops_before_interpolating() {
        let flag = CancelFlag::default();
        flag.cancel();
        let input = table(&[(0, "1"), (60, ""), (120, "3")]);
        let err = process_table(input, &ProcessOptions::default(), &flag).unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[test]
    fn object_store_without_staging_dir_is_rejected() {
        let options = ProcessOptions {
            object_store: Some(ObjectStoreTarget::new("b", "eu-west-1", "")),
            ..ProcessOptions::default()
        };
        assert!(matches!(uploader(&options), Err(Error::Upload(_))));
        assert!(uploader(&ProcessOptions::default()).unwrap().is_none());
    }

    #[test]
    fn single_row_is_an_input_error() {
        let input = table(&[(0, "1")]);
        let err = process_table(input, &ProcessOptions::default(), &CancelFlag::default()).unwrap_err();
        assert!(matches!(err, Error::Input(_)));
    }
}
