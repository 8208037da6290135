use std::io::Write;
use std::path::Path;

use crate::data::datetime::format_timestamp;
use crate::error::{Error, Result};
use crate::processing::statistics::{Statistic, TableStats};
use crate::state::table::Table;

/// Write the table followed by one statistics row per [`Statistic`].
pub fn write_table(path: &Path, table: &Table, stats: &TableStats) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| Error::io(path, e))?;
    write_table_to(file, table, stats)?;
    tracing::info!("Exported CSV to {:?}", path);
    Ok(())
}

pub fn write_table_to<W: Write>(out: W, table: &Table, stats: &TableStats) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().delimiter(b',').from_writer(out);

    writer.write_record(table.headers())?;

    let mut record: Vec<String> = Vec::with_capacity(table.header_count());
    for row in table.rows() {
        record.clear();
        record.push(format_timestamp(row.timestamp()));
        record.extend(row.cells().iter().cloned());
        writer.write_record(&record)?;
    }

    for statistic in Statistic::ALL {
        record.clear();
        record.push(statistic.label().to_string());
        record.extend(stats.columns.iter().map(|c| c.render(statistic)));
        writer.write_record(&record)?;
    }

    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}
