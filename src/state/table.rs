use chrono::{DateTime, Utc};

use crate::error::{Error, Result};

/// One timestamp plus the raw text of every value column.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    timestamp: DateTime<Utc>,
    cells: Vec<String>,
}

impl Row {
    pub fn new(timestamp: DateTime<Utc>, cells: Vec<String>) -> Self {
        Self { timestamp, cells }
    }

    /// A placeholder row whose every cell is blank.
    pub fn blank(timestamp: DateTime<Utc>, columns: usize) -> Self {
        Self {
            timestamp,
            cells: vec![String::new(); columns],
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn cell(&self, col: usize) -> Option<&str> {
        self.cells.get(col).map(String::as_str)
    }

    /// Overwrite a single cell. Out-of-range columns are ignored.
    pub fn set_cell(&mut self, col: usize, value: String) {
        if let Some(cell) = self.cells.get_mut(col) {
            *cell = value;
        }
    }

    pub(crate) fn retimed(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Header names (first one names the timestamp column) plus ordered rows.
///
/// Every row carries exactly `header_count() - 1` cells; this is checked on
/// construction and cannot be broken afterwards since rows only expose
/// per-cell mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Result<Self> {
        if headers.is_empty() {
            return Err(Error::Input("header row is empty".to_string()));
        }
        let expected = headers.len() - 1;
        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.cells.len() != expected)
        {
            return Err(Error::Input(format!(
                "row {} has {} value cells, expected {}",
                idx + 1,
                row.cells.len(),
                expected
            )));
        }
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Names of the value columns, i.e. every header except the timestamp one.
    pub fn value_headers(&self) -> &[String] {
        &self.headers[1..]
    }

    pub fn header_count(&self) -> usize {
        self.headers.len()
    }

    pub fn value_column_count(&self) -> usize {
        self.headers.len() - 1
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.cell(col))
    }

    /// Iterate one value column top to bottom.
    pub fn column(&self, col: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().filter_map(move |r| r.cell(col))
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Row>) {
        (self.headers, self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rejects_empty_header() {
        let err = Table::new(Vec::new(), Vec::new()).unwrap_err();
        assert!(matches!(err, Error::Input(_)));
    }

    #[test]
    fn rejects_row_with_wrong_cell_count() {
        let rows = vec![
            Row::new(ts(0), vec!["1".into(), "2".into()]),
            Row::new(ts(60), vec!["1".into()]),
        ];
        let err = Table::new(headers(&["time", "a", "b"]), rows).unwrap_err();
        match err {
            Error::Input(msg) => assert!(msg.contains("row 2"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn exposes_counts_and_cells() {
        let rows = vec![
            Row::new(ts(0), vec!["1".into(), "".into()]),
            Row::new(ts(60), vec!["BLOCK".into(), "4.5".into()]),
        ];
        let table = Table::new(headers(&["time", "a", "b"]), rows).unwrap();
        assert_eq!(table.header_count(), 3);
        assert_eq!(table.value_column_count(), 2);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.value_headers(), &["a".to_string(), "b".to_string()]);
        assert_eq!(table.cell(1, 0), Some("BLOCK"));
        assert_eq!(table.cell(0, 1), Some(""));
        assert_eq!(table.cell(2, 0), None);
        assert_eq!(table.column(1).collect::<Vec<_>>(), vec!["", "4.5"]);
    }

    #[test]
    fn timestamp_only_table_has_no_value_columns() {
        let rows = vec![Row::new(ts(0), Vec::new())];
        let table = Table::new(headers(&["time"]), rows).unwrap();
        assert_eq!(table.value_column_count(), 0);
    }

    #[test]
    fn set_cell_ignores_out_of_range_columns() {
        let mut row = Row::blank(ts(0), 2);
        row.set_cell(1, "3".into());
        row.set_cell(5, "9".into());
        assert_eq!(row.cells(), &["".to_string(), "3".to_string()]);
    }
}
