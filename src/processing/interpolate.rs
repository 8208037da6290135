use chrono::{DateTime, Utc};

use crate::data::parser::{classify, format_number, CellKind};
use crate::error::{Error, Result};
use crate::job::CancelFlag;
use crate::processing::nanos;
use crate::state::table::Row;

/// A numeric cell used as an interpolation endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

fn next_anchor(rows: &[Row], col: usize, from: usize) -> Option<Anchor> {
    rows.iter()
        .enumerate()
        .skip(from)
        .find_map(|(index, row)| match classify(row.cell(col)?) {
            CellKind::Numeric(value) => Some(Anchor {
                index,
                timestamp: row.timestamp(),
                value,
            }),
            _ => None,
        })
}

/// Linear interpolation by elapsed time between two anchors.
/// Returns `None` for a zero-length span. The result always lies between the
/// two anchor values, even when their difference overflows `f64`.
pub fn value_at(start: &Anchor, end: &Anchor, at: DateTime<Utc>) -> Option<f64> {
    let total = nanos(end.timestamp - start.timestamp);
    if total == 0 {
        return None;
    }
    let elapsed = nanos(at - start.timestamp);
    let ratio = (elapsed as f64 / total as f64).clamp(0.0, 1.0);

    let span = end.value - start.value;
    let value = if span.is_finite() {
        start.value + span * ratio
    } else {
        start.value * (1.0 - ratio) + end.value * ratio
    };
    Some(value.clamp(start.value.min(end.value), start.value.max(end.value)))
}

/// Fill the blank cells of one value column that lie strictly between two
/// numeric anchors. Keyword cells are left alone, nothing before the first or
/// after the last anchor is touched, and zero-length spans are skipped.
///
/// Returns the number of cells filled.
pub fn interpolate_column(rows: &mut [Row], col: usize) -> usize {
    let mut filled = 0usize;
    let Some(mut start) = next_anchor(rows, col, 0) else {
        return 0;
    };

    while let Some(end) = next_anchor(rows, col, start.index + 1) {
        for row in &mut rows[start.index + 1..end.index] {
            let is_blank = row.cell(col).map_or(false, |c| classify(c).is_blank());
            if !is_blank {
                continue;
            }
            let Some(value) = value_at(&start, &end, row.timestamp()) else {
                break;
            };
            row.set_cell(col, format_number(value));
            filled += 1;
        }
        start = end;
    }

    filled
}

/// Interpolate every value column in turn, checking `cancel` before each one.
/// Returns the number of cells filled.
pub fn interpolate_all(rows: &mut [Row], value_columns: usize, cancel: &CancelFlag) -> Result<usize> {
    let mut filled = 0usize;
    for col in 0..value_columns {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        filled += interpolate_column(rows, col);
    }
    Ok(filled)
}
