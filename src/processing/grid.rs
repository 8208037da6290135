use chrono::{DateTime, TimeDelta, Utc};

use crate::data::datetime::format_timestamp;
use crate::error::{Error, Result};
use crate::processing::nanos;
use crate::state::options::AlignmentPolicy;
use crate::state::table::Row;

/// Regular row sequence produced by [`complete_grid`].
#[derive(Debug, Clone)]
pub struct CompletedGrid {
    pub rows: Vec<Row>,
    /// Placeholder rows synthesised for missing timestamps.
    pub inserted: usize,
    /// Original timestamps left off the grid: unaligned rows under
    /// [`AlignmentPolicy::Drop`], and snapped rows that lost their slot.
    pub dropped: Vec<DateTime<Utc>>,
    /// Rows moved onto the grid under [`AlignmentPolicy::Snap`].
    pub snapped: usize,
}

struct Slot {
    row: Row,
    aligned: bool,
}

/// Build the regular grid `first, first + step, ...` up to and including the
/// last original timestamp.
///
/// `sorted_rows` must be sorted ascending by timestamp. A row whose timestamp
/// lands exactly on the grid is reused verbatim; when several do, the last
/// one wins. Every other grid slot gets a row of `value_columns` blank cells.
/// The resulting length is `floor((last - first) / step) + 1`.
pub fn complete_grid(
    step: TimeDelta,
    sorted_rows: Vec<Row>,
    value_columns: usize,
    policy: AlignmentPolicy,
) -> Result<CompletedGrid> {
    let step_ns = nanos(step);
    if step_ns <= 0 {
        return Err(Error::Input(format!("step must be positive, got {step}")));
    }
    let (first, last) = match (sorted_rows.first(), sorted_rows.last()) {
        (Some(f), Some(l)) => (f.timestamp(), l.timestamp()),
        _ => {
            return Ok(CompletedGrid {
                rows: Vec::new(),
                inserted: 0,
                dropped: Vec::new(),
                snapped: 0,
            })
        }
    };

    let last_slot = usize::try_from(nanos(last - first) / step_ns)
        .map_err(|_| Error::Input("time range too large for the inferred step".to_string()))?;

    let mut slots: Vec<Option<Slot>> = Vec::new();
    slots
        .try_reserve_exact(last_slot + 1)
        .map_err(|_| Error::Input(format!("grid of {} rows does not fit in memory", last_slot + 1)))?;
    slots.resize_with(last_slot + 1, || None);

    let mut dropped = Vec::new();
    let mut snapped = 0usize;

    for row in sorted_rows {
        let offset = nanos(row.timestamp() - first);
        let quotient = (offset / step_ns) as usize;
        let remainder = offset % step_ns;

        if remainder == 0 {
            // Later duplicates replace earlier ones; an aligned row also evicts a snapped one.
            if let Some(Slot { row: displaced, aligned: false }) =
                slots[quotient].replace(Slot { row, aligned: true })
            {
                dropped.push(displaced.timestamp());
                snapped -= 1;
            }
            continue;
        }

        match policy {
            AlignmentPolicy::Reject => {
                return Err(Error::Input(format!(
                    "timestamp {} is not aligned to the {} step grid starting at {}",
                    format_timestamp(row.timestamp()),
                    step,
                    format_timestamp(first)
                )));
            }
            AlignmentPolicy::Drop => dropped.push(row.timestamp()),
            AlignmentPolicy::Snap => {
                let nearest = if remainder * 2 > step_ns { quotient + 1 } else { quotient };
                let idx = nearest.min(last_slot);
                if slots[idx].is_none() {
                    slots[idx] = Some(Slot { row, aligned: false });
                    snapped += 1;
                } else {
                    dropped.push(row.timestamp());
                }
            }
        }
    }

    let mut rows = Vec::with_capacity(slots.len());
    let mut inserted = 0usize;
    let mut current = first;
    for (idx, slot) in slots.into_iter().enumerate() {
        if idx > 0 {
            current = current
                .checked_add_signed(step)
                .ok_or_else(|| Error::Input("grid runs past the representable time range".to_string()))?;
        }
        match slot {
            Some(Slot { row, aligned: true }) => rows.push(row),
            Some(Slot { row, aligned: false }) => rows.push(row.retimed(current)),
            None => {
                rows.push(Row::blank(current, value_columns));
                inserted += 1;
            }
        }
    }

    Ok(CompletedGrid {
        rows,
        inserted,
        dropped,
        snapped,
    })
}
