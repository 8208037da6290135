use std::collections::BTreeMap;

use chrono::TimeDelta;

use crate::error::{Error, Result};
use crate::state::table::Row;

/// Infer the sampling interval of rows sorted ascending by timestamp.
///
/// The step is the most frequent positive delta between consecutive
/// timestamps. Zero and negative deltas (duplicates, out-of-order rows) are
/// ignored. When several deltas share the highest count the smallest wins.
pub fn infer_step(sorted_rows: &[Row]) -> Result<TimeDelta> {
    if sorted_rows.len() < 2 {
        return Err(Error::Input("need at least 2 rows to interpolate".to_string()));
    }

    let mut counts: BTreeMap<TimeDelta, usize> = BTreeMap::new();
    for pair in sorted_rows.windows(2) {
        let delta = pair[1].timestamp() - pair[0].timestamp();
        if delta > TimeDelta::zero() {
            *counts.entry(delta).or_insert(0) += 1;
        }
    }

    // Ascending key order plus a strict comparison keeps the smallest delta on ties.
    let mut best: Option<(TimeDelta, usize)> = None;
    for (delta, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((delta, count));
        }
    }

    best.map(|(delta, _)| delta).ok_or(Error::StepDetection)
}
