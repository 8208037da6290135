pub mod grid;
pub mod interpolate;
pub mod statistics;
pub mod step;

use chrono::TimeDelta;

/// Exact length of a duration in nanoseconds. `TimeDelta::num_nanoseconds`
/// overflows past ~292 years; this does not.
pub(crate) fn nanos(delta: TimeDelta) -> i128 {
    delta.num_seconds() as i128 * 1_000_000_000 + delta.subsec_nanos() as i128
}
