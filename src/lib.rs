//! Gap filling for irregularly sampled time series.
//!
//! A CSV table with one timestamp column and any number of value columns is
//! densified to its most common sampling step, blank cells between numeric
//! observations are linearly interpolated by elapsed time, and a block of
//! per-column statistics is appended on output.

pub mod data;
pub mod error;
pub mod job;
pub mod pipeline;
pub mod processing;
pub mod state;
pub mod upload;

pub use error::{Error, Result};
pub use job::{BackgroundRun, CancelFlag};
pub use pipeline::{process_file, process_table, Processed};
pub use state::options::{AlignmentPolicy, ProcessOptions};
pub use state::table::{Row, Table};
