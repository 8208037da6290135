//! Running a file through the pipeline on a worker thread so a caller with an
//! interactive surface can keep polling instead of blocking.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::error::{Error, Result};
use crate::pipeline;
use crate::state::options::ProcessOptions;

/// Shared, advisory cancellation flag. The pipeline checks it between
/// columns, never inside a column.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

type Slot = Arc<Mutex<Option<Result<PathBuf>>>>;

/// A pending background run of [`pipeline::process_file`].
pub struct BackgroundRun {
    input: PathBuf,
    result: Slot,
    cancel: CancelFlag,
    handle: Option<JoinHandle<()>>,
}

impl BackgroundRun {
    pub fn spawn(input: &Path, options: ProcessOptions) -> Self {
        let input = input.to_path_buf();
        let result: Slot = Arc::new(Mutex::new(None));
        let cancel = CancelFlag::default();

        let worker_input = input.clone();
        let worker_result = Arc::clone(&result);
        let worker_cancel = cancel.clone();
        let handle = std::thread::spawn(move || {
            let outcome = pipeline::process_file_with_cancel(&worker_input, &options, &worker_cancel);
            let mut lock = match worker_result.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            *lock = Some(outcome);
        });

        Self {
            input,
            result,
            cancel,
            handle: Some(handle),
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Request cancellation. Takes effect at the next column boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Take the result if the run has finished. Returns `None` while it is
    /// still running and after the result has been taken once.
    pub fn poll(&self) -> Option<Result<PathBuf>> {
        let mut lock = match self.result.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        lock.take()
    }

    /// Block until the run finishes.
    pub fn wait(mut self) -> Result<PathBuf> {
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| Error::Worker(format!("worker for {:?} panicked", self.input)))?;
        }
        self.poll()
            .unwrap_or_else(|| Err(Error::Worker(format!("no result recorded for {:?}", self.input))))
    }
}
