// src/progress.rs
/// Lightweight progress reporting for a refresh cycle (downloads, snapshot parsing).
/// Callers that want to observe a cycle implement this; everyone else passes `NullProgress`.
pub trait Progress {
    /// Called at the start of a stage with the number of items (if known).
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// One file done (downloaded, or parsed and scored).
    fn item_done(&mut self, _name: &str) {}

    /// One file skipped; the rest of the batch continues.
    fn item_failed(&mut self, _name: &str, _reason: &str) {}

    /// Called at the end of a stage, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}
