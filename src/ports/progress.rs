//! Progress outbound port. Report advancement of long-running multi-item operations.

/// Port for progress reporting (e.g. a terminal progress bar).
///
/// Use cases call it while copying files; adapters decide how to show it.
pub trait ProgressPort: Send + Sync {
    /// Announce `total` units of work.
    fn start(&self, total: u64);

    /// One unit finished. `label` names the item just handled.
    fn advance(&self, label: &str);

    fn finish(&self);
}

/// Progress sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressPort for NoProgress {
    fn start(&self, _total: u64) {}

    fn advance(&self, _label: &str) {}

    fn finish(&self) {}
}
