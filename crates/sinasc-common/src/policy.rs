//! Error policy shared by the dual-mode cleaning operations.

/// How an operation reacts to a configured column that is absent from the
/// frame, or to data it cannot process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Log a diagnostic and skip the offending column or step.
    #[default]
    Permissive,
    /// Return a typed error and stop the operation.
    Strict,
}

impl ErrorPolicy {
    pub fn is_strict(self) -> bool {
        matches!(self, Self::Strict)
    }
}
