//! Mutation result types.

use crate::diff::ChainDiff;

/// Outcome of a mutation that produces a value, such as a new id.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome<T> {
    /// The produced value.
    pub value: T,
    /// Net changes, snapshotted after the mutation.
    pub diff: ChainDiff,
}

impl<T> MutationOutcome<T> {
    pub fn new(value: T, diff: ChainDiff) -> Self {
        Self { value, diff }
    }

    /// Split into value and diff.
    pub fn into_parts(self) -> (T, ChainDiff) {
        (self.value, self.diff)
    }
}
