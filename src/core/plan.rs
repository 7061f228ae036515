//! Dry-run rendering of a batch

use crate::core::Operation;

/// Number of decimal digits needed to print `n`
fn num_places(n: usize) -> usize {
    n.checked_ilog10().map_or(1, |log| log as usize + 1)
}

/// One line per operation describing what would be done, prefixed with its
/// index padded to the width of the batch size
pub fn describe_batch(operations: &[Operation]) -> Vec<String> {
    let width = num_places(operations.len());
    operations
        .iter()
        .enumerate()
        .map(|(i, op)| format!("{:>width$}: {}", i, op.display_intent(), width = width))
        .collect()
}
