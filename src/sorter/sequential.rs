//! Sequential strategy: sort every item on the calling thread.
//!
//! This is the reference the concurrent strategy is checked against.

use std::time::Instant;

use super::batch::{Batch, SortOutcome};

/// Sort each item of `batch` in place, in slot order, one at a time.
pub fn sort_sequential(mut batch: Batch) -> SortOutcome {
    let start = Instant::now();
    for item in batch.items_mut() {
        item.sort_unstable();
    }
    SortOutcome {
        batch,
        elapsed: start.elapsed(),
    }
}
