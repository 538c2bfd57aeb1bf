//! Batch and work item types.

use std::time::Duration;

/// One integer sequence to be sorted.
pub type WorkItem = Vec<i64>;

/// An ordered collection of work items submitted together.
///
/// Slot order is significant: the item at index `i` on input is the item
/// at index `i` on output. Only the elements inside each item are reordered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    items: Vec<WorkItem>,
}

impl Batch {
    pub fn new(items: Vec<WorkItem>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of integers across all items.
    pub fn total_elements(&self) -> usize {
        self.items.iter().map(Vec::len).sum()
    }

    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    pub(crate) fn items_mut(&mut self) -> &mut [WorkItem] {
        &mut self.items
    }

    /// Check that every item is in non-decreasing order.
    pub fn is_sorted(&self) -> bool {
        self.items
            .iter()
            .all(|item| item.windows(2).all(|w| w[0] <= w[1]))
    }

    pub fn into_items(self) -> Vec<WorkItem> {
        self.items
    }

    /// Move every item out, leaving the batch empty until restored.
    pub(crate) fn take_items(&mut self) -> Vec<WorkItem> {
        std::mem::take(&mut self.items)
    }

    pub(crate) fn restore_items(&mut self, items: Vec<WorkItem>) {
        self.items = items;
    }
}

impl From<Vec<WorkItem>> for Batch {
    fn from(items: Vec<WorkItem>) -> Self {
        Self::new(items)
    }
}

/// A sorted batch paired with the time spent sorting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOutcome {
    pub batch: Batch,
    pub elapsed: Duration,
}

impl SortOutcome {
    /// Elapsed time in nanoseconds, saturating at `i64::MAX`.
    pub fn elapsed_ns(&self) -> i64 {
        i64::try_from(self.elapsed.as_nanos()).unwrap_or(i64::MAX)
    }
}
