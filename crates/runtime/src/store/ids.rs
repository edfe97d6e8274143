//! Record id allocation.

use std::sync::atomic::{AtomicU64, Ordering};

/// Strictly increasing id counter.
///
/// Ids are rendered as zero-padded decimal so that lexical order matches
/// allocation order.
#[derive(Debug)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    /// Counter whose first id is `first`.
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first.max(1)),
        }
    }

    /// Hand out the next id.
    pub fn allocate(&self) -> (u64, String) {
        let value = self.next.fetch_add(1, Ordering::SeqCst);
        (value, render(value))
    }

    /// Value the next call to [`allocate`](Self::allocate) will return.
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

fn render(value: u64) -> String {
    format!("{value:012}")
}
