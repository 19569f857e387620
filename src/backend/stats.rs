//! Backend Statistics Module
//!
//! Counts round trips per operation kind plus read hits and misses.

// == Backend Stats ==
/// Per-operation call counters for the in-process backend.
#[derive(Debug, Clone, Default)]
pub struct BackendStats {
    /// Single-key reads
    pub gets: u64,
    /// Single-key writes
    pub sets: u64,
    /// Multi-key reads
    pub multi_gets: u64,
    /// Multi-key writes
    pub multi_sets: u64,
    /// Single-key deletes
    pub deletes: u64,
    /// Multi-key deletes
    pub multi_deletes: u64,
    /// Set-if-absent attempts
    pub conditional_sets: u64,
    /// Compare-and-delete attempts
    pub conditional_deletes: u64,
    /// Keys read that were present
    pub hits: u64,
    /// Keys read that were absent or expired
    pub misses: u64,
    /// Live entries at snapshot time; expired but unswept entries are excluded
    pub total_entries: usize,
}

impl BackendStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of one key lookup.
    pub fn record_lookup(&mut self, found: bool) {
        if found {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }

    /// Total backend round trips of any kind.
    pub fn round_trips(&self) -> u64 {
        self.gets
            + self.sets
            + self.multi_gets
            + self.multi_sets
            + self.deletes
            + self.multi_deletes
            + self.conditional_sets
            + self.conditional_deletes
    }
}
