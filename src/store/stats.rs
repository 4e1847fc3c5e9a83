//! Store Statistics Module
//!
//! Counts operations served by a store.

use serde::Serialize;

// == Store Stats ==
/// Operation counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Point lookups
    pub point_reads: u64,
    /// Query segments served
    pub queries: u64,
    /// Successful inserts
    pub inserts: u64,
    /// Successful replaces
    pub replaces: u64,
    /// Successful deletes
    pub deletes: u64,
}

impl StoreStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Writes ==
    /// Total successful writes of any kind.
    pub fn writes(&self) -> u64 {
        self.inserts + self.replaces + self.deletes
    }

    pub fn record_insert(&mut self) {
        self.inserts += 1;
    }

    pub fn record_replace(&mut self) {
        self.replaces += 1;
    }

    pub fn record_delete(&mut self) {
        self.deletes += 1;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = StoreStats::new();
        assert_eq!(stats.point_reads, 0);
        assert_eq!(stats.queries, 0);
        assert_eq!(stats.writes(), 0);
    }

    #[test]
    fn test_writes_sum() {
        let mut stats = StoreStats::new();
        stats.record_insert();
        stats.record_replace();
        stats.record_delete();
        stats.record_delete();
        assert_eq!(stats.writes(), 4);
        assert_eq!(stats.point_reads, 0);
    }
}
