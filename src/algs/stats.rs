//! Counters collected while a derivative traverses a tree.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters, updated by traversal tasks.
#[derive(Debug, Default)]
pub struct TraversalStats {
    neighbor_requests: AtomicU64,
    mismatch_splits: AtomicU64,
    interior_nodes: AtomicU64,
    boundary_nodes: AtomicU64,
    published: AtomicU64,
}

/// Point-in-time copy of [`TraversalStats`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StatsSnapshot {
    /// Neighbor lookups sent to an owner (absent neighbors excluded).
    pub neighbor_requests: u64,
    /// Nodes whose neighbor turned out to be more refined.
    pub mismatch_splits: u64,
    pub interior_nodes: u64,
    pub boundary_nodes: u64,
    /// Output entries written, internal markers included.
    pub published: u64,
}

impl TraversalStats {
    pub(crate) fn neighbor_request(&self) {
        self.neighbor_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn mismatch_split(&self) {
        self.mismatch_splits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn interior(&self) {
        self.interior_nodes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn boundary(&self) {
        self.boundary_nodes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn publish(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            neighbor_requests: self.neighbor_requests.load(Ordering::Relaxed),
            mismatch_splits: self.mismatch_splits.load(Ordering::Relaxed),
            interior_nodes: self.interior_nodes.load(Ordering::Relaxed),
            boundary_nodes: self.boundary_nodes.load(Ordering::Relaxed),
            published: self.published.load(Ordering::Relaxed),
        }
    }
}

impl std::ops::Add for StatsSnapshot {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            neighbor_requests: self.neighbor_requests + rhs.neighbor_requests,
            mismatch_splits: self.mismatch_splits + rhs.mismatch_splits,
            interior_nodes: self.interior_nodes + rhs.interior_nodes,
            boundary_nodes: self.boundary_nodes + rhs.boundary_nodes,
            published: self.published + rhs.published,
        }
    }
}
