//! Link diagnostics.
//!
//! The listener thread counts what it sees on the wire; callers read a
//! [`LinkStats`] snapshot on demand.  Counters are reset whenever a new
//! connection is opened.
//!
//! Free-text diagnostics go through the `log` facade, tagged with one of
//! the category targets below so a logger can route or filter them.

use core::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Log target for link lifecycle, link errors, and rejected frames.
pub const COMMUNICATIONS: &str = "communications";

/// Log target for decoded values and verdict changes.
pub const VALUES: &str = "values";

/// Point-in-time link statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStats {
    /// Telegrams framed, decoded and published.
    pub telegrams_accepted: u64,
    /// Frames discarded (too long).
    pub telegrams_rejected: u64,
    /// Bytes dropped outside any frame.
    pub noise_bytes: u64,
}

/// Lock-free counters written by the listener thread.
#[derive(Debug, Default)]
pub(crate) struct LinkCounters {
    accepted: AtomicU64,
    rejected: AtomicU64,
    noise_bytes: AtomicU64,
}

impl LinkCounters {
    pub(crate) fn record_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn set_noise_bytes(&self, total: u64) {
        self.noise_bytes.store(total, Ordering::Relaxed);
    }

    pub(crate) fn reset(&self) {
        self.accepted.store(0, Ordering::Relaxed);
        self.rejected.store(0, Ordering::Relaxed);
        self.noise_bytes.store(0, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> LinkStats {
        LinkStats {
            telegrams_accepted: self.accepted.load(Ordering::Relaxed),
            telegrams_rejected: self.rejected.load(Ordering::Relaxed),
            noise_bytes: self.noise_bytes.load(Ordering::Relaxed),
        }
    }
}
