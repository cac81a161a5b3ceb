//! State shared between the listener thread and session callers.
//!
//! The listener is the only writer of the latest record; any number of
//! callers read it.  The record is published as one `Copy` value behind a
//! blocking mutex, so a reader sees either the previous record or the new
//! one, never a mix of both.
//!
//! ```text
//!  ┌──────────────┐ publish(record) ┌─────────────┐ latest() ┌─────────┐
//!  │ Listener     │────────────────▶│ SharedState │◀─────────│ Callers │
//!  │ (1 writer)   │                 │             │          │ (N)     │
//!  └──────────────┘                 └─────────────┘          └─────────┘
//! ```

use core::cell::Cell;
use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use crate::diagnostics::LinkCounters;
use crate::safety::Thresholds;
use crate::telegram::SensorRecord;

/// Connection status of a [`LinkSession`](crate::app::session::LinkSession).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LinkStatus {
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
}

impl LinkStatus {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Connecting,
            2 => Self::Connected,
            _ => Self::Disconnected,
        }
    }
}

pub(crate) struct SharedState {
    status: AtomicU8,
    latest: Mutex<CriticalSectionRawMutex, Cell<Option<SensorRecord>>>,
    thresholds: Mutex<CriticalSectionRawMutex, Cell<Thresholds>>,
    trace: AtomicBool,
    pub(crate) counters: LinkCounters,
}

impl SharedState {
    pub(crate) fn new(thresholds: Thresholds, trace_enabled: bool) -> Self {
        Self {
            status: AtomicU8::new(LinkStatus::Disconnected as u8),
            latest: Mutex::new(Cell::new(None)),
            thresholds: Mutex::new(Cell::new(thresholds)),
            trace: AtomicBool::new(trace_enabled),
            counters: LinkCounters::default(),
        }
    }

    // ── Status ────────────────────────────────────────────────

    pub(crate) fn status(&self) -> LinkStatus {
        LinkStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    pub(crate) fn set_status(&self, status: LinkStatus) {
        self.status.store(status as u8, Ordering::Release);
    }

    /// Move `Connected → Disconnected`.  Returns `false` if the session
    /// was not connected (e.g. a disconnect already won the race).
    pub(crate) fn mark_link_lost(&self) -> bool {
        self.status
            .compare_exchange(
                LinkStatus::Connected as u8,
                LinkStatus::Disconnected as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    // ── Latest record ─────────────────────────────────────────

    pub(crate) fn publish(&self, record: SensorRecord) {
        self.latest.lock(|cell| cell.set(Some(record)));
    }

    pub(crate) fn clear_record(&self) {
        self.latest.lock(|cell| cell.set(None));
    }

    pub(crate) fn latest(&self) -> Option<SensorRecord> {
        self.latest.lock(Cell::get)
    }

    // ── Thresholds / trace ────────────────────────────────────

    pub(crate) fn thresholds(&self) -> Thresholds {
        self.thresholds.lock(Cell::get)
    }

    pub(crate) fn set_thresholds(&self, thresholds: Thresholds) {
        self.thresholds.lock(|cell| cell.set(thresholds));
    }

    pub(crate) fn trace_enabled(&self) -> bool {
        self.trace.load(Ordering::Relaxed)
    }

    pub(crate) fn set_trace(&self, enabled: bool) {
        self.trace.store(enabled, Ordering::Relaxed);
    }
}
