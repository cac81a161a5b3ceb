//! Byte-arrival listener: the single writer of the telegram pipeline.
//!
//! Runs on a dedicated thread for the lifetime of one connection.  Each
//! read blocks until bytes arrive or the transport's read timeout lapses,
//! so the thread sleeps in the kernel rather than spinning.
//!
//! ```text
//!  Transport::read ──▶ TelegramFramer ──▶ decode() ──▶ SharedState::publish
//!                            │
//!                            └──▶ Rejected: counted, reported, record kept
//! ```

use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use log::{debug, info, warn};

use crate::app::events::MonitorEvent;
use crate::app::ports::EventSink;
use crate::diagnostics::{COMMUNICATIONS, VALUES};
use crate::safety::{self, Assessment, UnsafeReason};
use crate::telegram::{self, FrameResult, TelegramFramer};

use super::shared::SharedState;
use super::transport::Transport;

const READ_BUF_SIZE: usize = 256;

/// Pause after an empty read, for transports that return at once.
const IDLE_BACKOFF: Duration = Duration::from_millis(10);

/// Handle to a running listener thread.
pub(crate) struct Listener {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Listener {
    /// Spawn the listener for a freshly opened link.
    pub(crate) fn spawn<R>(
        reader: R,
        shared: Arc<SharedState>,
        sink: Arc<dyn EventSink>,
    ) -> std::io::Result<Self>
    where
        R: Transport + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let pipeline = Pipeline {
            framer: TelegramFramer::new(),
            shared,
            sink,
            last_reason: None,
        };
        let thread_stop = Arc::clone(&stop);
        let handle = std::thread::Builder::new()
            .name("skyguard-rx".into())
            .spawn(move || run(reader, pipeline, &thread_stop))?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Ask the thread to exit and wait for it.  Returns once no further
    /// record can be published by this listener.
    pub(crate) fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!(target: COMMUNICATIONS, "listener thread panicked");
            }
        }
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run<R: Transport>(mut reader: R, mut pipeline: Pipeline, stop: &AtomicBool) {
    let mut buf = [0u8; READ_BUF_SIZE];

    while !stop.load(Ordering::Acquire) {
        match reader.read(&mut buf) {
            Ok(0) => std::thread::sleep(IDLE_BACKOFF),
            Ok(n) => pipeline.feed(&buf[..n.min(READ_BUF_SIZE)]),
            Err(e) => {
                if stop.load(Ordering::Acquire) {
                    break;
                }
                warn!(target: COMMUNICATIONS, "link read failed: {:?}", e);
                pipeline.link_lost();
                break;
            }
        }
    }
    debug!(target: COMMUNICATIONS, "listener exiting");
}

// ── Framer → decoder → publish ──────────────────────────────

struct Pipeline {
    framer: TelegramFramer,
    shared: Arc<SharedState>,
    sink: Arc<dyn EventSink>,
    /// Reason behind the last published verdict, for change detection.
    last_reason: Option<Option<UnsafeReason>>,
}

impl Pipeline {
    fn feed(&mut self, data: &[u8]) {
        for &byte in data {
            if let Some(result) = self.framer.feed(byte) {
                self.on_frame(result);
            }
        }
        self.shared
            .counters
            .set_noise_bytes(self.framer.discarded_bytes());
    }

    fn on_frame(&mut self, result: FrameResult) {
        match result {
            FrameResult::Accepted(telegram) => {
                let record = telegram::decode(&telegram);
                self.shared.counters.record_accepted();
                self.shared.publish(record);

                if self.shared.trace_enabled() {
                    info!(
                        target: VALUES,
                        "telegram '{}' -> air={:?} hum={:?} pres={:?} sky={:?} amb={:?} mag={:?} rain={:?}",
                        telegram,
                        record.air_temperature,
                        record.humidity,
                        record.pressure,
                        record.sky_temperature,
                        record.ambient_temperature,
                        record.sky_magnitude,
                        record.rain_ratio,
                    );
                }

                let assessment = safety::assess(Some(&record), &self.shared.thresholds());
                self.sink
                    .emit(&MonitorEvent::TelegramAccepted { telegram, record });
                self.note_assessment(assessment);
            }
            FrameResult::Rejected(err) => {
                self.shared.counters.record_rejected();
                self.sink.emit(&MonitorEvent::TelegramRejected(err));
            }
        }
    }

    /// Emit verdict transitions once rather than on every telegram.
    fn note_assessment(&mut self, assessment: Assessment) {
        if self.last_reason == Some(assessment.reason) {
            return;
        }
        self.last_reason = Some(assessment.reason);
        self.sink.emit(&MonitorEvent::VerdictChanged(assessment));
    }

    fn link_lost(&mut self) {
        if self.shared.mark_link_lost() {
            self.shared.clear_record();
            self.framer.reset();
            self.sink.emit(&MonitorEvent::LinkLost);
        }
    }
}
