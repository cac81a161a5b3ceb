//! Mock serial link for integration tests.
//!
//! [`MockDevice`] plays the sensor: tests push bytes into it, break the
//! link, and inspect every byte the session wrote.  [`MockConnector`]
//! hands the session reader/writer halves wired to the device.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use skyguard::app::events::MonitorEvent;
use skyguard::app::ports::{Connector, EventSink};
use skyguard::config::LinkSettings;
use skyguard::error::LinkError;
use skyguard::link::transport::Transport;

const READ_TIMEOUT: Duration = Duration::from_millis(10);

enum Wire {
    Bytes(Vec<u8>),
    Break,
}

// ── MockDevice ────────────────────────────────────────────────

#[derive(Default)]
pub struct MockDevice {
    inbox: Mutex<Option<Sender<Wire>>>,
    written: Mutex<Vec<u8>>,
    opened_with: Mutex<Vec<LinkSettings>>,
    opens: AtomicUsize,
    pub fail_open: AtomicBool,
    pub fail_write: AtomicBool,
}

#[allow(dead_code)]
impl MockDevice {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Deliver bytes to the listener as one read.
    pub fn send(&self, bytes: &[u8]) {
        if let Some(tx) = self.inbox.lock().unwrap().as_ref() {
            let _ = tx.send(Wire::Bytes(bytes.to_vec()));
        }
    }

    /// Make the next read fail, as if the cable were pulled.
    pub fn break_link(&self) {
        if let Some(tx) = self.inbox.lock().unwrap().as_ref() {
            let _ = tx.send(Wire::Break);
        }
    }

    pub fn written(&self) -> Vec<u8> {
        self.written.lock().unwrap().clone()
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn last_settings(&self) -> Option<LinkSettings> {
        self.opened_with.lock().unwrap().last().cloned()
    }
}

// ── MockConnector ─────────────────────────────────────────────

pub struct MockConnector {
    device: Arc<MockDevice>,
}

impl MockConnector {
    pub fn new(device: &Arc<MockDevice>) -> Self {
        Self {
            device: Arc::clone(device),
        }
    }
}

impl Connector for MockConnector {
    type Reader = MockReader;
    type Writer = MockWriter;

    fn open(&mut self, settings: &LinkSettings) -> Result<(MockReader, MockWriter), LinkError> {
        self.device.opened_with.lock().unwrap().push(settings.clone());
        if self.device.fail_open.load(Ordering::SeqCst) {
            return Err(LinkError::Unavailable);
        }
        self.device.opens.fetch_add(1, Ordering::SeqCst);

        let (tx, rx) = mpsc::channel();
        *self.device.inbox.lock().unwrap() = Some(tx);
        Ok((
            MockReader {
                rx,
                pending: Vec::new(),
            },
            MockWriter {
                device: Arc::clone(&self.device),
            },
        ))
    }
}

pub struct MockReader {
    rx: Receiver<Wire>,
    pending: Vec<u8>,
}

impl Transport for MockReader {
    type Error = &'static str;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, &'static str> {
        if self.pending.is_empty() {
            match self.rx.recv_timeout(READ_TIMEOUT) {
                Ok(Wire::Bytes(bytes)) => self.pending = bytes,
                Ok(Wire::Break) => return Err("link broken"),
                Err(RecvTimeoutError::Timeout) => return Ok(0),
                Err(RecvTimeoutError::Disconnected) => {
                    std::thread::sleep(READ_TIMEOUT);
                    return Ok(0);
                }
            }
        }
        let n = self.pending.len().min(buf.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending = self.pending.split_off(n);
        Ok(n)
    }

    fn write(&mut self, _data: &[u8]) -> Result<usize, &'static str> {
        Err("reader half")
    }

    fn flush(&mut self) -> Result<(), &'static str> {
        Ok(())
    }
}

pub struct MockWriter {
    device: Arc<MockDevice>,
}

impl Transport for MockWriter {
    type Error = &'static str;

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, &'static str> {
        Ok(0)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, &'static str> {
        if self.device.fail_write.load(Ordering::SeqCst) {
            return Err("write failed");
        }
        self.device.written.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), &'static str> {
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<MonitorEvent>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<MonitorEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&MonitorEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &MonitorEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ── Helpers ───────────────────────────────────────────────────

/// Poll `cond` until it holds or two seconds pass.
pub fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    cond()
}
