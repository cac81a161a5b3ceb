//! Serial port adapter.
//!
//! Implements [`Connector`] and [`Transport`] on top of the `serialport`
//! crate.  The port is opened once and cloned so the listener thread and
//! the command writer each own a handle.

use std::io::{self, Read, Write};
use std::time::Duration;

use log::{info, warn};
use serialport::{FlowControl, SerialPort, StopBits};

use crate::app::ports::Connector;
use crate::config::{DataBits, LinkSettings, Parity};
use crate::diagnostics::COMMUNICATIONS;
use crate::error::LinkError;
use crate::link::transport::Transport;

/// How long one read waits before returning empty-handed.  Bounds how
/// quickly the listener notices a disconnect request.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(200);

/// Opens a real serial port.
#[derive(Debug, Clone, Copy)]
pub struct SerialConnector {
    read_timeout: Duration,
}

impl SerialConnector {
    pub fn new() -> Self {
        Self {
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

impl Default for SerialConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl Connector for SerialConnector {
    type Reader = SerialLink;
    type Writer = SerialLink;

    fn open(&mut self, settings: &LinkSettings) -> Result<(SerialLink, SerialLink), LinkError> {
        let mut port = serialport::new(settings.port.as_str(), settings.baud_rate)
            .data_bits(match settings.data_bits {
                DataBits::Seven => serialport::DataBits::Seven,
                DataBits::Eight => serialport::DataBits::Eight,
            })
            .parity(match settings.parity {
                Parity::None => serialport::Parity::None,
                Parity::Odd => serialport::Parity::Odd,
                Parity::Even => serialport::Parity::Even,
            })
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(self.read_timeout)
            .open()
            .map_err(|e| {
                warn!(target: COMMUNICATIONS, "serial open {} failed: {}", settings.port, e);
                LinkError::Unavailable
            })?;

        if settings.assert_dtr {
            // Some adapters power the sensor head from DTR.
            if let Err(e) = port.write_data_terminal_ready(true) {
                warn!(target: COMMUNICATIONS, "DTR not asserted on {}: {}", settings.port, e);
            }
        }

        let writer = port.try_clone().map_err(|e| {
            warn!(target: COMMUNICATIONS, "serial clone {} failed: {}", settings.port, e);
            LinkError::Unavailable
        })?;

        info!(target: COMMUNICATIONS, "serial port {} open", settings.port);
        Ok((SerialLink { port }, SerialLink { port: writer }))
    }
}

/// One handle on an open serial port.
pub struct SerialLink {
    port: Box<dyn SerialPort>,
}

impl Transport for SerialLink {
    type Error = io::Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, io::Error> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::Interrupted) => {
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, io::Error> {
        self.port.write(data)
    }

    fn flush(&mut self) -> Result<(), io::Error> {
        self.port.flush()
    }
}
