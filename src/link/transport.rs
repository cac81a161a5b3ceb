//! Transport abstraction: any byte-oriented channel to the sensor.
//!
//! Concrete implementations:
//! - Serial port via the `serialport` crate (`adapters::serial`)
//! - In-memory mocks in the integration tests
//!
//! The listener and session are generic over `Transport`, so adding a new
//! link type requires zero changes to the telegram pipeline.

/// Byte-oriented transport channel.
pub trait Transport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Read up to `buf.len()` bytes into `buf`.
    /// Returns the number of bytes actually read.
    /// Returns 0 if no data arrived within the transport's read timeout.
    /// An `Err` means the link is gone.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write `data` to the transport.
    /// Returns the number of bytes actually written.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Write all of `data`, failing if the transport stops accepting bytes.
pub fn write_all<T: Transport + ?Sized>(
    transport: &mut T,
    mut data: &[u8],
) -> Result<(), WriteError<T::Error>> {
    while !data.is_empty() {
        match transport.write(data) {
            Ok(0) => return Err(WriteError::Stalled),
            Ok(n) => data = &data[n.min(data.len())..],
            Err(e) => return Err(WriteError::Transport(e)),
        }
    }
    transport.flush().map_err(WriteError::Transport)
}

/// Failure from [`write_all`].
#[derive(Debug)]
pub enum WriteError<E> {
    /// The transport accepted zero bytes.
    Stalled,
    Transport(E),
}

/// A null transport that discards all writes and never reads.
/// Useful as a placeholder link when no sensor is attached.
pub struct NullTransport;

impl Transport for NullTransport {
    type Error = ();

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, ()> {
        Ok(0)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, ()> {
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }
}
