use embedded_hal_nb::serial::{Error, Read, Write};

use crate::decoder::FrameDecoder;

/// Carries a UART error through the `embedded-io` error trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorShim<T: Error>(pub T);

impl<T: Error> embedded_io::Error for ErrorShim<T> {
    fn kind(&self) -> embedded_io::ErrorKind {
        use embedded_hal_nb::serial::ErrorKind::*;
        match self.0.kind() {
            Overrun => embedded_io::ErrorKind::OutOfMemory,
            FrameFormat | Parity => embedded_io::ErrorKind::InvalidData,
            _ => embedded_io::ErrorKind::Other,
        }
    }
}

impl<T: Error> From<T> for ErrorShim<T> {
    fn from(value: T) -> Self {
        ErrorShim(value)
    }
}

/// Frame sink over a non-blocking UART transmitter.
///
/// Spins on `WouldBlock`, so each encoder call returns only once its bytes
/// are in the UART.
#[derive(Debug)]
pub struct SerialSink<Tx: Write> {
    tx: Tx,
}

impl<Tx: Write> SerialSink<Tx> {
    pub fn new(tx: Tx) -> SerialSink<Tx> {
        SerialSink { tx }
    }

    pub fn into_inner(self) -> Tx {
        self.tx
    }
}

impl<Tx: Write> embedded_io::ErrorType for SerialSink<Tx> {
    type Error = ErrorShim<Tx::Error>;
}

impl<Tx: Write> embedded_io::Write for SerialSink<Tx> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        for b in buf {
            nb::block!(self.tx.write(*b))?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        nb::block!(self.tx.flush())?;
        Ok(())
    }
}

impl<const MAX_FRAME_SIZE: usize, const RING_SIZE: usize> FrameDecoder<MAX_FRAME_SIZE, RING_SIZE> {
    /// Moves bytes from a UART receiver into the ring until the UART would
    /// block or the ring is full, and returns how many were moved.
    ///
    /// A full ring leaves the remaining bytes in the UART rather than
    /// dropping them.
    pub fn ingest_from<Rx: Read>(&mut self, rx: &mut Rx) -> Result<usize, Rx::Error> {
        let mut count = 0;
        while self.free_space() > 0 {
            match rx.read() {
                Ok(b) => {
                    self.push_byte(b);
                    count += 1;
                }
                Err(nb::Error::WouldBlock) => break,
                Err(nb::Error::Other(e)) => return Err(e),
            }
        }
        Ok(count)
    }
}
