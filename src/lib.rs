//! Delimited, byte stuffed, CRC-8 checked frames over a raw serial byte
//! stream, with fixed capacity buffers and no allocation.
//!
//! On the wire a frame is
//!
//! ```text
//! D, escaped(content)*, escaped(crc8), D
//! ```
//!
//! where a content byte equal to the delimiter `D` or the escape byte `E` is
//! sent as `E, byte ^ X`. The check byte makes the CRC-8 (polynomial `0x07`)
//! of content plus check byte come out to zero.
//!
//! The receive side is fed with [`FrameCodec::inject`] (or
//! [`FrameDecoder::ingest_from`] straight from a UART) and drained with
//! `begin_read` / `read` / `end_read`. The transmit side is
//! `begin_write` / `write` / `end_write`, each forwarding encoded bytes to an
//! [`embedded_io::Write`] sink right away.
//!
//! ```
//! use core::convert::Infallible;
//! use embed_serial_frames::{Config, FrameCodec};
//!
//! #[derive(Default)]
//! struct Wire(Vec<u8>);
//!
//! impl embedded_io::ErrorType for Wire {
//!     type Error = Infallible;
//! }
//!
//! impl embedded_io::Write for Wire {
//!     fn write(&mut self, buf: &[u8]) -> Result<usize, Infallible> {
//!         self.0.extend_from_slice(buf);
//!         Ok(buf.len())
//!     }
//!
//!     fn flush(&mut self) -> Result<(), Infallible> {
//!         Ok(())
//!     }
//! }
//!
//! let mut link: FrameCodec<Wire> = FrameCodec::new(Config::default(), Wire::default()).unwrap();
//! link.begin_write().unwrap();
//! link.write(b"ping").unwrap();
//! link.end_write().unwrap();
//!
//! let wire = core::mem::take(&mut link.sink_mut().0);
//! link.inject(&wire);
//!
//! let size = link.begin_read().unwrap();
//! let mut payload = [0; 4];
//! link.read_exact(&mut payload[..size]).unwrap();
//! link.end_read().unwrap();
//! assert_eq!(&payload, b"ping");
//! ```
#![cfg_attr(not(test), no_std)]

mod checksum;
mod codec;
mod config;
mod decoder;
mod encoder;
mod error;
mod ring;
mod serial;
mod stats;

pub use checksum::{CRC8_TABLE, Crc8, POLYNOMIAL, checksum};
pub use codec::FrameCodec;
pub use config::{
    Config, ConfigError, DEFAULT_DELIMITER, DEFAULT_ESCAPE, DEFAULT_ESCAPE_XOR,
    DEFAULT_MAX_FRAME_SIZE, DEFAULT_RING_FRAMES, DEFAULT_RING_SIZE,
};
pub use decoder::FrameDecoder;
pub use encoder::FrameEncoder;
pub use error::{DecodeError, ReadError, WriteError};
pub use ring::{Checkpoint, RingBuffer};
pub use serial::{ErrorShim, SerialSink};
pub use stats::{RxStats, Stats, TxStats, UNSET_MIN};
