use log::{debug, trace, warn};

use crate::{
    checksum::Crc8,
    config::{self, Config, ConfigError},
    error::{DecodeError, ReadError},
    ring::RingBuffer,
    stats::{RxStats, bump},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReceiveSession {
    Idle,
    /// A recognised frame is staged; `cursor` bytes of it have been handed out.
    Reading { cursor: usize },
}

/// Receive half of a link.
///
/// Bytes arrive through [`inject`](Self::inject) (or
/// [`ingest_from`](Self::ingest_from)), and frames come out through
/// `begin_read`, `read`/`read_exact`, and `end_read`.
#[derive(Debug, Clone)]
pub struct FrameDecoder<const MAX_FRAME_SIZE: usize, const RING_SIZE: usize> {
    config: Config,
    ring: RingBuffer<RING_SIZE>,
    staging: heapless::Vec<u8, MAX_FRAME_SIZE>,
    session: ReceiveSession,
    stats: RxStats,
}

impl<const MAX_FRAME_SIZE: usize, const RING_SIZE: usize> FrameDecoder<MAX_FRAME_SIZE, RING_SIZE> {
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config::check_geometry(MAX_FRAME_SIZE, RING_SIZE)?;
        Ok(FrameDecoder {
            config,
            ring: RingBuffer::new(),
            staging: heapless::Vec::new(),
            session: ReceiveSession::Idle,
            stats: RxStats::new(),
        })
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    pub const fn stats(&self) -> &RxStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = RxStats::new();
    }

    /// Bytes buffered but not yet scanned into a frame.
    pub const fn unread(&self) -> usize {
        self.ring.len()
    }

    pub const fn free_space(&self) -> usize {
        self.ring.free()
    }

    pub const fn is_reading(&self) -> bool {
        matches!(self.session, ReceiveSession::Reading { .. })
    }

    /// Appends received bytes to the ring. Whatever does not fit is dropped
    /// without any error; overflow shows up later as rejected frames.
    pub fn inject(&mut self, bytes: &[u8]) {
        let accepted = self.ring.inject(bytes);
        if accepted < bytes.len() {
            debug!("rx ring full, dropped {} bytes", bytes.len() - accepted);
        }
    }

    pub(crate) fn push_byte(&mut self, byte: u8) -> bool {
        self.ring.push(byte)
    }

    /// Tries to recognise one complete frame and stage its payload.
    ///
    /// On success returns the payload size and the decoder is reading.
    /// [`DecodeError::NoFrame`] leaves the ring exactly as it was; every
    /// other rejection discards the malformed frame but leaves the byte
    /// that ended it, so a closing delimiter can open the next frame.
    pub fn begin_read(&mut self) -> Result<usize, DecodeError> {
        if self.is_reading() {
            warn!("begin_read while a frame is still being read");
            return Err(DecodeError::NotReady);
        }

        let checkpoint = self.ring.checkpoint();
        self.staging.clear();
        let delimiter = self.config.delimiter();
        let escape = self.config.escape();
        let mut in_frame = false;
        let mut escaped = false;
        let mut crc = Crc8::new();

        while let Some(byte) = self.ring.peek() {
            if byte == delimiter {
                if in_frame {
                    return self.finish_frame(escaped, crc);
                }
                in_frame = true;
            } else if in_frame {
                if self.staging.is_full() {
                    return Err(self.reject(DecodeError::TooBig {
                        limit: MAX_FRAME_SIZE,
                    }));
                }
                if byte == escape {
                    escaped = true;
                } else {
                    let decoded = if escaped {
                        escaped = false;
                        byte ^ self.config.escape_xor()
                    } else {
                        byte
                    };
                    crc.update(decoded);
                    // Cannot fail, fullness was checked above.
                    let _ = self.staging.push(decoded);
                }
            } else {
                bump(&mut self.stats.false_starts, 1);
            }
            self.ring.skip(1);
        }

        self.ring.restore(checkpoint);
        Err(DecodeError::NoFrame)
    }

    /// Ring tail is on the closing delimiter.
    fn finish_frame(&mut self, escaped: bool, crc: Crc8) -> Result<usize, DecodeError> {
        if escaped {
            return Err(self.reject(DecodeError::BadEncoding));
        }
        if self.staging.is_empty() {
            return Err(self.reject(DecodeError::TooSmall));
        }
        if !crc.is_residue_zero() {
            return Err(self.reject(DecodeError::BadCrc8 { residue: crc.value() }));
        }

        // Drop the check byte.
        self.staging.pop();
        let size = self.staging.len();
        self.stats.record_frame(size);
        self.ring.skip(1);
        self.session = ReceiveSession::Reading { cursor: 0 };
        trace!("rx frame of {} bytes", size);
        Ok(size)
    }

    fn reject(&mut self, err: DecodeError) -> DecodeError {
        let counter = match err {
            DecodeError::BadEncoding => &mut self.stats.rejected_encoding_error,
            DecodeError::TooSmall => &mut self.stats.rejected_too_small,
            DecodeError::BadCrc8 { .. } => &mut self.stats.rejected_bad_crc8,
            DecodeError::TooBig { .. } => &mut self.stats.rejected_too_big,
            DecodeError::NotReady | DecodeError::NoFrame => return err,
        };
        bump(counter, 1);
        self.staging.clear();
        debug!("rx frame rejected: {}", err);
        err
    }

    /// Unread remainder of the current frame, without consuming it.
    pub fn pending(&self) -> Option<&[u8]> {
        match self.session {
            ReceiveSession::Reading { cursor } => Some(&self.staging[cursor..]),
            ReceiveSession::Idle => None,
        }
    }

    /// Copies up to `buf.len()` payload bytes and returns how many were
    /// copied. Asking for more than is left is counted as an overreach but
    /// is not an error.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, ReadError> {
        let ReceiveSession::Reading { cursor } = &mut self.session else {
            warn!("read without a frame");
            return Err(ReadError::NotReady);
        };
        let remaining = &self.staging[*cursor..];
        let n = buf.len().min(remaining.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        *cursor += n;
        bump(&mut self.stats.read_byte_count, n);
        if n < buf.len() {
            bump(&mut self.stats.read_overreach, 1);
        }
        Ok(n)
    }

    /// Fills `buf` completely or fails with [`ReadError::NotEnough`].
    /// Bytes copied before the shortfall are still consumed.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), ReadError> {
        let copied = self.read(buf)?;
        if copied != buf.len() {
            return Err(ReadError::NotEnough {
                requested: buf.len(),
                copied,
            });
        }
        Ok(())
    }

    /// Finishes the current frame, discarding anything left unread.
    /// Returns the number of discarded bytes.
    pub fn end_read(&mut self) -> Result<usize, ReadError> {
        let ReceiveSession::Reading { cursor } = self.session else {
            warn!("end_read without a frame");
            return Err(ReadError::NotReady);
        };
        let discarded = self.staging.len() - cursor;
        if discarded > 0 {
            bump(&mut self.stats.read_discard_frame_count, 1);
            bump(&mut self.stats.read_discard_byte_count, discarded);
            bump(&mut self.stats.read_byte_count, discarded);
        }
        self.session = ReceiveSession::Idle;
        Ok(discarded)
    }
}

impl Default for FrameDecoder<{ config::DEFAULT_MAX_FRAME_SIZE }, { config::DEFAULT_RING_SIZE }> {
    fn default() -> Self {
        FrameDecoder {
            config: Config::default(),
            ring: RingBuffer::new(),
            staging: heapless::Vec::new(),
            session: ReceiveSession::Idle,
            stats: RxStats::new(),
        }
    }
}
