use embedded_io::Write;
use log::{trace, warn};

use crate::{
    checksum::Crc8,
    config::Config,
    error::WriteError,
    stats::{TxStats, bump},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransmitSession {
    Idle,
    Writing { crc: Crc8, wire_len: u32 },
    /// Check byte is on the wire, closing delimiter still owed.
    Closing { wire_len: u32 },
}

/// Transmit half of a link.
///
/// Encoded bytes go straight to the sink as each call runs; nothing is
/// buffered at frame level.
#[derive(Debug)]
pub struct FrameEncoder<W> {
    config: Config,
    sink: W,
    session: TransmitSession,
    stats: TxStats,
}

impl<W: Write> FrameEncoder<W> {
    pub const fn new(config: Config, sink: W) -> FrameEncoder<W> {
        FrameEncoder {
            config,
            sink,
            session: TransmitSession::Idle,
            stats: TxStats::new(),
        }
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    pub const fn stats(&self) -> &TxStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = TxStats::new();
    }

    pub const fn sink(&self) -> &W {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    pub const fn is_writing(&self) -> bool {
        !matches!(self.session, TransmitSession::Idle)
    }

    /// Emits the opening delimiter.
    pub fn begin_write(&mut self) -> Result<(), WriteError<W::Error>> {
        if self.is_writing() {
            warn!("begin_write while a frame is still open");
            return Err(WriteError::NotReady);
        }
        self.sink
            .write_all(&[self.config.delimiter()])
            .map_err(WriteError::Sink)?;
        self.session = TransmitSession::Writing {
            crc: Crc8::new(),
            wire_len: 1,
        };
        Ok(())
    }

    /// Escapes and emits payload bytes. May be called any number of times
    /// per frame.
    ///
    /// If the sink fails part way the frame stays open. The checksum and
    /// counters cover exactly the payload bytes that made it out, so the
    /// caller can resend the rest.
    pub fn write(&mut self, data: &[u8]) -> Result<(), WriteError<W::Error>> {
        let TransmitSession::Writing { crc, wire_len } = &mut self.session else {
            warn!("write without an open payload");
            return Err(WriteError::NotReady);
        };
        for &b in data {
            emit_escaped(&self.config, &mut self.sink, b, wire_len).map_err(WriteError::Sink)?;
            crc.update(b);
            bump(&mut self.stats.byte_count, 1);
        }
        Ok(())
    }

    /// Emits the check byte, escaped like any payload byte, then the
    /// closing delimiter.
    ///
    /// After a sink failure, calling this again picks up where it stopped;
    /// the check byte is never sent twice.
    pub fn end_write(&mut self) -> Result<(), WriteError<W::Error>> {
        if let TransmitSession::Writing { crc, wire_len } = &mut self.session {
            emit_escaped(&self.config, &mut self.sink, crc.value(), wire_len)
                .map_err(WriteError::Sink)?;
            bump(&mut self.stats.byte_count, 1);
            let closing = TransmitSession::Closing { wire_len: *wire_len };
            self.session = closing;
        }
        let TransmitSession::Closing { wire_len } = &mut self.session else {
            warn!("end_write without an open frame");
            return Err(WriteError::NotReady);
        };
        emit(&mut self.sink, self.config.delimiter(), wire_len).map_err(WriteError::Sink)?;

        let wire_len = *wire_len;
        bump(&mut self.stats.byte_count, 1);
        self.stats.record_frame(wire_len);
        self.session = TransmitSession::Idle;
        trace!("tx frame of {} wire bytes", wire_len);
        Ok(())
    }
}

/// Writes `b`, or its escape pair when it collides with the delimiter or the
/// escape byte. `wire_len` counts every byte that reaches the sink, even the
/// first half of a pair that failed midway.
fn emit_escaped<W: Write>(
    config: &Config,
    sink: &mut W,
    b: u8,
    wire_len: &mut u32,
) -> Result<(), W::Error> {
    if config.needs_escape(b) {
        emit(sink, config.escape(), wire_len)?;
        emit(sink, b ^ config.escape_xor(), wire_len)
    } else {
        emit(sink, b, wire_len)
    }
}

fn emit<W: Write>(sink: &mut W, b: u8, wire_len: &mut u32) -> Result<(), W::Error> {
    sink.write_all(&[b])?;
    *wire_len = wire_len.wrapping_add(1);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::checksum;
    use crate::decoder::FrameDecoder;
    use crate::config::{DEFAULT_DELIMITER as D, DEFAULT_ESCAPE as E, DEFAULT_ESCAPE_XOR as X};
    use core::convert::Infallible;

    #[derive(Debug, Default)]
    struct Wire(Vec<u8>);

    impl embedded_io::ErrorType for Wire {
        type Error = Infallible;
    }

    impl Write for Wire {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    /// Keeps the first `budget` bytes, then fails until topped up.
    #[derive(Debug)]
    struct Brittle {
        sent: Vec<u8>,
        budget: usize,
    }

    impl Brittle {
        fn with_budget(budget: usize) -> Brittle {
            Brittle {
                sent: Vec::new(),
                budget,
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Unplugged;

    impl embedded_io::Error for Unplugged {
        fn kind(&self) -> embedded_io::ErrorKind {
            embedded_io::ErrorKind::NotConnected
        }
    }

    impl embedded_io::ErrorType for Brittle {
        type Error = Unplugged;
    }

    impl Write for Brittle {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            if self.budget == 0 {
                return Err(Unplugged);
            }
            let n = buf.len().min(self.budget);
            self.sent.extend_from_slice(&buf[..n]);
            self.budget -= n;
            Ok(n)
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    fn encoder() -> FrameEncoder<Wire> {
        FrameEncoder::new(Config::default(), Wire::default())
    }

    #[test]
    fn plain_payload() {
        let mut enc = encoder();
        enc.begin_write().unwrap();
        enc.write(b"ab").unwrap();
        enc.end_write().unwrap();
        let check = checksum(b"ab");
        assert_eq!(enc.sink().0, [D, b'a', b'b', check, D]);
        let s = enc.stats();
        assert_eq!(s.frame_count, 1);
        assert_eq!(s.frame_min_size, 5);
        assert_eq!(s.frame_max_size, 5);
        // payload, check byte, closing delimiter
        assert_eq!(s.byte_count, 4);
    }

    #[test]
    fn reserved_bytes_are_escaped() {
        let mut enc = encoder();
        enc.begin_write().unwrap();
        enc.write(&[D]).unwrap();
        enc.write(&[E, 0x01]).unwrap();
        enc.end_write().unwrap();
        let check = checksum(&[D, E, 0x01]);
        let mut expected = Vec::from([D, E, D ^ X, E, E ^ X, 0x01]);
        if check == D || check == E {
            expected.extend([E, check ^ X]);
        } else {
            expected.push(check);
        }
        expected.push(D);
        assert_eq!(enc.sink().0, expected);
        assert_eq!(enc.stats().frame_max_size as usize, expected.len());
    }

    #[test]
    fn check_byte_equal_to_delimiter_is_escaped() {
        // [7, 7] checksums to 0x7E, the default delimiter.
        assert_eq!(checksum(&[7, 7]), D);
        let mut enc = encoder();
        enc.begin_write().unwrap();
        enc.write(&[7, 7]).unwrap();
        enc.end_write().unwrap();
        assert_eq!(enc.sink().0, [D, 7, 7, E, D ^ X, D]);
        assert_eq!(enc.stats().frame_min_size, 6);
    }

    #[test]
    fn empty_payload_still_carries_a_check_byte() {
        let mut enc = encoder();
        enc.begin_write().unwrap();
        enc.end_write().unwrap();
        assert_eq!(enc.sink().0, [D, 0x00, D]);
    }

    #[test]
    fn min_and_max_track_wire_sizes() {
        let mut enc = encoder();
        for payload in [&b"abcdef"[..], b"a", b"abc"] {
            enc.begin_write().unwrap();
            enc.write(payload).unwrap();
            enc.end_write().unwrap();
        }
        let s = enc.stats();
        assert_eq!(s.frame_count, 3);
        assert_eq!(s.frame_min_size, 4);
        assert_eq!(s.frame_max_size, 9);
        assert_eq!(s.byte_count, 6 + 1 + 3 + 3 * 2);
    }

    #[test]
    fn session_misuse_is_not_ready() {
        let mut enc = encoder();
        assert_eq!(enc.write(b"x"), Err(WriteError::NotReady));
        assert_eq!(enc.end_write(), Err(WriteError::NotReady));
        enc.begin_write().unwrap();
        assert_eq!(enc.begin_write(), Err(WriteError::NotReady));
        enc.end_write().unwrap();
        assert!(!enc.is_writing());
        assert_eq!(enc.stats().frame_count, 1);
    }

    #[test]
    fn sink_failure_propagates_and_keeps_frame_open() {
        let mut enc = FrameEncoder::new(Config::default(), Brittle::with_budget(2));
        enc.begin_write().unwrap();
        assert_eq!(enc.write(b"abc"), Err(WriteError::Sink(Unplugged)));
        assert!(enc.is_writing());
        // Only the `a` made it out.
        assert_eq!(enc.stats().byte_count, 1);
    }

    #[test]
    fn resending_the_unsent_tail_completes_the_frame() {
        let mut enc = FrameEncoder::new(Config::default(), Brittle::with_budget(3));
        enc.begin_write().unwrap();
        assert_eq!(enc.write(b"abc"), Err(WriteError::Sink(Unplugged)));
        enc.sink_mut().budget = usize::MAX;
        enc.write(b"c").unwrap();
        enc.end_write().unwrap();

        let check = checksum(b"abc");
        assert_eq!(enc.sink().sent, [D, b'a', b'b', b'c', check, D]);
        let s = enc.stats();
        assert_eq!((s.frame_min_size, s.frame_max_size), (6, 6));
        assert_eq!(s.byte_count, 5);

        let mut dec = FrameDecoder::<8, 16>::new(Config::default()).unwrap();
        dec.inject(&enc.sink().sent);
        assert_eq!(dec.begin_read(), Ok(3));
        assert_eq!(dec.pending(), Some(&b"abc"[..]));
    }

    #[test]
    fn half_sent_escape_pair_is_resent_whole() {
        // Room for the opening delimiter and the escape byte only.
        let mut enc = FrameEncoder::new(Config::default(), Brittle::with_budget(2));
        enc.begin_write().unwrap();
        assert_eq!(enc.write(&[D]), Err(WriteError::Sink(Unplugged)));
        assert_eq!(enc.stats().byte_count, 0);
        enc.sink_mut().budget = usize::MAX;
        enc.write(&[D]).unwrap();
        enc.end_write().unwrap();

        let wire = enc.sink().sent.clone();
        assert_eq!(wire[..4], [D, E, E, D ^ X]);
        assert_eq!(enc.stats().frame_max_size as usize, wire.len());

        let mut dec = FrameDecoder::<8, 16>::new(Config::default()).unwrap();
        dec.inject(&wire);
        assert_eq!(dec.begin_read(), Ok(1));
        assert_eq!(dec.pending(), Some(&[D][..]));
    }

    #[test]
    fn failed_close_does_not_repeat_the_check_byte() {
        // Everything but the closing delimiter fits.
        let mut enc = FrameEncoder::new(Config::default(), Brittle::with_budget(4));
        enc.begin_write().unwrap();
        enc.write(b"ab").unwrap();
        assert_eq!(enc.end_write(), Err(WriteError::Sink(Unplugged)));
        assert!(enc.is_writing());
        assert_eq!(enc.write(b"c"), Err(WriteError::NotReady));
        assert_eq!(enc.begin_write(), Err(WriteError::NotReady));
        assert_eq!(enc.stats().frame_count, 0);

        enc.sink_mut().budget = usize::MAX;
        enc.end_write().unwrap();
        assert!(!enc.is_writing());
        assert_eq!(enc.sink().sent, [D, b'a', b'b', checksum(b"ab"), D]);
        let s = enc.stats();
        assert_eq!(s.frame_count, 1);
        assert_eq!(s.frame_max_size, 5);
        assert_eq!(s.byte_count, 4);
    }
}
