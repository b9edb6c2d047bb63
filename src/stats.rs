use core::fmt;

/// Starting value of the minimum size counters. Any real frame lowers it.
pub const UNSET_MIN: u32 = u32::MAX;

/// Receive side counters, owned by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RxStats {
    /// Bytes seen outside any frame.
    pub false_starts: u32,
    pub rejected_encoding_error: u32,
    pub rejected_too_big: u32,
    pub rejected_too_small: u32,
    pub rejected_bad_crc8: u32,
    /// Valid frames recognised.
    pub frame_count: u32,
    pub min_frame_size: u32,
    pub max_frame_size: u32,
    /// Reads that asked for more than the frame had left.
    pub read_overreach: u32,
    /// Frames ended with unread payload.
    pub read_discard_frame_count: u32,
    pub read_discard_byte_count: u32,
    /// Payload bytes handled, read or discarded.
    pub read_byte_count: u32,
}

/// Transmit side counters, owned by the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxStats {
    /// On-wire sizes, delimiters and escapes included.
    pub frame_min_size: u32,
    pub frame_max_size: u32,
    pub frame_count: u32,
    /// Unescaped bytes written, check byte and closing delimiter included.
    pub byte_count: u32,
}

impl RxStats {
    pub const fn new() -> RxStats {
        RxStats {
            false_starts: 0,
            rejected_encoding_error: 0,
            rejected_too_big: 0,
            rejected_too_small: 0,
            rejected_bad_crc8: 0,
            frame_count: 0,
            min_frame_size: UNSET_MIN,
            max_frame_size: 0,
            read_overreach: 0,
            read_discard_frame_count: 0,
            read_discard_byte_count: 0,
            read_byte_count: 0,
        }
    }

    pub(crate) fn record_frame(&mut self, size: usize) {
        bump(&mut self.frame_count, 1);
        record_size(&mut self.min_frame_size, &mut self.max_frame_size, size);
    }
}

impl Default for RxStats {
    fn default() -> Self {
        Self::new()
    }
}

impl TxStats {
    pub const fn new() -> TxStats {
        TxStats {
            frame_min_size: UNSET_MIN,
            frame_max_size: 0,
            frame_count: 0,
            byte_count: 0,
        }
    }

    pub(crate) fn record_frame(&mut self, wire_len: u32) {
        bump(&mut self.frame_count, 1);
        self.frame_min_size = self.frame_min_size.min(wire_len);
        self.frame_max_size = self.frame_max_size.max(wire_len);
    }
}

impl Default for TxStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrapping add of a byte count onto a 32-bit counter.
pub(crate) fn bump(counter: &mut u32, amount: usize) {
    *counter = counter.wrapping_add(to_u32(amount));
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn record_size(min: &mut u32, max: &mut u32, size: usize) {
    let size = to_u32(size);
    *min = (*min).min(size);
    *max = (*max).max(size);
}

/// Flat snapshot of every counter on a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stats {
    pub rx_false_starts: u32,
    pub rx_rejected_encoding_error: u32,
    pub rx_rejected_too_big: u32,
    pub rx_rejected_too_small: u32,
    pub rx_rejected_bad_crc8: u32,
    pub rx_frame_count: u32,
    pub min_rx_frame_size: u32,
    pub max_rx_frame_size: u32,
    pub read_overreach: u32,
    pub read_discard_frame_count: u32,
    pub read_discard_byte_count: u32,
    pub read_byte_count: u32,
    pub write_frame_min_size: u32,
    pub write_frame_max_size: u32,
    pub write_frame_count: u32,
    pub write_byte_count: u32,
}

impl Stats {
    pub const fn new(rx: &RxStats, tx: &TxStats) -> Stats {
        Stats {
            rx_false_starts: rx.false_starts,
            rx_rejected_encoding_error: rx.rejected_encoding_error,
            rx_rejected_too_big: rx.rejected_too_big,
            rx_rejected_too_small: rx.rejected_too_small,
            rx_rejected_bad_crc8: rx.rejected_bad_crc8,
            rx_frame_count: rx.frame_count,
            min_rx_frame_size: rx.min_frame_size,
            max_rx_frame_size: rx.max_frame_size,
            read_overreach: rx.read_overreach,
            read_discard_frame_count: rx.read_discard_frame_count,
            read_discard_byte_count: rx.read_discard_byte_count,
            read_byte_count: rx.read_byte_count,
            write_frame_min_size: tx.frame_min_size,
            write_frame_max_size: tx.frame_max_size,
            write_frame_count: tx.frame_count,
            write_byte_count: tx.byte_count,
        }
    }

    /// Sum of every frame rejection counter.
    pub const fn rx_rejected(&self) -> u32 {
        self.rx_rejected_encoding_error
            .wrapping_add(self.rx_rejected_too_big)
            .wrapping_add(self.rx_rejected_too_small)
            .wrapping_add(self.rx_rejected_bad_crc8)
    }
}

impl Default for Stats {
    fn default() -> Self {
        Stats::new(&RxStats::new(), &TxStats::new())
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: [(&str, u32); 16] = [
            ("rx_false_starts", self.rx_false_starts),
            ("rx_rejected_encoding_error", self.rx_rejected_encoding_error),
            ("rx_rejected_too_big", self.rx_rejected_too_big),
            ("rx_rejected_too_small", self.rx_rejected_too_small),
            ("rx_rejected_bad_crc8", self.rx_rejected_bad_crc8),
            ("rx_frame_count", self.rx_frame_count),
            ("min_rx_frame_size", self.min_rx_frame_size),
            ("max_rx_frame_size", self.max_rx_frame_size),
            ("read_overreach", self.read_overreach),
            ("read_discard_frame_count", self.read_discard_frame_count),
            ("read_discard_byte_count", self.read_discard_byte_count),
            ("read_byte_count", self.read_byte_count),
            ("write_frame_min_size", self.write_frame_min_size),
            ("write_frame_max_size", self.write_frame_max_size),
            ("write_frame_count", self.write_frame_count),
            ("write_byte_count", self.write_byte_count),
        ];
        for (name, value) in rows {
            writeln!(f, "{name} = {value}")?;
        }
        Ok(())
    }
}
