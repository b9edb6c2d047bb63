use thiserror::Error;

/// Why [`begin_read`](crate::FrameDecoder::begin_read) did not produce a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("a frame is already being read")]
    NotReady,
    /// Not enough input yet. Nothing was consumed.
    #[error("no complete frame buffered")]
    NoFrame,
    #[error("frame ended in the middle of an escape sequence")]
    BadEncoding,
    #[error("frame too small to hold a check byte")]
    TooSmall,
    #[error("frame failed its checksum (residue 0x{residue:02X})")]
    BadCrc8 { residue: u8 },
    #[error("frame exceeds {limit} decoded bytes")]
    TooBig { limit: usize },
}

impl DecodeError {
    /// A malformed frame was discarded and more frames may already be
    /// buffered, so `begin_read` is worth calling again right away.
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            DecodeError::BadEncoding
                | DecodeError::TooSmall
                | DecodeError::BadCrc8 { .. }
                | DecodeError::TooBig { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReadError {
    #[error("no frame is being read")]
    NotReady,
    #[error("requested {requested} bytes but only {copied} were left in the frame")]
    NotEnough { requested: usize, copied: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WriteError<E> {
    #[error("frame write session in the wrong state")]
    NotReady,
    #[error("sink write failed: {0:?}")]
    Sink(E),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(DecodeError::NotReady, false)]
    #[case(DecodeError::NoFrame, false)]
    #[case(DecodeError::BadEncoding, true)]
    #[case(DecodeError::TooSmall, true)]
    #[case(DecodeError::BadCrc8 { residue: 1 }, true)]
    #[case(DecodeError::TooBig { limit: 128 }, true)]
    fn rejections(#[case] err: DecodeError, #[case] expected: bool) {
        assert_eq!(err.is_rejection(), expected);
    }
}
