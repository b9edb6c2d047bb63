use embedded_io::Write;

use crate::{
    config::{Config, ConfigError, DEFAULT_MAX_FRAME_SIZE, DEFAULT_RING_SIZE},
    decoder::FrameDecoder,
    encoder::FrameEncoder,
    error::{DecodeError, ReadError, WriteError},
    stats::Stats,
};

/// Both directions of one link: a receive ring with its decoder, and an
/// encoder writing into `W`.
///
/// Instantiate one per link. Not meant to be shared between threads without
/// external serialisation.
#[derive(Debug)]
pub struct FrameCodec<
    W,
    const MAX_FRAME_SIZE: usize = { DEFAULT_MAX_FRAME_SIZE },
    const RING_SIZE: usize = { DEFAULT_RING_SIZE },
> {
    rx: FrameDecoder<MAX_FRAME_SIZE, RING_SIZE>,
    tx: FrameEncoder<W>,
}

impl<W: Write, const MAX_FRAME_SIZE: usize, const RING_SIZE: usize>
    FrameCodec<W, MAX_FRAME_SIZE, RING_SIZE>
{
    pub fn new(config: Config, sink: W) -> Result<Self, ConfigError> {
        Ok(FrameCodec {
            rx: FrameDecoder::new(config)?,
            tx: FrameEncoder::new(config, sink),
        })
    }

    pub fn from_parts(rx: FrameDecoder<MAX_FRAME_SIZE, RING_SIZE>, tx: FrameEncoder<W>) -> Self {
        FrameCodec { rx, tx }
    }

    pub fn split(self) -> (FrameDecoder<MAX_FRAME_SIZE, RING_SIZE>, FrameEncoder<W>) {
        (self.rx, self.tx)
    }

    pub const fn decoder(&self) -> &FrameDecoder<MAX_FRAME_SIZE, RING_SIZE> {
        &self.rx
    }

    pub fn decoder_mut(&mut self) -> &mut FrameDecoder<MAX_FRAME_SIZE, RING_SIZE> {
        &mut self.rx
    }

    pub const fn encoder(&self) -> &FrameEncoder<W> {
        &self.tx
    }

    pub fn encoder_mut(&mut self) -> &mut FrameEncoder<W> {
        &mut self.tx
    }

    pub const fn sink(&self) -> &W {
        self.tx.sink()
    }

    pub fn sink_mut(&mut self) -> &mut W {
        self.tx.sink_mut()
    }

    /// Snapshot of every counter on this link.
    pub const fn stats(&self) -> Stats {
        Stats::new(self.rx.stats(), self.tx.stats())
    }

    /// Puts every counter back to its initial value. The codec never does
    /// this on its own.
    pub fn reset_stats(&mut self) {
        self.rx.reset_stats();
        self.tx.reset_stats();
    }

    pub fn inject(&mut self, bytes: &[u8]) {
        self.rx.inject(bytes)
    }

    pub fn begin_read(&mut self) -> Result<usize, DecodeError> {
        self.rx.begin_read()
    }

    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, ReadError> {
        self.rx.read(buf)
    }

    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), ReadError> {
        self.rx.read_exact(buf)
    }

    pub fn end_read(&mut self) -> Result<usize, ReadError> {
        self.rx.end_read()
    }

    pub fn begin_write(&mut self) -> Result<(), WriteError<W::Error>> {
        self.tx.begin_write()
    }

    pub fn write(&mut self, data: &[u8]) -> Result<(), WriteError<W::Error>> {
        self.tx.write(data)
    }

    pub fn end_write(&mut self) -> Result<(), WriteError<W::Error>> {
        self.tx.end_write()
    }
}
