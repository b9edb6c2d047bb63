/// Fixed capacity circular byte store for not yet decoded input.
///
/// Unread bytes occupy `[tail, tail + unread) mod N`. All wraparound
/// arithmetic goes through `advance`.
#[derive(Debug, Clone)]
pub struct RingBuffer<const N: usize> {
    buf: [u8; N],
    tail: usize,
    unread: usize,
}

/// Saved read position, used to undo a scan that found no complete frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    tail: usize,
    unread: usize,
}

impl<const N: usize> RingBuffer<N> {
    pub const fn new() -> RingBuffer<N> {
        RingBuffer {
            buf: [0; N],
            tail: 0,
            unread: 0,
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of bytes waiting to be scanned.
    pub const fn len(&self) -> usize {
        self.unread
    }

    pub const fn is_empty(&self) -> bool {
        self.unread == 0
    }

    pub const fn is_full(&self) -> bool {
        self.unread == N
    }

    pub const fn free(&self) -> usize {
        N - self.unread
    }

    /// `index + by` wrapped into `[0, N)`. Both arguments are at most `N`.
    const fn advance(index: usize, by: usize) -> usize {
        let next = index + by;
        if next >= N { next - N } else { next }
    }

    const fn head(&self) -> usize {
        Self::advance(self.tail, self.unread)
    }

    /// Appends one byte, returning false when the ring is full.
    pub fn push(&mut self, byte: u8) -> bool {
        if self.is_full() {
            return false;
        }
        let head = self.head();
        self.buf[head] = byte;
        self.unread += 1;
        true
    }

    /// Appends as many bytes as fit and returns how many were accepted.
    /// The rest are dropped.
    pub fn inject(&mut self, bytes: &[u8]) -> usize {
        let accepted = bytes.len().min(self.free());
        for b in &bytes[..accepted] {
            let head = self.head();
            self.buf[head] = *b;
            self.unread += 1;
        }
        accepted
    }

    /// Oldest unread byte.
    pub fn peek(&self) -> Option<u8> {
        if self.is_empty() {
            None
        } else {
            Some(self.buf[self.tail])
        }
    }

    pub fn pop(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.skip(1);
        Some(b)
    }

    /// Marks up to `count` bytes as consumed.
    pub fn skip(&mut self, count: usize) {
        let count = count.min(self.unread);
        self.tail = Self::advance(self.tail, count);
        self.unread -= count;
    }

    pub const fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            tail: self.tail,
            unread: self.unread,
        }
    }

    /// Rewinds to `checkpoint`.
    ///
    /// Only meaningful when nothing was injected since the checkpoint was
    /// taken; the decoder never injects mid-scan.
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.tail = checkpoint.tail;
        self.unread = checkpoint.unread;
    }

    pub fn clear(&mut self) {
        self.tail = 0;
        self.unread = 0;
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
