use crc::{CRC_8_SMBUS, Crc};

/// Generator polynomial, MSB first, zero initial value, no reflection.
pub const POLYNOMIAL: u8 = 0x07;

/// `CRC8_TABLE[i]` is the checksum of the single byte `i`.
pub static CRC8_TABLE: [u8; 256] = build_table(POLYNOMIAL);

/// Same parameters as [`POLYNOMIAL`], for one-shot use over a whole slice.
const CRC8: Crc<u8> = Crc::<u8>::new(&CRC_8_SMBUS);

const fn build_table(poly: u8) -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let mut rem = i as u8;
        let mut bit = 0;
        while bit < 8 {
            rem = if rem & 0x80 != 0 { (rem << 1) ^ poly } else { rem << 1 };
            bit += 1;
        }
        table[i] = rem;
        i += 1;
    }
    table
}

/// Checksum of a whole byte slice.
pub fn checksum(data: &[u8]) -> u8 {
    CRC8.checksum(data)
}

/// Running CRC-8 accumulator.
///
/// Feeding a frame's content followed by its check byte leaves the
/// accumulator at zero, which is how received frames are validated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Crc8(u8);

impl Crc8 {
    pub const fn new() -> Crc8 {
        Crc8(0)
    }

    pub fn update(&mut self, byte: u8) {
        self.0 = CRC8_TABLE[usize::from(self.0 ^ byte)];
    }

    pub fn update_slice(&mut self, data: &[u8]) {
        for b in data {
            self.update(*b);
        }
    }

    pub const fn value(&self) -> u8 {
        self.0
    }

    /// True once content and its trailing check byte have been accumulated
    /// without corruption.
    pub const fn is_residue_zero(&self) -> bool {
        self.0 == 0
    }
}
