use thiserror::Error;

/// Largest decoded frame (payload plus check byte) in the default geometry.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 128;
/// How many maximum sized frames the default receive ring holds.
pub const DEFAULT_RING_FRAMES: usize = 10;
pub const DEFAULT_RING_SIZE: usize = DEFAULT_MAX_FRAME_SIZE * DEFAULT_RING_FRAMES;

pub const DEFAULT_DELIMITER: u8 = 0x7E;
pub const DEFAULT_ESCAPE: u8 = 0x7D;
pub const DEFAULT_ESCAPE_XOR: u8 = 0x20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("escape xor constant must be non-zero")]
    ZeroEscapeXor,
    #[error("escape byte 0x{escape:02X} xor 0x{escape_xor:02X} produces the delimiter")]
    EscapedEscapeIsDelimiter { escape: u8, escape_xor: u8 },
    #[error("delimiter and escape byte are both 0x{0:02X}")]
    DelimiterIsEscape(u8),
    #[error("maximum frame size must be non-zero")]
    ZeroFrameSize,
    #[error("ring size {ring} is not a non-zero multiple of the frame size {frame}")]
    RingNotFrameMultiple { ring: usize, frame: usize },
}

/// Wire constants shared by both directions of a link.
///
/// Only constructible through [`Config::new`], so a `Config` in hand always
/// describes an unambiguous escape scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawConfig"))]
pub struct Config {
    delimiter: u8,
    escape: u8,
    escape_xor: u8,
}

impl Config {
    pub const fn new(delimiter: u8, escape: u8, escape_xor: u8) -> Result<Config, ConfigError> {
        if escape_xor == 0 {
            return Err(ConfigError::ZeroEscapeXor);
        }
        if delimiter == escape {
            return Err(ConfigError::DelimiterIsEscape(delimiter));
        }
        if escape ^ escape_xor == delimiter {
            return Err(ConfigError::EscapedEscapeIsDelimiter { escape, escape_xor });
        }
        Ok(Config {
            delimiter,
            escape,
            escape_xor,
        })
    }

    pub const fn delimiter(&self) -> u8 {
        self.delimiter
    }

    pub const fn escape(&self) -> u8 {
        self.escape
    }

    pub const fn escape_xor(&self) -> u8 {
        self.escape_xor
    }

    /// Whether `byte` has to go out as an escape pair.
    pub const fn needs_escape(&self, byte: u8) -> bool {
        byte == self.delimiter || byte == self.escape
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            delimiter: DEFAULT_DELIMITER,
            escape: DEFAULT_ESCAPE,
            escape_xor: DEFAULT_ESCAPE_XOR,
        }
    }
}

/// Checks the const generic buffer geometry of a decoder.
pub(crate) const fn check_geometry(frame: usize, ring: usize) -> Result<(), ConfigError> {
    if frame == 0 {
        return Err(ConfigError::ZeroFrameSize);
    }
    if ring == 0 || ring % frame != 0 {
        return Err(ConfigError::RingNotFrameMultiple { ring, frame });
    }
    Ok(())
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawConfig {
    delimiter: u8,
    escape: u8,
    escape_xor: u8,
}

#[cfg(feature = "serde")]
impl TryFrom<RawConfig> for Config {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        Config::new(raw.delimiter, raw.escape, raw.escape_xor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn default_is_valid() {
        let d = Config::default();
        assert_eq!(
            Config::new(d.delimiter(), d.escape(), d.escape_xor()),
            Ok(d)
        );
    }

    #[rstest]
    #[case(0x7E, 0x7D, 0x00, ConfigError::ZeroEscapeXor)]
    #[case(0x7E, 0x7E, 0x20, ConfigError::DelimiterIsEscape(0x7E))]
    #[case(0x7E, 0x7D, 0x03, ConfigError::EscapedEscapeIsDelimiter { escape: 0x7D, escape_xor: 0x03 })]
    fn rejects_ambiguous_wire_constants(
        #[case] delimiter: u8,
        #[case] escape: u8,
        #[case] xor: u8,
        #[case] expected: ConfigError,
    ) {
        assert_eq!(Config::new(delimiter, escape, xor), Err(expected));
    }

    #[test]
    fn slip_constants_are_accepted() {
        let c = Config::new(0xC0, 0xDB, 0x20).unwrap();
        assert!(c.needs_escape(0xC0));
        assert!(c.needs_escape(0xDB));
        assert!(!c.needs_escape(0xDC));
    }

    #[rstest]
    #[case(0, 10, Err(ConfigError::ZeroFrameSize))]
    #[case(8, 0, Err(ConfigError::RingNotFrameMultiple { ring: 0, frame: 8 }))]
    #[case(8, 12, Err(ConfigError::RingNotFrameMultiple { ring: 12, frame: 8 }))]
    #[case(8, 8, Ok(()))]
    #[case(DEFAULT_MAX_FRAME_SIZE, DEFAULT_RING_SIZE, Ok(()))]
    fn geometry(#[case] frame: usize, #[case] ring: usize, #[case] expected: Result<(), ConfigError>) {
        assert_eq!(check_geometry(frame, ring), expected);
    }
}
