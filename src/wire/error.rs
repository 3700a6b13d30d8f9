use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WireError {
    /// Input cannot be one of the fixed records; the record is dropped
    MalformedPayload(Malformed),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Malformed {
    /// Raw record of the wrong size, in bytes
    Length { expected: usize, actual: usize },
    /// Hex record of the wrong size, in characters
    HexLength { expected: usize, actual: usize },
    /// Non-hex character in a hex record
    HexDigit,
}

impl WireError {
    pub(crate) fn length(expected: usize, actual: usize) -> Self {
        Self::MalformedPayload(Malformed::Length { expected, actual })
    }
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedPayload(Malformed::Length { expected, actual }) => {
                write!(f, "malformed payload: expected {expected} bytes, got {actual}")
            }
            Self::MalformedPayload(Malformed::HexLength { expected, actual }) => write!(
                f,
                "malformed payload: expected {expected} hex characters, got {actual}"
            ),
            Self::MalformedPayload(Malformed::HexDigit) => {
                write!(f, "malformed payload: invalid hex character")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for WireError {}
