use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GnssError {
    /// RMC status is void
    NoFix,
    MissingField(&'static str), // Specify which field is missing
    UnsupportedSentence,        // Only RMC carries what the tracker reports
    ParseError,
}

impl fmt::Display for GnssError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFix => write!(f, "no fix"),
            Self::MissingField(field) => write!(f, "missing {field}"),
            Self::UnsupportedSentence => write!(f, "unsupported sentence"),
            Self::ParseError => write!(f, "malformed sentence"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GnssError {}
