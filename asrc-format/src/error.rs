//! Error type for container encoding/decoding

/// Errors produced while reading or writing `.asrc` containers
#[derive(Debug, thiserror::Error)]
pub enum AsrcError {
    /// `srch` container: valid, but carries no audio payload
    #[error("srch files do not contain audio")]
    NoAudio,

    /// Magic is neither `srcd` nor `srch`
    #[error("not a valid asrc file (magic {magic:02x?})")]
    InvalidFormat { magic: Vec<u8> },

    /// Payload does not fit the 32-bit payload_size field
    #[error("payload of {size} bytes does not fit in an asrc container")]
    PayloadTooLarge { size: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AsrcError>;
