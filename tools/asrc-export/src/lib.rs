//! asrc-export library
//!
//! File-level conversion between Ogg/Vorbis and `.asrc.26` containers, used by
//! the `asrc-export` binary and available to other tools.

pub mod audio;
pub mod cli;
pub mod convert;
pub mod manifest;
pub mod paths;

// Re-export the container types callers need alongside the file helpers
pub use asrc_format::{AsrcError, AsrcHeader, AudioProperties, EncodeRequest};

pub use convert::{decode_file, encode_file, inspect_file, Conversion, EncodeSummary};
pub use paths::{default_output, Direction};
