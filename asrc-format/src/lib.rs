//! asrc-format: RE Engine `.asrc` audio containers
//!
//! Codec for the `srcd` audio resource container, version 26 (the variant used
//! by Ghost Trick's Nintendo Switch port). An `.asrc.26` file is a fixed
//! 78-byte header followed by an unmodified Ogg/Vorbis stream.
//!
//! **This crate never touches audio samples.** Decoding the Ogg stream to learn
//! its channel count, sample rate and frame count is the caller's job; the
//! codec only packs those numbers into the header and streams the payload
//! bytes through.
//!
//! # Layout
//!
//! All integers are little-endian.
//!
//! ```text
//! 0x00: magic "srcd"
//! 0x04: reserved u32 (0)
//! 0x08: payload_size u32
//! 0x0C: codec tag "ogg "
//! 0x10: bgm flag u32 (0/1)
//! 0x14: audio source id u32
//! 0x18: channel_count u32
//! 0x1C: total_sample_count u32 (channels * frames)
//! 0x20: sample_rate u32
//! 0x24: bit_depth u32 (sample_width_bytes * 4)
//! 0x28: format marker u32 (1)
//! 0x2C: has_loop u8
//! 0x2D: loop_start u32
//! 0x31: loop_end u32 (frames - 1)
//! 0x35: padding (17 bytes)
//! 0x46: header_size u32 (78)
//! 0x4A: smpl chunk size u32 (44)
//! 0x4E: Ogg payload
//! ```
//!
//! # Decoding is strict on magic only
//!
//! `srch` files are the audio-free variant and are rejected with
//! [`AsrcError::NoAudio`]; anything else that is not `srcd` is
//! [`AsrcError::InvalidFormat`]. No other field is checked, and the payload is
//! always read from [`HEADER_SIZE`], never from the stored `header_size` field.
//!
//! # Usage
//!
//! ```
//! use asrc_format::{decode_container, encode_container, AudioProperties, EncodeRequest};
//! use std::io::Cursor;
//!
//! let ogg = b"OggS fake payload".to_vec();
//! let props = AudioProperties::new(2, 48_000, 44_100, 4);
//! let req = EncodeRequest::new(7).bgm().with_loop_start(1000);
//!
//! let mut container = Vec::new();
//! encode_container(&mut Cursor::new(&ogg), &mut container, &props, &req).unwrap();
//!
//! let mut payload = Vec::new();
//! decode_container(&mut Cursor::new(&container), &mut payload).unwrap();
//! assert_eq!(payload, ogg);
//! ```

mod container;
mod error;
mod header;

pub use container::{decode_container, encode_container, ContainerReader, ContainerWriter};
pub use error::{AsrcError, Result};
pub use header::{
    encode_header, parse_header, AsrcHeader, AudioProperties, EncodeRequest, ValidatedHeader,
};

// =============================================================================
// Constants
// =============================================================================

/// Header size in bytes, and the fixed offset of the payload
pub const HEADER_SIZE: usize = 78;

/// Magic for containers carrying an audio payload
pub const MAGIC_AUDIO: &[u8; 4] = b"srcd";

/// Magic for the audio-free container variant
pub const MAGIC_NO_AUDIO: &[u8; 4] = b"srch";

/// Codec tag for embedded Ogg/Vorbis streams (space padded)
pub const CODEC_TAG_OGG: &[u8; 4] = b"ogg ";

/// Container version handled by this crate
pub const ASRC_VERSION: u32 = 26;

/// Value of the marker field at 0x28 (always 1 in engine files)
pub const FORMAT_VERSION_MARKER: u32 = 1;

/// Value of the trailing chunk size field (size of the engine's smpl chunk)
pub const SMPL_CHUNK_SIZE: u32 = 44;

/// Multiplier from decoded sample width (bytes) to the stored bit depth.
///
/// Matches engine-produced files rather than any audio formula: Ogg decodes
/// to 4-byte samples where WAV uses 2, and the engine expects 16 for both.
/// Keep as a literal until checked against more real files.
pub const BIT_DEPTH_MULTIPLIER: u32 = 4;

/// Zero padding between loop_end and header_size
pub const PADDING_LEN: usize = 17;

/// Output extension for encoded containers (without leading dot)
pub const ASRC_EXT: &str = "asrc.26";

/// Output extension for extracted payloads (without leading dot)
pub const OGG_EXT: &str = "ogg";

/// Byte offset of every header field
pub mod offsets {
    pub const MAGIC: usize = 0x00;
    pub const RESERVED: usize = 0x04;
    pub const PAYLOAD_SIZE: usize = 0x08;
    pub const CODEC_TAG: usize = 0x0C;
    pub const BGM_FLAG: usize = 0x10;
    pub const SOURCE_ID: usize = 0x14;
    pub const CHANNEL_COUNT: usize = 0x18;
    pub const TOTAL_SAMPLE_COUNT: usize = 0x1C;
    pub const SAMPLE_RATE: usize = 0x20;
    pub const BIT_DEPTH: usize = 0x24;
    pub const FORMAT_VERSION_MARKER: usize = 0x28;
    pub const HAS_LOOP: usize = 0x2C;
    pub const LOOP_START: usize = 0x2D;
    pub const LOOP_END: usize = 0x31;
    pub const PADDING: usize = 0x35;
    pub const HEADER_SIZE: usize = 0x46;
    pub const SMPL_CHUNK_SIZE: usize = 0x4A;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_cover_header() {
        assert_eq!(offsets::PADDING + PADDING_LEN, offsets::HEADER_SIZE);
        assert_eq!(offsets::SMPL_CHUNK_SIZE + 4, HEADER_SIZE);
        assert_eq!(offsets::LOOP_START, offsets::HAS_LOOP + 1);
    }

    #[test]
    fn test_magics_differ() {
        assert_ne!(MAGIC_AUDIO, MAGIC_NO_AUDIO);
        assert_eq!(CODEC_TAG_OGG.len(), 4);
    }

    #[test]
    fn test_extension_carries_version() {
        assert_eq!(ASRC_EXT, format!("asrc.{}", ASRC_VERSION));
    }
}
