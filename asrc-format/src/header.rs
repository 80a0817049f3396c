//! Header codec for `.asrc` version 26
//!
//! Packing is mechanical: inputs are not range-checked and derived fields use
//! wrapping arithmetic, so a zero frame count stores a loop_end of
//! `0xFFFF_FFFF` instead of being silently repaired.

use crate::offsets;
use crate::{
    AsrcError, Result, BIT_DEPTH_MULTIPLIER, CODEC_TAG_OGG, FORMAT_VERSION_MARKER, HEADER_SIZE,
    MAGIC_AUDIO, MAGIC_NO_AUDIO, SMPL_CHUNK_SIZE,
};

/// Audio properties reported by the Ogg/Vorbis decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioProperties {
    pub channel_count: u32,
    /// Sample frames per channel
    pub frame_count: u32,
    pub sample_rate: u32,
    /// Bytes per decoded sample (4 for Vorbis, which decodes to f32)
    pub sample_width_bytes: u32,
}

impl AudioProperties {
    pub fn new(
        channel_count: u32,
        frame_count: u32,
        sample_rate: u32,
        sample_width_bytes: u32,
    ) -> Self {
        Self {
            channel_count,
            frame_count,
            sample_rate,
            sample_width_bytes,
        }
    }
}

/// User-supplied flags for one encode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeRequest {
    /// Background/streaming music rather than a one-shot sound effect
    pub is_bgm: bool,
    pub audio_source_id: u32,
    /// Sample where looping resumes; `None` means the sound does not loop
    pub loop_start: Option<u32>,
}

impl EncodeRequest {
    pub fn new(audio_source_id: u32) -> Self {
        Self {
            is_bgm: false,
            audio_source_id,
            loop_start: None,
        }
    }

    /// Mark as bgm/streaming
    pub fn bgm(mut self) -> Self {
        self.is_bgm = true;
        self
    }

    pub fn with_loop_start(mut self, loop_start: u32) -> Self {
        self.loop_start = Some(loop_start);
        self
    }
}

/// Every stored field of the 78-byte header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsrcHeader {
    pub magic: [u8; 4],
    pub reserved: u32,
    pub payload_size: u32,
    pub codec_tag: [u8; 4],
    pub bgm_flag: u32,
    pub source_id: u32,
    pub channel_count: u32,
    pub total_sample_count: u32,
    pub sample_rate: u32,
    pub bit_depth: u32,
    pub format_version_marker: u32,
    pub has_loop: bool,
    pub loop_start: u32,
    pub loop_end: u32,
    pub header_size: u32,
    pub smpl_chunk_size: u32,
}

impl AsrcHeader {
    pub const SIZE: usize = HEADER_SIZE;

    /// Build a header from decoded audio properties and encode flags
    pub fn new(props: &AudioProperties, req: &EncodeRequest, payload_size: u32) -> Self {
        Self {
            magic: *MAGIC_AUDIO,
            reserved: 0,
            payload_size,
            codec_tag: *CODEC_TAG_OGG,
            bgm_flag: req.is_bgm as u32,
            source_id: req.audio_source_id,
            channel_count: props.channel_count,
            total_sample_count: props.channel_count.wrapping_mul(props.frame_count),
            sample_rate: props.sample_rate,
            bit_depth: props.sample_width_bytes.wrapping_mul(BIT_DEPTH_MULTIPLIER),
            format_version_marker: FORMAT_VERSION_MARKER,
            has_loop: req.loop_start.is_some(),
            loop_start: req.loop_start.unwrap_or(0),
            loop_end: props.frame_count.wrapping_sub(1),
            header_size: HEADER_SIZE as u32,
            smpl_chunk_size: SMPL_CHUNK_SIZE,
        }
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[offsets::MAGIC..offsets::MAGIC + 4].copy_from_slice(&self.magic);
        put_u32(&mut bytes, offsets::RESERVED, self.reserved);
        put_u32(&mut bytes, offsets::PAYLOAD_SIZE, self.payload_size);
        bytes[offsets::CODEC_TAG..offsets::CODEC_TAG + 4].copy_from_slice(&self.codec_tag);
        put_u32(&mut bytes, offsets::BGM_FLAG, self.bgm_flag);
        put_u32(&mut bytes, offsets::SOURCE_ID, self.source_id);
        put_u32(&mut bytes, offsets::CHANNEL_COUNT, self.channel_count);
        put_u32(&mut bytes, offsets::TOTAL_SAMPLE_COUNT, self.total_sample_count);
        put_u32(&mut bytes, offsets::SAMPLE_RATE, self.sample_rate);
        put_u32(&mut bytes, offsets::BIT_DEPTH, self.bit_depth);
        put_u32(&mut bytes, offsets::FORMAT_VERSION_MARKER, self.format_version_marker);
        bytes[offsets::HAS_LOOP] = self.has_loop as u8;
        put_u32(&mut bytes, offsets::LOOP_START, self.loop_start);
        put_u32(&mut bytes, offsets::LOOP_END, self.loop_end);
        // padding stays 0
        put_u32(&mut bytes, offsets::HEADER_SIZE, self.header_size);
        put_u32(&mut bytes, offsets::SMPL_CHUNK_SIZE, self.smpl_chunk_size);
        bytes
    }

    /// Read every field back for inspection.
    ///
    /// Performs no validation at all; use [`parse_header`] to decide whether a
    /// buffer is a decodable container. Returns `None` if the buffer is shorter
    /// than the header.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            magic: get_tag(bytes, offsets::MAGIC),
            reserved: get_u32(bytes, offsets::RESERVED),
            payload_size: get_u32(bytes, offsets::PAYLOAD_SIZE),
            codec_tag: get_tag(bytes, offsets::CODEC_TAG),
            bgm_flag: get_u32(bytes, offsets::BGM_FLAG),
            source_id: get_u32(bytes, offsets::SOURCE_ID),
            channel_count: get_u32(bytes, offsets::CHANNEL_COUNT),
            total_sample_count: get_u32(bytes, offsets::TOTAL_SAMPLE_COUNT),
            sample_rate: get_u32(bytes, offsets::SAMPLE_RATE),
            bit_depth: get_u32(bytes, offsets::BIT_DEPTH),
            format_version_marker: get_u32(bytes, offsets::FORMAT_VERSION_MARKER),
            has_loop: bytes[offsets::HAS_LOOP] != 0,
            loop_start: get_u32(bytes, offsets::LOOP_START),
            loop_end: get_u32(bytes, offsets::LOOP_END),
            header_size: get_u32(bytes, offsets::HEADER_SIZE),
            smpl_chunk_size: get_u32(bytes, offsets::SMPL_CHUNK_SIZE),
        })
    }

    /// Check if the bgm flag is set
    pub fn is_bgm(&self) -> bool {
        self.bgm_flag != 0
    }
}

/// Pack a header for `payload_size` bytes of Ogg data
pub fn encode_header(
    props: &AudioProperties,
    req: &EncodeRequest,
    payload_size: u32,
) -> [u8; HEADER_SIZE] {
    AsrcHeader::new(props, req, payload_size).to_bytes()
}

/// Outcome of a successful [`parse_header`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedHeader {
    _private: (),
}

impl ValidatedHeader {
    /// Byte offset of the payload. Always [`HEADER_SIZE`], whatever the
    /// stored header_size field says.
    pub fn payload_offset(&self) -> u64 {
        HEADER_SIZE as u64
    }
}

/// Validate the magic of a buffer claiming to be a container header.
///
/// Only the first four bytes are examined.
pub fn parse_header(bytes: &[u8]) -> Result<ValidatedHeader> {
    let magic = &bytes[..bytes.len().min(4)];

    if magic == MAGIC_NO_AUDIO {
        return Err(AsrcError::NoAudio);
    }
    if magic != MAGIC_AUDIO {
        return Err(AsrcError::InvalidFormat {
            magic: magic.to_vec(),
        });
    }

    tracing::debug!("asrc magic ok");
    Ok(ValidatedHeader { _private: () })
}

#[inline]
fn put_u32(bytes: &mut [u8], offset: usize, value: u32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

#[inline]
fn get_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
}

#[inline]
fn get_tag(bytes: &[u8], offset: usize) -> [u8; 4] {
    [bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]]
}
