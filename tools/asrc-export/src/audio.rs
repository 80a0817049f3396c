//! Ogg/Vorbis probing
//!
//! Decodes the whole stream once to learn what the container header needs.
//! The decoded samples are discarded: the container embeds the original file.
//!
//! The frame count comes from the stream's final granule position, so the
//! decoder delay and the padding of the last packet are not counted.

use anyhow::{Context, Result};
use asrc_format::AudioProperties;
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;
use symphonia::core::audio::AudioBufferRef;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Decode an Ogg/Vorbis file and report its channel count, sample rate,
/// frame count and decoded sample width
pub fn probe_ogg(input: &Path) -> Result<AudioProperties> {
    let file = File::open(input).with_context(|| format!("Failed to open input: {:?}", input))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    hint.with_extension("ogg");

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .with_context(|| format!("Failed to decode Ogg/Vorbis: {:?}", input))?;
    let mut reader = probed.format;

    let track = reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .with_context(|| format!("No audio track found in {:?}", input))?;
    let track_id = track.id;
    let granule_frames = track.codec_params.n_frames;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .with_context(|| format!("Unsupported codec in {:?}", input))?;

    let mut stream: Option<StreamSpec> = None;
    let mut decoded_frames: u64 = 0;

    loop {
        let packet = match reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to decode Ogg/Vorbis: {:?}", input));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                decoded_frames += decoded.frames() as u64;
                if stream.is_none() {
                    stream = Some(StreamSpec::from_buffer(&decoded));
                }
            }
            Err(SymphoniaError::DecodeError(msg)) => {
                tracing::warn!("Skipping undecodable packet in {:?}: {}", input, msg);
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to decode Ogg/Vorbis: {:?}", input));
            }
        }
    }

    let stream = stream.with_context(|| format!("No audio decoded from {:?}", input))?;

    // Unseekable sources have no end granule; fall back to what was decoded
    let frame_count = match granule_frames {
        Some(n_frames) => n_frames,
        None => {
            tracing::warn!("No end granule in {:?}, using decoded length", input);
            decoded_frames
        }
    };
    let frame_count = u32::try_from(frame_count)
        .with_context(|| format!("Too many sample frames in {:?}: {}", input, frame_count))?;

    let props = AudioProperties::new(
        stream.channels,
        frame_count,
        stream.sample_rate,
        stream.sample_width_bytes,
    );
    tracing::debug!(?props, "probed {:?}", input);
    Ok(props)
}

/// Signal parameters taken from the first decoded buffer
#[derive(Debug, Clone, Copy)]
struct StreamSpec {
    channels: u32,
    sample_rate: u32,
    sample_width_bytes: u32,
}

impl StreamSpec {
    fn from_buffer(buffer: &AudioBufferRef<'_>) -> Self {
        let spec = buffer.spec();
        Self {
            channels: spec.channels.count() as u32,
            sample_rate: spec.rate,
            sample_width_bytes: sample_width(buffer),
        }
    }
}

/// Bytes per sample of the decoder's output format
fn sample_width(buffer: &AudioBufferRef<'_>) -> u32 {
    match buffer {
        AudioBufferRef::U8(_) | AudioBufferRef::S8(_) => 1,
        AudioBufferRef::U16(_) | AudioBufferRef::S16(_) => 2,
        AudioBufferRef::U24(_) | AudioBufferRef::S24(_) => 3,
        AudioBufferRef::U32(_) | AudioBufferRef::S32(_) | AudioBufferRef::F32(_) => 4,
        AudioBufferRef::F64(_) => 8,
    }
}
