//! File conversion (.ogg <-> .asrc.26)

use anyhow::{Context, Result};
use asrc_format::{
    parse_header, AsrcHeader, AudioProperties, ContainerReader, ContainerWriter, EncodeRequest,
    HEADER_SIZE,
};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::audio::probe_ogg;
use crate::paths::{default_output, Direction};

/// Encode one Ogg file
#[derive(Debug, Clone)]
pub struct EncodeJob {
    pub input: PathBuf,
    /// Defaults to `<stem>.asrc.26` next to the input
    pub output: Option<PathBuf>,
    pub request: EncodeRequest,
}

/// Extract the Ogg payload from one container
#[derive(Debug, Clone)]
pub struct DecodeJob {
    pub input: PathBuf,
    /// Defaults to `<stem>.ogg` next to the input
    pub output: Option<PathBuf>,
}

/// A single conversion in either direction
#[derive(Debug, Clone)]
pub enum Conversion {
    Encode(EncodeJob),
    Decode(DecodeJob),
}

impl Conversion {
    /// Explicit output path, or the one derived from the input name
    pub fn output_path(&self) -> PathBuf {
        match self {
            Conversion::Encode(job) => job
                .output
                .clone()
                .unwrap_or_else(|| default_output(&job.input, Direction::Encode)),
            Conversion::Decode(job) => job
                .output
                .clone()
                .unwrap_or_else(|| default_output(&job.input, Direction::Decode)),
        }
    }

    /// Run the conversion, returning the path written
    pub fn run(&self) -> Result<PathBuf> {
        let output = self.output_path();
        tracing::info!("Converting {:?} -> {:?}", self.input(), output);

        match self {
            Conversion::Encode(job) => {
                encode_file(&job.input, &output, &job.request)?;
            }
            Conversion::Decode(job) => {
                decode_file(&job.input, &output)?;
            }
        }
        Ok(output)
    }

    pub fn input(&self) -> &Path {
        match self {
            Conversion::Encode(job) => &job.input,
            Conversion::Decode(job) => &job.input,
        }
    }
}

/// What an encode wrote
#[derive(Debug, Clone, Copy)]
pub struct EncodeSummary {
    pub props: AudioProperties,
    pub payload_size: u32,
    /// Header + payload
    pub total_size: u64,
}

/// Wrap an Ogg/Vorbis file in an `.asrc.26` container
///
/// The input is decoded first (to learn its audio properties), so an invalid
/// Ogg file fails before the output is created.
pub fn encode_file(input: &Path, output: &Path, request: &EncodeRequest) -> Result<EncodeSummary> {
    let props = probe_ogg(input)?;

    if let Some(loop_start) = request.loop_start {
        if loop_start >= props.frame_count {
            tracing::warn!(
                "Loop start {} is past the last frame ({}) of {:?}",
                loop_start,
                props.frame_count.saturating_sub(1),
                input
            );
        }
    }

    let source = File::open(input).with_context(|| format!("Failed to open input: {:?}", input))?;
    let container = ContainerWriter::new(source, &props, request)?;
    let payload_size = container.header().payload_size;

    let file =
        File::create(output).with_context(|| format!("Failed to create output: {:?}", output))?;
    let mut writer = BufWriter::new(file);

    let total_size = container.write_to(&mut writer)?;
    writer
        .flush()
        .with_context(|| format!("Failed to write output: {:?}", output))?;

    tracing::info!(
        "Encoded audio: {} ch, {} Hz, {} frames, {} bytes ({}{})",
        props.channel_count,
        props.sample_rate,
        props.frame_count,
        total_size,
        if request.is_bgm { "bgm" } else { "se" },
        request
            .loop_start
            .map(|ls| format!(", loop @ {}", ls))
            .unwrap_or_default()
    );

    Ok(EncodeSummary {
        props,
        payload_size,
        total_size,
    })
}

/// Extract the Ogg payload of an `.asrc` container
///
/// The magic is validated before the output is created, so `srch` or
/// non-asrc inputs leave nothing behind.
///
/// # Returns
/// Number of payload bytes written
pub fn decode_file(input: &Path, output: &Path) -> Result<u64> {
    let file = File::open(input).with_context(|| format!("Failed to open input: {:?}", input))?;
    let reader = ContainerReader::open(BufReader::new(file))?;

    let file =
        File::create(output).with_context(|| format!("Failed to create output: {:?}", output))?;
    let mut writer = BufWriter::new(file);

    let copied = reader.extract_to(&mut writer)?;
    writer
        .flush()
        .with_context(|| format!("Failed to write output: {:?}", output))?;

    tracing::info!("Extracted {} bytes of Ogg data", copied);
    Ok(copied)
}

/// Read every header field of a container
pub fn inspect_file(input: &Path) -> Result<AsrcHeader> {
    let file = File::open(input).with_context(|| format!("Failed to open input: {:?}", input))?;

    let mut prefix = Vec::with_capacity(HEADER_SIZE);
    file.take(HEADER_SIZE as u64)
        .read_to_end(&mut prefix)
        .with_context(|| format!("Failed to read header: {:?}", input))?;

    parse_header(&prefix)?;
    AsrcHeader::from_bytes(&prefix).with_context(|| {
        format!(
            "Truncated header in {:?}: {} of {} bytes",
            input,
            prefix.len(),
            HEADER_SIZE
        )
    })
}

/// Log all fields of a header
pub fn log_header(input: &Path, header: &AsrcHeader) {
    tracing::info!("{:?}:", input);
    tracing::info!("  payload size:   {} bytes", header.payload_size);
    tracing::info!("  codec:          {:?}", String::from_utf8_lossy(&header.codec_tag));
    tracing::info!("  bgm:            {}", header.is_bgm());
    tracing::info!("  source id:      {}", header.source_id);
    tracing::info!("  channels:       {}", header.channel_count);
    tracing::info!("  total samples:  {}", header.total_sample_count);
    tracing::info!("  sample rate:    {} Hz", header.sample_rate);
    tracing::info!("  bit depth:      {}", header.bit_depth);
    tracing::info!("  marker:         {}", header.format_version_marker);
    if header.has_loop {
        tracing::info!("  loop:           {}..={}", header.loop_start, header.loop_end);
    } else {
        tracing::info!("  loop:           none (end {})", header.loop_end);
    }
    tracing::info!("  header size:    {}", header.header_size);
    tracing::info!("  smpl chunk:     {}", header.smpl_chunk_size);
}

#[cfg(test)]
mod tests {
    use super::*;
    use asrc_format::{encode_container, AsrcError};
    use std::io::Cursor;
    use tempfile::tempdir;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    fn write_container(path: &Path, payload: &[u8], req: &EncodeRequest) {
        let props = AudioProperties::new(2, 2000, 48000, 4);
        let mut data = Vec::new();
        encode_container(&mut Cursor::new(payload), &mut data, &props, req).unwrap();
        std::fs::write(path, data).unwrap();
    }

    #[test]
    fn test_decode_file() {
        let dir = tempdir().expect("Failed to create temp dir");
        let input = dir.path().join("bgm_01.asrc.26");
        let output = dir.path().join("bgm_01.ogg");
        write_container(&input, b"OggS payload bytes", &EncodeRequest::new(1));

        let copied = decode_file(&input, &output).unwrap();
        assert_eq!(copied, 18);
        assert_eq!(std::fs::read(&output).unwrap(), b"OggS payload bytes");
    }

    #[test]
    fn test_decode_srch_creates_no_output() {
        let dir = tempdir().expect("Failed to create temp dir");
        let input = dir.path().join("se.asrc.26");
        let output = dir.path().join("se.ogg");
        std::fs::write(&input, b"srch\0\0\0\0").unwrap();

        let err = decode_file(&input, &output).unwrap_err();
        assert!(matches!(err.downcast_ref::<AsrcError>(), Some(AsrcError::NoAudio)));
        assert!(!output.exists());
    }

    #[test]
    fn test_decode_invalid_creates_no_output() {
        let dir = tempdir().expect("Failed to create temp dir");
        let input = dir.path().join("junk.bin");
        let output = dir.path().join("junk.ogg");
        std::fs::write(&input, b"fake data").unwrap();

        let err = decode_file(&input, &output).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AsrcError>(),
            Some(AsrcError::InvalidFormat { .. })
        ));
        assert!(!output.exists());
    }

    #[test]
    fn test_encode_file_summary() {
        let dir = tempdir().expect("Failed to create temp dir");
        let input = fixture("silence_mono_1000.ogg");
        let output = dir.path().join("silence.asrc.26");
        let source_len = std::fs::metadata(&input).unwrap().len();

        let request = EncodeRequest::new(7).bgm().with_loop_start(100);
        let summary = encode_file(&input, &output, &request).unwrap();

        assert_eq!(summary.props, AudioProperties::new(1, 1000, 44100, 4));
        assert_eq!(summary.payload_size as u64, source_len);
        assert_eq!(summary.total_size, HEADER_SIZE as u64 + source_len);
        assert_eq!(std::fs::metadata(&output).unwrap().len(), summary.total_size);
    }

    #[test]
    fn test_encode_invalid_ogg_creates_no_output() {
        let dir = tempdir().expect("Failed to create temp dir");
        let input = dir.path().join("broken.ogg");
        let output = dir.path().join("broken.asrc.26");
        std::fs::write(&input, b"definitely not ogg").unwrap();

        assert!(encode_file(&input, &output, &EncodeRequest::new(1)).is_err());
        assert!(!output.exists());
    }

    #[test]
    fn test_inspect_file() {
        let dir = tempdir().expect("Failed to create temp dir");
        let input = dir.path().join("loop.asrc.26");
        write_container(&input, &[1, 2, 3], &EncodeRequest::new(42).bgm().with_loop_start(10));

        let header = inspect_file(&input).unwrap();
        assert_eq!(header.source_id, 42);
        assert!(header.is_bgm());
        assert!(header.has_loop);
        assert_eq!(header.loop_start, 10);
        assert_eq!(header.loop_end, 1999);
        assert_eq!(header.total_sample_count, 4000);
        assert_eq!(header.payload_size, 3);
    }

    #[test]
    fn test_inspect_truncated() {
        let dir = tempdir().expect("Failed to create temp dir");
        let input = dir.path().join("short.asrc.26");
        std::fs::write(&input, b"srcd\0\0").unwrap();

        let err = inspect_file(&input).unwrap_err();
        assert!(err.to_string().contains("Truncated header"));
    }

    #[test]
    fn test_conversion_output_paths() {
        let encode = Conversion::Encode(EncodeJob {
            input: PathBuf::from("snd/title.ogg"),
            output: None,
            request: EncodeRequest::new(1),
        });
        assert_eq!(encode.output_path(), PathBuf::from("snd/title.asrc.26"));

        let decode = Conversion::Decode(DecodeJob {
            input: PathBuf::from("snd/title.asrc.26"),
            output: Some(PathBuf::from("out.ogg")),
        });
        assert_eq!(decode.output_path(), PathBuf::from("out.ogg"));
    }

    #[test]
    fn test_conversion_run_decode() {
        let dir = tempdir().expect("Failed to create temp dir");
        let input = dir.path().join("voice.asrc.26");
        write_container(&input, b"OggS", &EncodeRequest::new(5));

        let written = Conversion::Decode(DecodeJob {
            input: input.clone(),
            output: None,
        })
        .run()
        .unwrap();

        assert_eq!(written, dir.path().join("voice.ogg"));
        assert_eq!(std::fs::read(&written).unwrap(), b"OggS");
    }
}
