//! Container encode/decode over byte streams
//!
//! The payload is copied byte-for-byte in both directions.

use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::header::{
    parse_header, AsrcHeader, AudioProperties, EncodeRequest, ValidatedHeader,
};
use crate::{AsrcError, Result, HEADER_SIZE};

/// An Ogg stream measured and paired with its header, ready to be written
///
/// Measuring happens before any output exists, so an oversized payload is
/// rejected without leaving a partial file behind.
pub struct ContainerWriter<R> {
    source: R,
    header: AsrcHeader,
}

impl<R: Read + Seek> ContainerWriter<R> {
    /// Measure `source` and build the header for it
    ///
    /// `source` is the original compressed file. Its full length becomes
    /// payload_size, whatever its current position.
    pub fn new(mut source: R, props: &AudioProperties, req: &EncodeRequest) -> Result<Self> {
        let size = source.seek(SeekFrom::End(0))?;
        source.seek(SeekFrom::Start(0))?;

        let payload_size =
            u32::try_from(size).map_err(|_| AsrcError::PayloadTooLarge { size })?;

        Ok(Self {
            source,
            header: AsrcHeader::new(props, req, payload_size),
        })
    }

    pub fn header(&self) -> &AsrcHeader {
        &self.header
    }

    /// Write the header followed by the unmodified payload
    ///
    /// # Returns
    /// Total bytes written (header + payload)
    pub fn write_to<W: Write>(mut self, sink: &mut W) -> Result<u64> {
        sink.write_all(&self.header.to_bytes())?;
        let copied = io::copy(&mut self.source, sink)?;

        tracing::debug!(
            payload_size = self.header.payload_size,
            copied,
            "asrc container written"
        );
        Ok(HEADER_SIZE as u64 + copied)
    }
}

/// Wrap an Ogg stream in an `.asrc` container
///
/// # Returns
/// Total bytes written (header + payload)
pub fn encode_container<R, W>(
    source: &mut R,
    sink: &mut W,
    props: &AudioProperties,
    req: &EncodeRequest,
) -> Result<u64>
where
    R: Read + Seek,
    W: Write,
{
    ContainerWriter::new(source, props, req)?.write_to(sink)
}

/// A container whose magic has been validated, ready for payload extraction
pub struct ContainerReader<R> {
    source: R,
    header: ValidatedHeader,
}

impl<R: Read + Seek> ContainerReader<R> {
    /// Read the header prefix and validate its magic
    ///
    /// Fails with [`AsrcError::NoAudio`] or [`AsrcError::InvalidFormat`]
    /// before anything has been written anywhere.
    pub fn open(mut source: R) -> Result<Self> {
        let mut prefix = Vec::with_capacity(HEADER_SIZE);
        (&mut source).take(HEADER_SIZE as u64).read_to_end(&mut prefix)?;

        let header = parse_header(&prefix)?;
        Ok(Self { source, header })
    }

    /// Copy everything after the fixed header to `sink`
    ///
    /// # Returns
    /// Number of payload bytes copied
    pub fn extract_to<W: Write>(mut self, sink: &mut W) -> Result<u64> {
        self.source.seek(SeekFrom::Start(self.header.payload_offset()))?;
        let copied = io::copy(&mut self.source, sink)?;

        tracing::debug!(copied, "asrc payload extracted");
        Ok(copied)
    }
}

/// Strip the header from an `.asrc` container, writing the Ogg payload to `sink`
pub fn decode_container<R, W>(source: &mut R, sink: &mut W) -> Result<u64>
where
    R: Read + Seek,
    W: Write,
{
    ContainerReader::open(source)?.extract_to(sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{offsets, AsrcHeader};
    use std::io::Cursor;

    fn fake_ogg(len: usize) -> Vec<u8> {
        let mut data = b"OggS".to_vec();
        data.extend((0..len.saturating_sub(4)).map(|i| (i % 251) as u8));
        data.truncate(len);
        data
    }

    fn encode(payload: &[u8], props: &AudioProperties, req: &EncodeRequest) -> Vec<u8> {
        let mut out = Vec::new();
        encode_container(&mut Cursor::new(payload), &mut out, props, req).unwrap();
        out
    }

    #[test]
    fn test_encode_scenario_file_size() {
        let payload = fake_ogg(500);
        let props = AudioProperties::new(1, 1000, 44100, 2);
        let req = EncodeRequest::new(7).bgm().with_loop_start(100);

        let mut out = Vec::new();
        let written =
            encode_container(&mut Cursor::new(&payload), &mut out, &props, &req).unwrap();

        assert_eq!(written, 578);
        assert_eq!(out.len(), 578);
        assert_eq!(&out[HEADER_SIZE..], &payload[..]);

        let header = AsrcHeader::from_bytes(&out).unwrap();
        assert_eq!(header.payload_size, 500);
        assert_eq!(header.loop_end, 999);
    }

    #[test]
    fn test_roundtrip_payload_identity() {
        let props = AudioProperties::new(2, 44100, 44100, 4);
        for len in [0, 1, 77, 78, 79, 4096, 65537] {
            let payload = fake_ogg(len);
            let container = encode(&payload, &props, &EncodeRequest::new(len as u32));

            let mut decoded = Vec::new();
            let copied = decode_container(&mut Cursor::new(&container), &mut decoded).unwrap();

            assert_eq!(copied, len as u64);
            assert_eq!(decoded, payload, "payload mismatch for {} bytes", len);
        }
    }

    #[test]
    fn test_encode_measures_whole_source() {
        // Source position must not affect the measured size or copied bytes
        let payload = fake_ogg(300);
        let mut source = Cursor::new(&payload);
        source.set_position(120);

        let mut out = Vec::new();
        encode_container(
            &mut source,
            &mut out,
            &AudioProperties::new(1, 10, 8000, 4),
            &EncodeRequest::new(1),
        )
        .unwrap();

        assert_eq!(AsrcHeader::from_bytes(&out).unwrap().payload_size, 300);
        assert_eq!(&out[HEADER_SIZE..], &payload[..]);
    }

    #[test]
    fn test_writer_exposes_header_before_writing() {
        let payload = fake_ogg(42);
        let props = AudioProperties::new(2, 100, 48000, 4);
        let writer =
            ContainerWriter::new(Cursor::new(&payload), &props, &EncodeRequest::new(9)).unwrap();

        assert_eq!(writer.header().payload_size, 42);
        assert_eq!(writer.header().total_sample_count, 200);

        let mut out = Vec::new();
        assert_eq!(writer.write_to(&mut out).unwrap(), 120);
        assert_eq!(&out[HEADER_SIZE..], &payload[..]);
    }

    #[test]
    fn test_decode_ignores_stored_header_size() {
        let payload = fake_ogg(64);
        let props = AudioProperties::new(1, 10, 8000, 4);
        let mut container = encode(&payload, &props, &EncodeRequest::new(1));
        container[offsets::HEADER_SIZE..offsets::HEADER_SIZE + 4]
            .copy_from_slice(&10u32.to_le_bytes());
        container[offsets::PAYLOAD_SIZE..offsets::PAYLOAD_SIZE + 4]
            .copy_from_slice(&1u32.to_le_bytes());

        let mut decoded = Vec::new();
        decode_container(&mut Cursor::new(&container), &mut decoded).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_decode_rejects_srch() {
        let mut data = b"srch".to_vec();
        data.resize(200, 0);

        let mut sink = Vec::new();
        let err = decode_container(&mut Cursor::new(&data), &mut sink).unwrap_err();
        assert!(matches!(err, AsrcError::NoAudio));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_decode_rejects_unknown_magic() {
        let mut sink = Vec::new();
        let err = decode_container(&mut Cursor::new(b"fake".to_vec()), &mut sink).unwrap_err();
        assert!(matches!(err, AsrcError::InvalidFormat { ref magic } if magic == b"fake"));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_decode_truncated_srcd_is_empty() {
        let mut sink = Vec::new();
        let mut source = Cursor::new(b"srcd\0\0\0\0".to_vec());
        let copied = decode_container(&mut source, &mut sink).unwrap();
        assert_eq!(copied, 0);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_reader_validates_before_extract() {
        assert!(ContainerReader::open(Cursor::new(b"srch".to_vec())).is_err());

        let props = AudioProperties::new(1, 10, 8000, 4);
        let container = encode(&fake_ogg(10), &props, &EncodeRequest::new(1));
        let reader = ContainerReader::open(Cursor::new(container)).unwrap();
        let mut sink = Vec::new();
        assert_eq!(reader.extract_to(&mut sink).unwrap(), 10);
    }
}
