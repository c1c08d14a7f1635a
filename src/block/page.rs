//! # Page Codec
//!
//! A page is the I/O unit of the data object:
//!
//! ```text
//! +------------------+
//! | Frame Length     | (u32 LE, bytes that follow)
//! +------------------+
//! | Page Bytes       | (record frames, compressed as one unit)
//! +------------------+
//! ```
//!
//! The data object is a back-to-back concatenation of page frames; an index
//! entry's offset and length address one whole frame, so a single ranged
//! read fetches a decodable page. Any disagreement between declared and
//! actual lengths, and any decompression failure, is corruption for that
//! page and is surfaced, never skipped.

use super::compression::Compression;
use super::errors::{BlockError, BlockResult};
use super::record::Record;

/// Bytes of the page frame length prefix
pub const PAGE_HEADER_LEN: usize = 4;

/// Encode records into one page frame
pub fn encode_page(records: &[Record], compression: Compression) -> BlockResult<Vec<u8>> {
    let body_len: usize = records.iter().map(Record::frame_len).sum();
    let mut body = Vec::with_capacity(body_len);
    for record in records {
        record.write_frame(&mut body);
    }

    let encoded = compression
        .compress(&body)
        .map_err(|e| BlockError::CompressionFailed {
            reason: e.to_string(),
        })?;
    if encoded.len() > u32::MAX as usize {
        return Err(BlockError::FrameTooLarge {
            size: encoded.len() as u64,
        });
    }

    let mut frame = Vec::with_capacity(PAGE_HEADER_LEN + encoded.len());
    frame.extend_from_slice(&(encoded.len() as u32).to_le_bytes());
    frame.extend_from_slice(&encoded);
    Ok(frame)
}

/// Decode one page frame fetched from `offset` in the data object
pub fn decode_page(
    frame: &[u8],
    offset: u64,
    compression: Compression,
) -> BlockResult<Vec<Record>> {
    if frame.len() < PAGE_HEADER_LEN {
        return Err(BlockError::CorruptPage {
            offset,
            reason: format!("frame of {} bytes shorter than header", frame.len()),
        });
    }

    let declared = u32::from_le_bytes([frame[0], frame[1], frame[2], frame[3]]) as usize;
    let actual = frame.len() - PAGE_HEADER_LEN;
    if declared != actual {
        return Err(BlockError::CorruptPage {
            offset,
            reason: format!("frame declares {} bytes but carries {}", declared, actual),
        });
    }

    let body = compression
        .decompress(&frame[PAGE_HEADER_LEN..])
        .map_err(|e| BlockError::CorruptPage {
            offset,
            reason: format!("decompression failed: {}", e),
        })?;

    let mut records = Vec::new();
    let mut pos = 0;
    while pos < body.len() {
        let (record, consumed) =
            Record::read_frame(&body[pos..]).map_err(|e| BlockError::CorruptPage {
                offset,
                reason: format!("record at page byte {}: {}", pos, e),
            })?;
        records.push(record);
        pos += consumed;
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::record::TraceId;

    fn tid(n: u8) -> TraceId {
        let mut bytes = [0u8; TraceId::LENGTH];
        bytes[TraceId::LENGTH - 1] = n;
        TraceId::new(bytes)
    }

    fn sample_records() -> Vec<Record> {
        (1..=5u8)
            .map(|n| Record::new(tid(n), vec![n; n as usize * 3]))
            .collect()
    }

    #[test]
    fn test_page_roundtrip_every_codec() {
        let records = sample_records();
        for codec in [
            Compression::None,
            Compression::Lz4,
            Compression::Snappy,
            Compression::Zstd,
        ] {
            let frame = encode_page(&records, codec).unwrap();
            let decoded = decode_page(&frame, 0, codec).unwrap();
            assert_eq!(decoded, records, "codec {}", codec);
        }
    }

    #[test]
    fn test_empty_page_roundtrip() {
        let frame = encode_page(&[], Compression::Snappy).unwrap();
        let decoded = decode_page(&frame, 0, Compression::Snappy).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_length_mismatch_is_corrupt() {
        let mut frame = encode_page(&sample_records(), Compression::None).unwrap();
        frame.push(0xAA);

        let result = decode_page(&frame, 96, Compression::None);
        match result {
            Err(BlockError::CorruptPage { offset, .. }) => assert_eq!(offset, 96),
            other => panic!("expected CorruptPage, got {:?}", other),
        }
    }

    #[test]
    fn test_flipped_byte_fails_decompression() {
        let mut frame = encode_page(&sample_records(), Compression::Snappy).unwrap();
        // First compressed byte is the snappy length preamble; the stream
        // no longer decodes to the declared size
        frame[PAGE_HEADER_LEN] ^= 0xFF;

        let result = decode_page(&frame, 0, Compression::Snappy);
        assert!(matches!(result, Err(BlockError::CorruptPage { .. })));
    }

    #[test]
    fn test_truncated_record_is_corrupt() {
        // Raw codec page whose last record frame is cut short
        let records = sample_records();
        let mut body = Vec::new();
        for record in &records {
            record.write_frame(&mut body);
        }
        body.truncate(body.len() - 3);

        let mut frame = Vec::new();
        frame.extend_from_slice(&(body.len() as u32).to_le_bytes());
        frame.extend_from_slice(&body);

        let result = decode_page(&frame, 0, Compression::None);
        assert!(matches!(result, Err(BlockError::CorruptPage { .. })));
    }

    #[test]
    fn test_undersized_frame_is_corrupt() {
        let result = decode_page(&[1, 0], 0, Compression::None);
        assert!(matches!(result, Err(BlockError::CorruptPage { .. })));
    }

    #[test]
    fn test_record_length_lying_is_corrupt() {
        // One record whose length prefix claims more than the page holds
        let mut body = Vec::new();
        body.extend_from_slice(&100u32.to_le_bytes());
        body.extend_from_slice(&[0u8; 20]);

        let mut frame = Vec::new();
        frame.extend_from_slice(&(body.len() as u32).to_le_bytes());
        frame.extend_from_slice(&body);

        let result = decode_page(&frame, 0, Compression::None);
        assert!(matches!(result, Err(BlockError::CorruptPage { .. })));
    }
}
