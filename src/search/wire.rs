//! # Tag Table Wire Format
//!
//! Compact binary table shipped with search queries:
//!
//! ```text
//! +------------------+
//! | Key Count        | (u32 LE)
//! +------------------+ per key, ascending byte order:
//! | Key Length       | (u32 LE)
//! | Key Bytes        | (UTF-8)
//! | Value Count      | (u32 LE)
//! +------------------+ per value, ascending byte order:
//! | Value Length     | (u32 LE)
//! | Value Bytes      | (UTF-8)
//! +------------------+
//! ```
//!
//! Because keys and values are sorted at write time, two maps holding the
//! same logical content encode to identical bytes no matter how they store
//! entries in memory.

use std::collections::BTreeMap;

use super::errors::{TagWireError, TagWireResult};

/// Append a table of sorted entries to `buf`, returning the table's offset
///
/// Callers sort keys and per-key values byte-wise before handing them in.
pub(crate) fn write_table(buf: &mut Vec<u8>, entries: &[(&str, Vec<&str>)]) -> usize {
    let offset = buf.len();
    write_u32(buf, entries.len() as u32);
    for (key, values) in entries {
        write_str(buf, key);
        write_u32(buf, values.len() as u32);
        for value in values {
            write_str(buf, value);
        }
    }
    offset
}

fn write_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn write_str(buf: &mut Vec<u8>, text: &str) {
    write_u32(buf, text.len() as u32);
    buf.extend_from_slice(text.as_bytes());
}

/// Decode a serialized tag table
///
/// The whole input must be consumed; trailing bytes are rejected so a
/// mis-framed buffer cannot pass for a shorter valid one.
pub fn decode_tag_table(bytes: &[u8]) -> TagWireResult<BTreeMap<String, Vec<String>>> {
    let mut cursor = 0usize;
    let key_count = read_u32(bytes, &mut cursor)?;

    let mut table = BTreeMap::new();
    for _ in 0..key_count {
        let key = read_str(bytes, &mut cursor)?;
        let value_count = read_u32(bytes, &mut cursor)? as usize;

        // Cap the preallocation by what the input could actually hold
        let mut values = Vec::with_capacity(value_count.min(bytes.len() / 4));
        for _ in 0..value_count {
            values.push(read_str(bytes, &mut cursor)?);
        }
        table.insert(key, values);
    }

    if cursor != bytes.len() {
        return Err(TagWireError::TrailingBytes {
            remaining: bytes.len() - cursor,
        });
    }
    Ok(table)
}

fn read_u32(bytes: &[u8], cursor: &mut usize) -> TagWireResult<u32> {
    let slice = bytes
        .get(*cursor..*cursor + 4)
        .ok_or(TagWireError::Truncated {
            offset: *cursor,
            needed: 4,
        })?;
    let value = u32::from_le_bytes([slice[0], slice[1], slice[2], slice[3]]);
    *cursor += 4;
    Ok(value)
}

fn read_str(bytes: &[u8], cursor: &mut usize) -> TagWireResult<String> {
    let len = read_u32(bytes, cursor)? as usize;
    let start = *cursor;
    let slice = bytes
        .get(start..start + len)
        .ok_or(TagWireError::Truncated {
            offset: start,
            needed: len,
        })?;
    let text = std::str::from_utf8(slice).map_err(|_| TagWireError::InvalidUtf8 { offset: start })?;
    *cursor = start + len;
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_table_is_four_bytes() {
        let mut buf = Vec::new();
        let offset = write_table(&mut buf, &[]);

        assert_eq!(offset, 0);
        assert_eq!(buf, vec![0, 0, 0, 0]);
        assert!(decode_tag_table(&buf).unwrap().is_empty());
    }

    #[test]
    fn test_roundtrip() {
        let mut buf = Vec::new();
        write_table(
            &mut buf,
            &[
                ("http.status", vec!["200", "500"]),
                ("service", vec!["gateway"]),
            ],
        );

        let table = decode_tag_table(&buf).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table["http.status"], vec!["200", "500"]);
        assert_eq!(table["service"], vec!["gateway"]);
    }

    #[test]
    fn test_append_returns_table_offset() {
        let mut buf = vec![0xAA; 7];
        let offset = write_table(&mut buf, &[("k", vec!["v"])]);

        assert_eq!(offset, 7);
        let table = decode_tag_table(&buf[offset..]).unwrap();
        assert_eq!(table["k"], vec!["v"]);
    }

    #[test]
    fn test_truncated_header() {
        let result = decode_tag_table(&[1, 0]);
        assert_eq!(
            result,
            Err(TagWireError::Truncated {
                offset: 0,
                needed: 4
            })
        );
    }

    #[test]
    fn test_truncated_string_body() {
        // One key of declared length 10 with only 3 bytes present
        let mut buf = Vec::new();
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.extend_from_slice(&10u32.to_le_bytes());
        buf.extend_from_slice(b"abc");

        let result = decode_tag_table(&buf);
        assert_eq!(
            result,
            Err(TagWireError::Truncated {
                offset: 8,
                needed: 10
            })
        );
    }

    #[test]
    fn test_declared_count_beyond_input() {
        // Ten keys declared, none present
        let result = decode_tag_table(&10u32.to_le_bytes());
        assert!(matches!(result, Err(TagWireError::Truncated { .. })));
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.extend_from_slice(&2u32.to_le_bytes());
        buf.extend_from_slice(&[0xFF, 0xFE]);
        buf.extend_from_slice(&0u32.to_le_bytes());

        let result = decode_tag_table(&buf);
        assert_eq!(result, Err(TagWireError::InvalidUtf8 { offset: 8 }));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut buf = Vec::new();
        write_table(&mut buf, &[("k", vec!["v"])]);
        buf.push(0x00);

        let result = decode_tag_table(&buf);
        assert_eq!(result, Err(TagWireError::TrailingBytes { remaining: 1 }));
    }
}
