//! Response body decoding
//!
//! The client advertises compression support itself and decodes bodies
//! here, so the `Content-Encoding` header of the response stays visible.

use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
use std::io::Read;

/// Decodes a response body according to its `Content-Encoding`
///
/// Unknown encodings and corrupt payloads fall back to the raw bytes.
pub fn decode_body(bytes: &[u8], content_encoding: Option<&str>) -> Vec<u8> {
    let encoding = content_encoding
        .map(|e| e.trim().to_ascii_lowercase())
        .unwrap_or_default();

    let decoded = match encoding.as_str() {
        "gzip" | "x-gzip" => read_all(GzDecoder::new(bytes)),
        "deflate" => {
            read_all(ZlibDecoder::new(bytes)).or_else(|| read_all(DeflateDecoder::new(bytes)))
        }
        "br" => read_all(brotli::Decompressor::new(bytes, 4096)),
        _ => None,
    };

    match decoded {
        Some(body) => body,
        None => {
            if !encoding.is_empty() && encoding != "identity" {
                tracing::debug!("Could not decode '{}' body, using raw bytes", encoding);
            }
            bytes.to_vec()
        }
    }
}

fn read_all(mut reader: impl Read) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    reader.read_to_end(&mut out).ok()?;
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_identity_passthrough() {
        assert_eq!(decode_body(b"hello", None), b"hello");
        assert_eq!(decode_body(b"hello", Some("identity")), b"hello");
    }

    #[test]
    fn test_gzip_body() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"<html>compressed</html>").unwrap();
        let compressed = encoder.finish().unwrap();

        assert_eq!(
            decode_body(&compressed, Some("gzip")),
            b"<html>compressed</html>"
        );
    }

    #[test]
    fn test_brotli_body() {
        let mut compressed = Vec::new();
        {
            let mut writer = brotli::CompressorWriter::new(&mut compressed, 4096, 5, 22);
            writer.write_all(b"brotli text").unwrap();
        }
        assert_eq!(decode_body(&compressed, Some("br")), b"brotli text");
    }

    #[test]
    fn test_corrupt_payload_falls_back_to_raw() {
        assert_eq!(decode_body(b"not gzip", Some("gzip")), b"not gzip");
    }
}
