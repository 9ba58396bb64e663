//! Fixed-width byte field codecs
//!
//! Subscriber records carry several hex-encoded fields with hard byte
//! widths (K, OP/OPc and RAND are 16, AMF is 2, SQN is 6). Widths are
//! enforced at decode time so a malformed record is caught at load.

use crate::error::Error;

/// Decodes a hex string into exactly `N` bytes.
///
/// Upper and lower case digits are both accepted; output byte count must
/// match `N` exactly.
pub fn parse_hex_fixed<const N: usize>(s: &str) -> Result<[u8; N], Error> {
    let decoded = hex::decode(s.trim())
        .map_err(|e| Error::HexField(format!("invalid hex '{s}': {e}")))?;
    if decoded.len() != N {
        return Err(Error::HexField(format!(
            "field '{s}' decodes to {} bytes, expected {N}",
            decoded.len()
        )));
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&decoded);
    Ok(out)
}

/// Copies a byte slice into exactly `N` bytes, rejecting any other length.
pub fn bytes_fixed<const N: usize>(bytes: &[u8]) -> Result<[u8; N], Error> {
    if bytes.len() != N {
        return Err(Error::HexField(format!(
            "field is {} bytes, expected {N}",
            bytes.len()
        )));
    }
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_fixed_roundtrip() {
        let key = parse_hex_fixed::<16>("465b5ce8b199b49faa5f0a2ee238a6bc").unwrap();
        assert_eq!(hex::encode(key), "465b5ce8b199b49faa5f0a2ee238a6bc");
    }

    #[test]
    fn test_parse_hex_fixed_mixed_case() {
        let amf = parse_hex_fixed::<2>("B9b9").unwrap();
        assert_eq!(amf, [0xb9, 0xb9]);
    }

    #[test]
    fn test_parse_hex_fixed_wrong_width() {
        assert!(parse_hex_fixed::<16>("b9b9").is_err());
        assert!(parse_hex_fixed::<2>("b9b9b9").is_err());
    }

    #[test]
    fn test_parse_hex_fixed_bad_digits() {
        assert!(parse_hex_fixed::<2>("zzzz").is_err());
    }

    #[test]
    fn test_bytes_fixed() {
        assert_eq!(bytes_fixed::<2>(&[1, 2]).unwrap(), [1, 2]);
        assert!(bytes_fixed::<2>(&[1, 2, 3]).is_err());
    }
}
