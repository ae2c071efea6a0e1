use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Content must be valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("Content must be valid UTF-16")]
    InvalidUtf16(#[from] std::string::FromUtf16Error),
    #[error("UTF-16 content has an odd byte length: {0}")]
    TruncatedUtf16(usize),
}

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];

/// Decode a resource body into text.
///
/// A byte-order mark selects UTF-8 or UTF-16 (either endianness) and is not
/// part of the result. Without one the body must be UTF-8.
pub fn decode_text(raw: Vec<u8>) -> Result<String, DecodeError> {
    if let Some(rest) = raw.strip_prefix(UTF8_BOM) {
        return Ok(String::from_utf8(rest.to_vec())?);
    }
    if let Some(rest) = raw.strip_prefix(UTF16_LE_BOM) {
        return decode_utf16(rest, u16::from_le_bytes);
    }
    if let Some(rest) = raw.strip_prefix(UTF16_BE_BOM) {
        return decode_utf16(rest, u16::from_be_bytes);
    }
    Ok(String::from_utf8(raw)?)
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String, DecodeError> {
    if bytes.len() % 2 != 0 {
        return Err(DecodeError::TruncatedUtf16(bytes.len()));
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    Ok(String::from_utf16(&units)?)
}
