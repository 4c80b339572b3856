//! Base64 and hexadecimal encodings

use base64::{engine::general_purpose, Engine as _};

use super::CipherError;

/// Encode text as standard, padded Base64
pub fn base64_encode(text: &str) -> String {
    general_purpose::STANDARD.encode(text.as_bytes())
}

/// Decode standard, padded Base64. ASCII whitespace is ignored.
pub fn base64_decode(encoded: &str) -> Result<String, CipherError> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| CipherError::InvalidBase64(e.to_string()))?;
    Ok(bytes_to_text(bytes))
}

/// Encode text as lowercase hex, two digits per byte.
///
/// Works on the UTF-8 bytes, not on code points: ASCII maps one character
/// to two digits, but `"é"` becomes `"c3a9"` rather than `"e9"`. This keeps
/// `hex_decode` an exact inverse for any text.
pub fn hex_encode(text: &str) -> String {
    hex::encode(text.as_bytes())
}

/// Decode hex after dropping every character that is not a hex digit.
///
/// `"50494552 204e494e45"` decodes to `"PIER NINE"`. What remains after
/// filtering must have an even number of digits.
pub fn hex_decode(input: &str) -> Result<String, CipherError> {
    let digits: String = input.chars().filter(|c| c.is_ascii_hexdigit()).collect();
    if digits.len() % 2 != 0 {
        return Err(CipherError::OddLength(digits.len()));
    }
    // Only hex digits of even length remain, so this cannot fail
    let bytes = hex::decode(&digits).map_err(|_| CipherError::OddLength(digits.len()))?;
    Ok(bytes_to_text(bytes))
}

/// UTF-8 when possible, otherwise one char per byte value (Latin-1)
fn bytes_to_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => err.into_bytes().into_iter().map(char::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_matches_mission_eleven() {
        assert_eq!(base64_encode("TOP SECRET"), "VE9QIFNFQ1JFVA==");
        assert_eq!(base64_decode("VE9QIFNFQ1JFVA==").unwrap(), "TOP SECRET");
    }

    #[test]
    fn base64_ignores_whitespace() {
        assert_eq!(base64_decode(" VE9Q\nIFNF Q1JFVA== ").unwrap(), "TOP SECRET");
    }

    #[test]
    fn base64_rejects_bad_alphabet() {
        let err = base64_decode("not-valid-base64!!").unwrap_err();
        assert!(matches!(err, CipherError::InvalidBase64(_)));
        assert!(err.to_string().starts_with("Invalid Base64 string"));
    }

    #[test]
    fn base64_rejects_bad_padding() {
        assert!(base64_decode("VE9QIFNFQ1JFVA=").is_err());
    }

    #[test]
    fn hex_strips_separators() {
        assert_eq!(hex_decode("50494552 204e494e45").unwrap(), "PIER NINE");
        assert_eq!(hex_decode("41:42").unwrap(), "AB");
    }

    #[test]
    fn hex_rejects_odd_length() {
        assert_eq!(hex_decode("abc"), Err(CipherError::OddLength(3)));
    }

    #[test]
    fn hex_encode_is_lowercase_pairs() {
        assert_eq!(hex_encode("PIER NINE"), "50494552204e494e45");
        assert_eq!(hex_encode("\n"), "0a");
    }

    #[test]
    fn hex_encodes_utf8_bytes() {
        assert_eq!(hex_encode("é"), "c3a9");
        assert_eq!(hex_decode("c3a9").unwrap(), "é");
    }

    #[test]
    fn invalid_utf8_falls_back_to_byte_values() {
        assert_eq!(hex_decode("ff41").unwrap(), "\u{ff}A");
    }

    #[test]
    fn decodes_mission_twenty_five_first_layer() {
        let inner = base64_decode("Q29kZSB3b3JkOiA0ODY1NzgyMDY5NzMyMDc0Njg2NTIwNmQ2MTcwNzM=").unwrap();
        assert!(inner.starts_with("Code word: "));
    }
}
