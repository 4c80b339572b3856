//! Classical cipher transforms
//!
//! Every transform is a pure function over text. None of them keeps state
//! between calls, and none calls another, so they can be used from anywhere
//! without coordination. Encoding never fails; decoding reports a
//! [`CipherError`] for malformed input.

pub mod caesar;
pub mod encoding;
pub mod vigenere;

pub use caesar::caesar;
pub use encoding::{base64_decode, base64_encode, hex_decode, hex_encode};
pub use vigenere::vigenere;

use serde::{Deserialize, Serialize};

/// Errors reported by decoders and keyed transforms
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CipherError {
    #[error("Invalid Base64 string: {0}")]
    InvalidBase64(String),

    #[error("Invalid hex string: odd length ({0} hex digits)")]
    OddLength(usize),

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Which way a transform runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Encode,
    Decode,
}

impl Direction {
    pub fn is_decode(&self) -> bool {
        matches!(self, Direction::Decode)
    }

    pub fn toggle(&self) -> Self {
        match self {
            Direction::Encode => Direction::Decode,
            Direction::Decode => Direction::Encode,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Encode => write!(f, "ENCODE"),
            Direction::Decode => write!(f, "DECODE"),
        }
    }
}

/// A transform together with its key, ready to apply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transform {
    Caesar { shift: i32 },
    Rot13,
    Vigenere { keyword: String },
    Base64,
    Hex,
}

impl Transform {
    pub fn name(&self) -> &'static str {
        match self {
            Transform::Caesar { .. } => "Caesar Cipher",
            Transform::Rot13 => "ROT13",
            Transform::Vigenere { .. } => "Vigenère Cipher",
            Transform::Base64 => "Base64",
            Transform::Hex => "Hexadecimal",
        }
    }

    /// Whether the transform takes a key from the player
    pub fn needs_key(&self) -> bool {
        matches!(self, Transform::Caesar { .. } | Transform::Vigenere { .. })
    }

    /// Build a transform from its short name and an optional key.
    ///
    /// Names: `caesar`, `rot13`, `vigenere`, `base64`, `hex`. Caesar keys
    /// are integers (default 3), Vigenère keys are alphabetic words.
    pub fn parse(name: &str, key: Option<&str>) -> Result<Self, CipherError> {
        match name.trim().to_lowercase().as_str() {
            "caesar" => {
                let shift = match key {
                    Some(k) => k
                        .trim()
                        .parse::<i32>()
                        .map_err(|_| CipherError::InvalidKey(format!("shift must be an integer, got '{}'", k)))?,
                    None => 3,
                };
                Ok(Transform::Caesar { shift })
            }
            "rot13" => Ok(Transform::Rot13),
            "vigenere" | "vigenère" => {
                let keyword = key
                    .ok_or_else(|| CipherError::InvalidKey("Vigenère needs a keyword".to_string()))?;
                Ok(Transform::Vigenere { keyword: keyword.to_string() })
            }
            "base64" => Ok(Transform::Base64),
            "hex" => Ok(Transform::Hex),
            other => Err(CipherError::InvalidKey(format!("unknown transform '{}'", other))),
        }
    }

    /// Run the transform in the given direction
    pub fn apply(&self, text: &str, direction: Direction) -> Result<String, CipherError> {
        let decode = direction.is_decode();
        match self {
            Transform::Caesar { shift } => Ok(caesar(text, *shift, decode)),
            Transform::Rot13 => Ok(caesar(text, 13, decode)),
            Transform::Vigenere { keyword } => vigenere(text, keyword, decode),
            Transform::Base64 if decode => base64_decode(text),
            Transform::Base64 => Ok(base64_encode(text)),
            Transform::Hex if decode => hex_decode(text),
            Transform::Hex => Ok(hex_encode(text)),
        }
    }
}

impl std::fmt::Display for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transform::Caesar { shift } => write!(f, "{} (shift {})", self.name(), shift),
            Transform::Vigenere { keyword } => write!(f, "{} (key {})", self.name(), keyword),
            _ => write!(f, "{}", self.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_defaults_caesar_shift_to_three() {
        assert_eq!(Transform::parse("Caesar", None), Ok(Transform::Caesar { shift: 3 }));
    }

    #[test]
    fn parse_rejects_non_numeric_shift() {
        assert!(matches!(
            Transform::parse("caesar", Some("three")),
            Err(CipherError::InvalidKey(_))
        ));
    }

    #[test]
    fn parse_rejects_unknown_transform() {
        assert!(Transform::parse("enigma", None).is_err());
    }

    #[test]
    fn rot13_is_its_own_inverse() {
        let t = Transform::Rot13;
        let once = t.apply("SECRET MEETING AT DAWN", Direction::Encode).unwrap();
        assert_eq!(once, "FRPERG ZRRGVAT NG QNJA");
        assert_eq!(t.apply(&once, Direction::Encode).unwrap(), "SECRET MEETING AT DAWN");
    }

    #[test]
    fn apply_surfaces_decode_errors() {
        let err = Transform::Hex.apply("abc", Direction::Decode).unwrap_err();
        assert_eq!(err, CipherError::OddLength(3));
    }

    #[test]
    fn direction_toggles() {
        assert_eq!(Direction::Encode.toggle(), Direction::Decode);
        assert_eq!(Direction::Decode.toggle(), Direction::Encode);
    }
}
