//! Vigenère cipher

use super::CipherError;

/// Encrypt or decrypt with a repeating keyword.
///
/// The key position only advances on ASCII letters, so spaces and
/// punctuation never consume a key letter. Output case follows the input.
/// The keyword must be non-empty and purely alphabetic.
pub fn vigenere(text: &str, keyword: &str, decrypt: bool) -> Result<String, CipherError> {
    let key: Vec<u8> = keyword
        .trim()
        .to_lowercase()
        .bytes()
        .map(|b| {
            if b.is_ascii_lowercase() {
                Ok(b - b'a')
            } else {
                Err(CipherError::InvalidKey(format!(
                    "keyword '{}' must contain only letters",
                    keyword
                )))
            }
        })
        .collect::<Result<_, _>>()?;

    if key.is_empty() {
        return Err(CipherError::InvalidKey("keyword is empty".to_string()));
    }

    let mut key_index = 0;
    let out = text
        .chars()
        .map(|c| {
            if !c.is_ascii_alphabetic() {
                return c;
            }
            let base = if c.is_ascii_uppercase() { b'A' } else { b'a' };
            let k = key[key_index % key.len()];
            key_index += 1;

            let p = c as u8 - base;
            let r = if decrypt { (p + 26 - k) % 26 } else { (p + k) % 26 };
            (base + r) as char
        })
        .collect();

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_attack_at_dawn() {
        assert_eq!(vigenere("ATTACKATDAWN", "LEMON", false).unwrap(), "LXFOPVEFRNHR");
        assert_eq!(vigenere("LXFOPVEFRNHR", "lemon", true).unwrap(), "ATTACKATDAWN");
    }

    #[test]
    fn punctuation_does_not_consume_key() {
        // Same letters as above, split by spaces and punctuation
        assert_eq!(
            vigenere("Attack at dawn!", "LEMON", false).unwrap(),
            "Lxfopv ef rnhr!"
        );
    }

    #[test]
    fn keyword_case_is_ignored() {
        assert_eq!(
            vigenere("REPORT", "SHADOW", false).unwrap(),
            vigenere("REPORT", "shadow", false).unwrap()
        );
    }

    #[test]
    fn rejects_empty_keyword() {
        assert!(matches!(vigenere("abc", "", false), Err(CipherError::InvalidKey(_))));
    }

    #[test]
    fn rejects_non_alphabetic_keyword() {
        assert!(matches!(vigenere("abc", "key1", true), Err(CipherError::InvalidKey(_))));
    }
}
