//! Caesar shift

/// Shift every ASCII letter by `shift` places, keeping its case.
///
/// Any integer shift is accepted and reduced mod 26. With `decrypt` the
/// shift runs backwards. Everything that is not an ASCII letter passes
/// through untouched.
pub fn caesar(text: &str, shift: i32, decrypt: bool) -> String {
    let mut shift = shift.rem_euclid(26) as u8;
    if decrypt {
        shift = (26 - shift) % 26;
    }

    text.chars()
        .map(|c| match c {
            'A'..='Z' => rotate(c, b'A', shift),
            'a'..='z' => rotate(c, b'a', shift),
            _ => c,
        })
        .collect()
}

fn rotate(c: char, base: u8, shift: u8) -> char {
    let offset = (c as u8 - base + shift) % 26;
    (base + offset) as char
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypts_first_mission_briefing() {
        assert_eq!(
            caesar("MEET AT THE ABANDONED WAREHOUSE AT MIDNIGHT. BRING THE PACKAGE.", 3, false),
            "PHHW DW WKH DEDQGRQHG ZDUHKRXVH DW PLGQLJKW. EULQJ WKH SDFNDJH."
        );
    }

    #[test]
    fn decrypts_and_preserves_case() {
        assert_eq!(caesar("Khoor, Zruog!", 3, true), "Hello, World!");
    }

    #[test]
    fn wraps_around_the_alphabet() {
        assert_eq!(caesar("xyz XYZ", 3, false), "abc ABC");
    }

    #[test]
    fn reduces_large_and_negative_shifts() {
        assert_eq!(caesar("abc", 29, false), "def");
        assert_eq!(caesar("abc", -1, false), "zab");
        assert_eq!(caesar("abc", 26, false), "abc");
    }

    #[test]
    fn leaves_non_ascii_letters_alone() {
        assert_eq!(caesar("é ß 9 ✓", 5, false), "é ß 9 ✓");
    }
}
