//! Hidden key sequences

use std::time::Duration;

/// Keys the detector cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EggKey {
    Up,
    Down,
    Left,
    Right,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EasterEgg {
    MatrixMode,
    AgentMode,
}

impl EasterEgg {
    pub fn message(&self) -> &'static str {
        match self {
            EasterEgg::MatrixMode => "Matrix mode activated. Follow the white rabbit.",
            EasterEgg::AgentMode => "Agent mode activated. Licence to decrypt granted.",
        }
    }

    /// How long the effect lasts before the normal look returns
    pub fn duration(&self) -> Duration {
        match self {
            EasterEgg::MatrixMode => Duration::from_secs(10),
            EasterEgg::AgentMode => Duration::from_secs(5),
        }
    }
}

const KONAMI: [EggKey; 10] = [
    EggKey::Up,
    EggKey::Up,
    EggKey::Down,
    EggKey::Down,
    EggKey::Left,
    EggKey::Right,
    EggKey::Left,
    EggKey::Right,
    EggKey::Char('b'),
    EggKey::Char('a'),
];

const AGENT: [EggKey; 3] = [EggKey::Char('0'), EggKey::Char('0'), EggKey::Char('7')];

/// Progress through one sequence
#[derive(Debug, Clone, Default)]
struct Matcher {
    position: usize,
}

impl Matcher {
    fn advance(&mut self, sequence: &[EggKey], key: EggKey) -> bool {
        if sequence[self.position] == key {
            self.position += 1;
        } else {
            self.position = 0;
        }
        if self.position == sequence.len() {
            self.position = 0;
            return true;
        }
        false
    }
}

/// Watches key presses for the hidden sequences
#[derive(Debug, Clone, Default)]
pub struct EggTracker {
    konami: Matcher,
    agent: Matcher,
}

impl EggTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: EggKey) -> Option<EasterEgg> {
        let key = match key {
            EggKey::Char(c) => EggKey::Char(c.to_ascii_lowercase()),
            other => other,
        };
        let matrix = self.konami.advance(&KONAMI, key);
        let agent = self.agent.advance(&AGENT, key);
        if matrix {
            Some(EasterEgg::MatrixMode)
        } else if agent {
            Some(EasterEgg::AgentMode)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(tracker: &mut EggTracker, keys: &[EggKey]) -> Vec<EasterEgg> {
        keys.iter().filter_map(|k| tracker.press(*k)).collect()
    }

    #[test]
    fn konami_code_triggers_matrix_mode() {
        let mut tracker = EggTracker::new();
        assert_eq!(feed(&mut tracker, &KONAMI), vec![EasterEgg::MatrixMode]);
    }

    #[test]
    fn double_oh_seven() {
        let mut tracker = EggTracker::new();
        let keys = [EggKey::Char('0'), EggKey::Char('0'), EggKey::Char('7')];
        assert_eq!(feed(&mut tracker, &keys), vec![EasterEgg::AgentMode]);
    }

    #[test]
    fn wrong_key_resets() {
        let mut tracker = EggTracker::new();
        let keys = [EggKey::Char('0'), EggKey::Char('x'), EggKey::Char('0'), EggKey::Char('7')];
        assert!(feed(&mut tracker, &keys).is_empty());
    }

    #[test]
    fn miss_needs_a_full_new_run() {
        let mut tracker = EggTracker::new();
        let mut keys = vec![EggKey::Up, EggKey::Up, EggKey::Up];
        keys.extend_from_slice(&KONAMI[1..]);
        assert!(feed(&mut tracker, &keys).is_empty());

        let mut tracker = EggTracker::new();
        let keys = [EggKey::Up, EggKey::Left];
        assert!(feed(&mut tracker, &keys).is_empty());
        assert_eq!(feed(&mut tracker, &KONAMI), vec![EasterEgg::MatrixMode]);
    }

    #[test]
    fn uppercase_letters_count() {
        let mut tracker = EggTracker::new();
        let mut keys = KONAMI.to_vec();
        keys[8] = EggKey::Char('B');
        keys[9] = EggKey::Char('A');
        assert_eq!(feed(&mut tracker, &keys), vec![EasterEgg::MatrixMode]);
    }

    #[test]
    fn looks_wear_off() {
        assert_eq!(EasterEgg::MatrixMode.duration(), Duration::from_secs(10));
        assert_eq!(EasterEgg::AgentMode.duration(), Duration::from_secs(5));
    }
}
