//! Typewriter effect for the hero subtitle.

use folio_protocol::{DomCommand, ElementId};

use crate::config::TypingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Typing,
    Deleting,
}

/// Types a phrase one character at a time, holds it, deletes it, pauses,
/// then moves on to the next phrase. Driven by elapsed time: each call to
/// [`Typewriter::tick`] catches up on every step that became due.
#[derive(Debug, Clone)]
pub struct Typewriter {
    target: ElementId,
    phrases: Vec<Vec<char>>,
    config: TypingConfig,
    phrase: usize,
    chars: usize,
    phase: Phase,
    next_due_ms: Option<f64>,
}

impl Typewriter {
    /// `None` when there is nothing to type.
    pub fn new(target: ElementId, config: TypingConfig) -> Option<Self> {
        let phrases: Vec<Vec<char>> = config
            .phrases
            .iter()
            .filter(|p| !p.is_empty())
            .map(|p| p.chars().collect())
            .collect();
        if phrases.is_empty() {
            return None;
        }
        Some(Self {
            target,
            phrases,
            config,
            phrase: 0,
            chars: 0,
            phase: Phase::Typing,
            next_due_ms: None,
        })
    }

    pub fn text(&self) -> String {
        self.phrases[self.phrase][..self.chars].iter().collect()
    }

    /// Show the first phrase in full without animating.
    pub fn settle(&mut self) -> DomCommand {
        self.phrase = 0;
        self.chars = self.phrases[0].len();
        self.next_due_ms = None;
        DomCommand::set_text(&self.target, self.text())
    }

    pub fn start(&mut self, now_ms: f64) {
        self.next_due_ms = Some(now_ms);
    }

    pub fn is_running(&self) -> bool {
        self.next_due_ms.is_some()
    }

    pub fn stop(&mut self) {
        self.next_due_ms = None;
    }

    /// Returns the new text if anything changed since the last call.
    pub fn tick(&mut self, now_ms: f64) -> Option<DomCommand> {
        let mut changed = false;
        while let Some(due) = self.next_due_ms {
            if due > now_ms {
                break;
            }
            let delay = self.step();
            self.next_due_ms = Some(due + delay);
            changed = true;
        }
        changed.then(|| DomCommand::set_text(&self.target, self.text()))
    }

    /// Apply one keystroke and return the delay until the next.
    fn step(&mut self) -> f64 {
        let len = self.phrases[self.phrase].len();
        match self.phase {
            Phase::Typing => {
                self.chars = (self.chars + 1).min(len);
                if self.chars == len {
                    self.phase = Phase::Deleting;
                    self.config.hold_ms
                } else {
                    self.config.type_ms
                }
            }
            Phase::Deleting => {
                self.chars = self.chars.saturating_sub(1);
                if self.chars == 0 {
                    self.phase = Phase::Typing;
                    self.phrase = (self.phrase + 1) % self.phrases.len();
                    self.config.pause_ms
                } else {
                    self.config.delete_ms
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn writer(phrases: &[&str]) -> Typewriter {
        let config = TypingConfig {
            phrases: phrases.iter().map(|p| p.to_string()).collect(),
            ..TypingConfig::default()
        };
        Typewriter::new("typing".into(), config).unwrap()
    }

    #[test]
    fn empty_phrases_yield_nothing() {
        assert!(Typewriter::new("t".into(), TypingConfig { phrases: vec![String::new()], ..Default::default() }).is_none());
    }

    #[test]
    fn types_one_char_per_interval() {
        let mut w = writer(&["abc"]);
        w.start(0.0);
        w.tick(0.0);
        assert_eq!(w.text(), "a");
        assert!(w.tick(99.0).is_none());
        w.tick(100.0);
        assert_eq!(w.text(), "ab");
        w.tick(200.0);
        assert_eq!(w.text(), "abc");
    }

    #[test]
    fn holds_then_deletes_then_moves_on() {
        let mut w = writer(&["ab", "xy"]);
        w.start(0.0);
        w.tick(100.0);
        assert_eq!(w.text(), "ab");
        // Hold 2000ms after the last keystroke (t=100).
        w.tick(2099.0);
        assert_eq!(w.text(), "ab");
        w.tick(2100.0);
        assert_eq!(w.text(), "a");
        w.tick(2150.0);
        assert_eq!(w.text(), "");
        // Pause 500ms, then the next phrase starts.
        w.tick(2649.0);
        assert_eq!(w.text(), "");
        let cmd = w.tick(2650.0).unwrap();
        assert_eq!(cmd, DomCommand::set_text(&"typing".into(), "x"));
    }

    #[test]
    fn wraps_back_to_first_phrase() {
        let mut w = writer(&["a", "b"]);
        w.start(0.0);
        // a: typed at 0, hold till 2000 -> deleted, pause till 2500
        // b: typed at 2500, hold till 4500 -> deleted, pause till 5000
        w.tick(5000.0);
        assert_eq!(w.text(), "a");
    }

    #[test]
    fn settle_shows_first_phrase() {
        let mut w = writer(&["hello", "world"]);
        let cmd = w.settle();
        assert_eq!(cmd, DomCommand::set_text(&"typing".into(), "hello"));
        assert!(!w.is_running());
        assert!(w.tick(10_000.0).is_none());
    }

    #[test]
    fn handles_multibyte_text() {
        let mut w = writer(&["é—ü"]);
        w.start(0.0);
        w.tick(100.0);
        assert_eq!(w.text(), "é—");
    }
}
