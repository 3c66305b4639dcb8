use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Per-character reveal interval at `type_speed == 1.0`, in seconds.
const MAX_TYPE_TIME: f32 = 0.1;

/// `revealed` accumulates in f32 and can land just under a whole character
/// (`0.04 * 10.0 / 0.1` computes to `3.9999998`); nudge before flooring so
/// a tick on a character boundary reveals the boundary character.
const REVEAL_EPSILON: f32 = 1e-4;

/// Authored dialogue: a speaker and the paragraphs they run through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueScript {
    pub speaker: String,
    pub paragraphs: Vec<String>,
}

impl DialogueScript {
    pub fn new<S: Into<String>>(speaker: S, paragraphs: &[&str]) -> Self {
        DialogueScript {
            speaker: speaker.into(),
            paragraphs: paragraphs.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// What a call to `advance` did, so the host can log or close the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// A new paragraph started typing.
    StartedParagraph,
    /// The current paragraph was revealed in full ahead of the typewriter.
    SkippedToEnd,
    /// The last paragraph was acknowledged; the panel closes.
    Closed,
}

/// Typewriter dialogue playback.
///
/// `tick` reveals characters at `type_speed` (characters per
/// `MAX_TYPE_TIME`); `advance` is the "next" button: it skips the current
/// paragraph to its end while typing, otherwise moves on, and closes the
/// session once everything has been shown.
#[derive(Debug)]
pub struct DialogueSession {
    speaker: String,
    pending: VecDeque<String>,
    current: Option<Paragraph>,
    type_speed: f32,
    open: bool,
}

#[derive(Debug)]
struct Paragraph {
    text: String,
    char_count: usize,
    revealed: f32,
}

impl Paragraph {
    fn new(text: String) -> Self {
        let char_count = text.chars().count();
        Paragraph {
            text,
            char_count,
            revealed: 0.0,
        }
    }

    fn revealed_chars(&self) -> usize {
        ((self.revealed + REVEAL_EPSILON).floor() as usize).min(self.char_count)
    }

    fn done(&self) -> bool {
        self.revealed_chars() >= self.char_count
    }
}

impl DialogueSession {
    pub fn start(script: &DialogueScript, type_speed: f32) -> Self {
        DialogueSession {
            speaker: script.speaker.clone(),
            pending: script.paragraphs.iter().cloned().collect(),
            current: None,
            type_speed: type_speed.max(f32::MIN_POSITIVE),
            open: true,
        }
    }

    pub fn speaker(&self) -> &str {
        &self.speaker
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_typing(&self) -> bool {
        self.current.as_ref().is_some_and(|p| !p.done())
    }

    /// The revealed prefix of the current paragraph.
    pub fn visible(&self) -> &str {
        match self.current.as_ref() {
            Some(paragraph) => {
                let chars = paragraph.revealed_chars();
                match paragraph.text.char_indices().nth(chars) {
                    Some((byte, _)) => &paragraph.text[..byte],
                    None => &paragraph.text,
                }
            }
            None => "",
        }
    }

    /// Advances the typewriter by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if let Some(paragraph) = self.current.as_mut() {
            if paragraph.revealed_chars() < paragraph.char_count {
                paragraph.revealed += dt * self.type_speed / MAX_TYPE_TIME;
            }
        }
    }

    /// The "next" button. No-op once the session has closed.
    pub fn advance(&mut self) -> AdvanceOutcome {
        if !self.open {
            return AdvanceOutcome::Closed;
        }

        if let Some(paragraph) = self.current.as_mut() {
            if !paragraph.done() {
                paragraph.revealed = paragraph.char_count as f32;
                return AdvanceOutcome::SkippedToEnd;
            }
        }

        match self.pending.pop_front() {
            Some(text) => {
                self.current = Some(Paragraph::new(text));
                AdvanceOutcome::StartedParagraph
            }
            None => {
                self.open = false;
                self.current = None;
                AdvanceOutcome::Closed
            }
        }
    }
}
