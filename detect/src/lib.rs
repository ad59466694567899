//! Heuristic question detection.
//!
//! Scores a message on cheap textual signals and compares the total against
//! a threshold that depends on how the check was triggered: a passive scan
//! of every message demands a higher score than an explicit context-menu
//! action, where the user already signalled intent.

/// Interrogative keywords that suggest a question.
const KEYWORDS: [&str; 7] = ["what", "when", "why", "which", "who", "how", "is"];

/// Messages longer than this many words earn the length bonus.
const EXPECTED_WORD_COUNT: usize = 10;

/// How the detection was triggered, with the score each trigger requires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectionKind {
    /// Passive scan of a regular message.
    Message,
    /// Explicit context-menu conversion request.
    Context,
}

impl DetectionKind {
    /// Minimum score for a positive classification.
    pub fn threshold(&self) -> u32 {
        match self {
            Self::Message => 7,
            Self::Context => 4,
        }
    }
}

/// Total heuristic score for a message.
///
/// Signals: question mark (+3), code block (+3), leading keyword (+2),
/// any later keyword (+1, counted once), more than ten words (+1).
pub fn question_score(content: &str) -> u32 {
    let lower = content.to_lowercase();
    let words: Vec<&str> = lower.split_whitespace().collect();

    let mut score = 0;
    if words.len() > EXPECTED_WORD_COUNT {
        score += 1;
    }
    if lower.contains('?') {
        score += 3;
    }
    if lower.contains("```") {
        score += 3;
    }
    if let Some(first) = words.first() {
        if KEYWORDS.contains(first) {
            score += 2;
        }
    }
    if words.iter().skip(1).any(|word| KEYWORDS.contains(word)) {
        score += 1;
    }
    score
}

/// Whether the message classifies as a question for this trigger kind.
pub fn is_question(kind: DetectionKind, content: &str) -> bool {
    question_score(content) >= kind.threshold()
}
