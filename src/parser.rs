//! Inbound message parsing.
//!
//! Participants text either a question number (`7`) to receive the question,
//! or a number followed by a letter (`7b`, `7 B`) to answer it.

use std::{fmt, sync::LazyLock};

use regex::Regex;

static COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9]+) ?([a-d])?").expect("command pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerLetter {
    A,
    B,
    C,
    D,
}

impl AnswerLetter {
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'a' => Some(Self::A),
            'b' => Some(Self::B),
            'c' => Some(Self::C),
            'd' => Some(Self::D),
            _ => None,
        }
    }

    /// Lower-case form, as stored in `answers.answer`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "a",
            Self::B => "b",
            Self::C => "c",
            Self::D => "d",
        }
    }
}

impl fmt::Display for AnswerLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub question: i32,
    pub answer: Option<AnswerLetter>,
}

/// Extracts the first `<digits>[ ][A-D]` occurrence from `text`.
///
/// Returns `None` when the text holds no digits, or when the digits do not fit
/// a question id.
pub fn parse(text: &str) -> Option<Command> {
    let captures = COMMAND.captures(text)?;
    let question = captures.get(1)?.as_str().parse::<i32>().ok()?;
    let answer = captures
        .get(2)
        .and_then(|m| m.as_str().chars().next())
        .and_then(AnswerLetter::from_char);

    Some(Command { question, answer })
}
