use std::fmt;

use serde::{Deserialize, Serialize};

pub mod backend;
pub mod config_file;
pub mod parser;
pub mod text_utils;

// Re-export for convenience
pub use backend::{BackendError, PdfBackend};
pub use parser::{BlockIssue, IssueKind, ParseError, ParseReport, parse_questions, parse_report};
pub use text_utils::{normalize_whitespace, truncate_chars};

/// One of the four option labels a question can be answered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerLetter {
    A,
    B,
    C,
    D,
}

impl AnswerLetter {
    pub const ALL: [AnswerLetter; 4] = [Self::A, Self::B, Self::C, Self::D];

    /// Position of the option this letter designates (A=0 … D=3).
    pub fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
            Self::D => 3,
        }
    }

    /// Parse a letter case-insensitively. Anything outside `A..=D` is `None`.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(Self::A),
            'B' => Some(Self::B),
            'C' => Some(Self::C),
            'D' => Some(Self::D),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
        }
    }

    /// The literal option marker that introduces this option, e.g. `B)`.
    pub fn marker(self) -> &'static str {
        match self {
            Self::A => "A)",
            Self::B => "B)",
            Self::C => "C)",
            Self::D => "D)",
        }
    }
}

impl fmt::Display for AnswerLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A multiple-choice question parsed from a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Question text with whitespace runs collapsed to single spaces.
    pub text: String,
    /// The four options in document order (A, B, C, D).
    pub options: [String; 4],
    pub correct: AnswerLetter,
}

impl Question {
    /// Text of the option designated by [`Question::correct`].
    pub fn correct_option(&self) -> &str {
        &self.options[self.correct.index()]
    }
}
