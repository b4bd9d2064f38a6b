//! Line-oriented recognizer for multiple-choice question blocks.
//!
//! A block looks like:
//!
//! ```text
//! 1. Question text
//! A) Option 1
//! B) Option 2
//! C) Option 3
//! D) Option 4
//! Answer: B
//! ```
//!
//! The recognizer walks the text one line at a time through
//! `Idle → Question → A) → B) → C) → D) → Answer:`. A block that breaks the
//! sequence is abandoned and recorded as a [`BlockIssue`] so the caller can
//! say *which* part of a block was wrong instead of just "no match".
//!
//! Once a block has opened with a number prefix, later numbered lines are
//! part of its text (a numbered list inside the question). The letter after
//! `Answer:` may also sit on the next non-blank line.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::text_utils::{normalize_whitespace, truncate_chars};
use crate::{AnswerLetter, Question};

/// Issues listed in a [`ParseError::NoQuestions`] message before eliding.
const MAX_REPORTED_ISSUES: usize = 5;

/// Longest excerpt of an offending line kept in a [`BlockIssue`].
const FOUND_EXCERPT_CHARS: usize = 60;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("{}", no_questions_message(.issues))]
    NoQuestions { issues: Vec<BlockIssue> },
}

fn no_questions_message(issues: &[BlockIssue]) -> String {
    let mut msg =
        String::from("No valid questions found. Ensure PDF follows required format.");
    if !issues.is_empty() {
        msg.push_str("\nRejected blocks:");
        for issue in issues.iter().take(MAX_REPORTED_ISSUES) {
            msg.push_str("\n  ");
            msg.push_str(&issue.to_string());
        }
        if issues.len() > MAX_REPORTED_ISSUES {
            msg.push_str(&format!(
                "\n  ... and {} more",
                issues.len() - MAX_REPORTED_ISSUES
            ));
        }
    }
    msg
}

/// What the recognizer was waiting for when a block went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Option(AnswerLetter),
    Answer,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Option(letter) => write!(f, "option {}", letter.marker()),
            Self::Answer => write!(f, "an `Answer:` or `Correct:` line"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// A line arrived out of sequence.
    Unexpected { expected: Expected, found: String },
    /// The answer line carried something other than a single A–D letter.
    InvalidAnswer(String),
    EmptyQuestion,
    EmptyOption(AnswerLetter),
    /// Input ended in the middle of a block.
    Incomplete { expected: Expected },
}

/// A candidate block that was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockIssue {
    /// 1-based line where the problem was detected.
    pub line: usize,
    /// 1-based line where the rejected block's question text began.
    pub block_line: usize,
    pub kind: IssueKind,
}

impl fmt::Display for BlockIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {} (block starting at line {}): ",
            self.line, self.block_line
        )?;
        match &self.kind {
            IssueKind::Unexpected { expected, found } => {
                write!(f, "expected {expected}, found `{found}`")
            }
            IssueKind::InvalidAnswer(found) => {
                write!(f, "answer must be a single letter A-D, found `{found}`")
            }
            IssueKind::EmptyQuestion => write!(f, "question text is empty"),
            IssueKind::EmptyOption(letter) => write!(f, "option {} is empty", letter.marker()),
            IssueKind::Incomplete { expected } => {
                write!(f, "text ended while waiting for {expected}")
            }
        }
    }
}

/// Everything the recognizer found: accepted questions and rejected blocks.
#[derive(Debug, Clone, Default)]
pub struct ParseReport {
    pub questions: Vec<Question>,
    pub issues: Vec<BlockIssue>,
}

/// Parse questions from extracted document text.
///
/// Returns [`ParseError::NoQuestions`] when nothing matched, carrying the
/// rejected blocks as diagnostics.
pub fn parse_questions(text: &str) -> Result<Vec<Question>, ParseError> {
    let report = parse_report(text);
    if report.questions.is_empty() {
        return Err(ParseError::NoQuestions {
            issues: report.issues,
        });
    }
    tracing::info!(
        questions = report.questions.len(),
        rejected = report.issues.len(),
        "parsed questions"
    );
    Ok(report.questions)
}

/// Run the recognizer over `text` without failing on an empty result.
pub fn parse_report(text: &str) -> ParseReport {
    let mut parser = BlockParser::default();
    for (idx, raw) in text.lines().enumerate() {
        parser.feed(idx + 1, raw);
    }
    parser.finish()
}

/// Classification of a single input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line<'a> {
    Blank,
    /// `A)` … `D)` followed by the option text.
    Marker(AnswerLetter, &'a str),
    /// `Answer:` / `Correct:` followed by whatever comes after the colon.
    Answer(&'a str),
    /// A question-number prefix such as `3.`, `Q4:` or a bare `5`; `rest` is
    /// the remainder of the line. `bare` is set when no punctuation follows
    /// the number.
    Numbered { rest: &'a str, bare: bool },
    Text(&'a str),
}

fn classify(raw: &str) -> Line<'_> {
    // "1.", "12)", "3:", "Q4.", "Question 5:" followed by a space or the end
    // of the line, or a bare number followed by a word ("6 Which ...").
    // Text like "2+2" or "1.5 litres" is not a prefix.
    static NUMBER_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"(?i)^(?:q(?:uestion)?\s*)?\d+(?:\s*[.:)](?:\s+(?P<rest>.*))?|\s+(?P<bare>\p{L}.*))$",
        )
        .unwrap()
    });

    let line = raw.trim();
    if line.is_empty() {
        return Line::Blank;
    }

    for letter in AnswerLetter::ALL {
        if let Some(rest) = line.strip_prefix(letter.marker()) {
            return Line::Marker(letter, rest.trim());
        }
    }

    for prefix in ["answer:", "correct:"] {
        if line.len() >= prefix.len()
            && line.is_char_boundary(prefix.len())
            && line[..prefix.len()].eq_ignore_ascii_case(prefix)
        {
            return Line::Answer(line[prefix.len()..].trim());
        }
    }

    if let Some(caps) = NUMBER_PREFIX_RE.captures(line) {
        return match caps.name("bare") {
            Some(m) => Line::Numbered {
                rest: m.as_str().trim(),
                bare: true,
            },
            None => Line::Numbered {
                rest: caps.name("rest").map_or("", |m| m.as_str().trim()),
                bare: false,
            },
        };
    }

    Line::Text(line)
}

/// Read the answer letter from the text after `Answer:`.
///
/// The letter may be followed by punctuation or more text after a
/// separator (`B) 4`, `b.`), but not by another letter or digit, so
/// `Bogus` or `E` are rejected.
fn answer_letter(rest: &str) -> Option<AnswerLetter> {
    let mut chars = rest.chars();
    let letter = AnswerLetter::from_char(chars.next()?)?;
    match chars.next() {
        Some(next) if next.is_alphanumeric() => None,
        _ => Some(letter),
    }
}

fn excerpt(line: &str) -> String {
    let line = line.trim();
    let cut = truncate_chars(line, FOUND_EXCERPT_CHARS);
    if cut.len() < line.len() {
        format!("{cut}...")
    } else {
        cut.to_string()
    }
}

enum State {
    Idle,
    /// Collecting question text. `numbered` is set once the block carries
    /// its own number prefix; from then on numbered lines belong to the text.
    Question {
        start: usize,
        lines: Vec<String>,
        numbered: bool,
    },
    /// At least one option marker has been seen; the last entry of
    /// `options` is the one currently being collected.
    Options {
        start: usize,
        lines: Vec<String>,
        options: Vec<String>,
    },
    /// `Answer:` had nothing after it; the letter is on a following line.
    AnswerPending {
        start: usize,
        lines: Vec<String>,
        options: Vec<String>,
    },
}

struct BlockParser {
    state: State,
    report: ParseReport,
    last_line: usize,
}

impl Default for BlockParser {
    fn default() -> Self {
        Self {
            state: State::Idle,
            report: ParseReport::default(),
            last_line: 0,
        }
    }
}

impl BlockParser {
    fn feed(&mut self, line_no: usize, raw: &str) {
        self.last_line = line_no;
        let line = classify(raw);
        let state = std::mem::replace(&mut self.state, State::Idle);

        self.state = match state {
            State::Idle => self.idle(line_no, line),

            State::Question {
                start,
                mut lines,
                numbered,
            } => match line {
                Line::Blank => State::Question {
                    start,
                    lines,
                    numbered,
                },
                Line::Text(text) => {
                    lines.push(text.to_string());
                    State::Question {
                        start,
                        lines,
                        numbered,
                    }
                }
                Line::Numbered { .. } if numbered => {
                    // A numbered list inside the question, kept verbatim.
                    lines.push(raw.trim().to_string());
                    State::Question {
                        start,
                        lines,
                        numbered,
                    }
                }
                Line::Numbered { rest, .. } => {
                    // Unnumbered text before a numbered question is preamble
                    // (titles, instructions); drop it.
                    tracing::debug!(line = line_no, "restarting question at numbered line");
                    State::Question {
                        start: line_no,
                        lines: vec![rest.to_string()],
                        numbered: true,
                    }
                }
                Line::Marker(AnswerLetter::A, rest) => State::Options {
                    start,
                    lines,
                    options: vec![rest.to_string()],
                },
                Line::Marker(..) | Line::Answer(_) => {
                    self.reject(
                        line_no,
                        start,
                        IssueKind::Unexpected {
                            expected: Expected::Option(AnswerLetter::A),
                            found: excerpt(raw),
                        },
                    );
                    State::Idle
                }
            },

            State::Options {
                start,
                lines,
                mut options,
            } => {
                let expected = match AnswerLetter::ALL.get(options.len()) {
                    Some(&letter) => Expected::Option(letter),
                    None => Expected::Answer,
                };
                match line {
                    Line::Blank => State::Options {
                        start,
                        lines,
                        options,
                    },
                    Line::Text(_) | Line::Numbered { bare: true, .. } => {
                        // Wrapped option text continues the current option.
                        if let Some(current) = options.last_mut() {
                            if !current.is_empty() {
                                current.push(' ');
                            }
                            current.push_str(raw.trim());
                        }
                        State::Options {
                            start,
                            lines,
                            options,
                        }
                    }
                    Line::Marker(letter, rest) if expected == Expected::Option(letter) => {
                        options.push(rest.to_string());
                        State::Options {
                            start,
                            lines,
                            options,
                        }
                    }
                    Line::Answer("") if expected == Expected::Answer => State::AnswerPending {
                        start,
                        lines,
                        options,
                    },
                    Line::Answer(rest) if expected == Expected::Answer => {
                        match answer_letter(rest) {
                            Some(correct) => self.accept(line_no, start, &lines, options, correct),
                            None => self.reject(
                                line_no,
                                start,
                                IssueKind::InvalidAnswer(excerpt(rest)),
                            ),
                        }
                        State::Idle
                    }
                    Line::Numbered { .. } => {
                        self.reject(
                            line_no,
                            start,
                            IssueKind::Unexpected {
                                expected,
                                found: excerpt(raw),
                            },
                        );
                        // The numbered line opens the next question.
                        self.idle(line_no, line)
                    }
                    Line::Marker(..) | Line::Answer(_) => {
                        self.reject(
                            line_no,
                            start,
                            IssueKind::Unexpected {
                                expected,
                                found: excerpt(raw),
                            },
                        );
                        State::Idle
                    }
                }
            }

            State::AnswerPending {
                start,
                lines,
                options,
            } => match line {
                Line::Blank => State::AnswerPending {
                    start,
                    lines,
                    options,
                },
                Line::Numbered { .. } => {
                    self.reject(line_no, start, IssueKind::InvalidAnswer(String::new()));
                    self.idle(line_no, line)
                }
                _ => {
                    let found = raw.trim();
                    match answer_letter(found) {
                        Some(correct) => self.accept(line_no, start, &lines, options, correct),
                        None => {
                            self.reject(line_no, start, IssueKind::InvalidAnswer(excerpt(found)))
                        }
                    }
                    State::Idle
                }
            },
        };
    }

    fn idle(&mut self, line_no: usize, line: Line<'_>) -> State {
        match line {
            Line::Text(text) => State::Question {
                start: line_no,
                lines: vec![text.to_string()],
                numbered: false,
            },
            Line::Numbered { rest, .. } => State::Question {
                start: line_no,
                lines: vec![rest.to_string()],
                numbered: true,
            },
            Line::Marker(..) | Line::Answer(_) => {
                // Leftovers of a block that was already rejected.
                tracing::trace!(line = line_no, "skipping stray option/answer line");
                State::Idle
            }
            Line::Blank => State::Idle,
        }
    }

    fn accept(
        &mut self,
        line_no: usize,
        start: usize,
        lines: &[String],
        options: Vec<String>,
        correct: AnswerLetter,
    ) {
        let text = normalize_whitespace(&lines.join("\n"));
        if text.is_empty() {
            self.reject(line_no, start, IssueKind::EmptyQuestion);
            return;
        }

        let options: Vec<String> = options.into_iter().map(|o| o.trim().to_string()).collect();
        if let Some(pos) = options.iter().position(|o| o.is_empty()) {
            self.reject(line_no, start, IssueKind::EmptyOption(AnswerLetter::ALL[pos]));
            return;
        }

        let Ok(options) = <[String; 4]>::try_from(options) else {
            // The state machine only reaches the answer line after four markers.
            self.reject(
                line_no,
                start,
                IssueKind::Incomplete {
                    expected: Expected::Option(AnswerLetter::D),
                },
            );
            return;
        };

        self.report.questions.push(Question {
            text,
            options,
            correct,
        });
    }

    fn reject(&mut self, line: usize, block_line: usize, kind: IssueKind) {
        let issue = BlockIssue {
            line,
            block_line,
            kind,
        };
        tracing::debug!(%issue, "rejected question block");
        self.report.issues.push(issue);
    }

    fn finish(mut self) -> ParseReport {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Options { start, options, .. } => {
                let expected = match AnswerLetter::ALL.get(options.len()) {
                    Some(&letter) => Expected::Option(letter),
                    None => Expected::Answer,
                };
                self.reject(self.last_line, start, IssueKind::Incomplete { expected });
            }
            State::AnswerPending { start, .. } => {
                self.reject(
                    self.last_line,
                    start,
                    IssueKind::Incomplete {
                        expected: Expected::Answer,
                    },
                );
            }
            // Trailing prose without any options is not a block.
            State::Idle | State::Question { .. } => {}
        }
        self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "1. What is 2+2?\nA) 3\nB) 4\nC) 5\nD) 6\nAnswer: B\n";

    fn block(n: usize, question: &str, answer: char) -> String {
        format!(
            "{n}. {question}\nA) first {n}\nB) second {n}\nC) third {n}\nD) fourth {n}\nAnswer: {answer}\n"
        )
    }

    #[test]
    fn parses_the_documented_example() {
        let questions = parse_questions(SAMPLE).unwrap();
        assert_eq!(
            questions,
            vec![Question {
                text: "What is 2+2?".into(),
                options: ["3".into(), "4".into(), "5".into(), "6".into()],
                correct: AnswerLetter::B,
            }]
        );
    }

    #[test]
    fn n_blocks_yield_n_questions_in_order() {
        let letters = ['A', 'B', 'C', 'D', 'b', 'a', 'd'];
        let text: String = letters
            .iter()
            .enumerate()
            .map(|(i, &l)| block(i + 1, &format!("Question number {}?", i + 1), l))
            .collect();

        let questions = parse_questions(&text).unwrap();
        assert_eq!(questions.len(), letters.len());
        for (i, q) in questions.iter().enumerate() {
            assert_eq!(q.text, format!("Question number {}?", i + 1));
            assert_eq!(q.options.len(), 4);
            assert_eq!(q.options[0], format!("first {}", i + 1));
            assert_eq!(
                q.correct,
                AnswerLetter::from_char(letters[i]).unwrap(),
                "letter is upper-cased"
            );
        }
    }

    #[test]
    fn question_text_spanning_lines_is_collapsed() {
        let text = "3.   Which of the following\n   best describes\tthe   borrow checker?\nA) a\nB) b\nC) c\nD) d\nCorrect: D";
        let questions = parse_questions(text).unwrap();
        assert_eq!(
            questions[0].text,
            "Which of the following best describes the borrow checker?"
        );
        assert_eq!(questions[0].correct, AnswerLetter::D);
    }

    #[test]
    fn options_are_trimmed_but_keep_inner_spacing() {
        let text = "1. Q?\nA)    left  pad   \nB) b\nC) c\nD) d\nAnswer: A";
        let questions = parse_questions(text).unwrap();
        assert_eq!(questions[0].options[0], "left  pad");
    }

    #[test]
    fn wrapped_option_lines_are_joined() {
        let text = "1. Q?\nA) a very long option that\nwraps onto a second line\nB) b\nC) c\nD) d\nAnswer: A";
        let questions = parse_questions(text).unwrap();
        assert_eq!(
            questions[0].options[0],
            "a very long option that wraps onto a second line"
        );
    }

    #[test]
    fn missing_option_d_does_not_match() {
        let text = "1. What is 2+2?\nA) 3\nB) 4\nC) 5\nAnswer: B\n";
        let report = parse_report(text);
        assert!(report.questions.is_empty());
        assert_eq!(report.issues.len(), 1);
        assert_eq!(
            report.issues[0].kind,
            IssueKind::Unexpected {
                expected: Expected::Option(AnswerLetter::D),
                found: "Answer: B".into(),
            }
        );
        assert_eq!(report.issues[0].line, 5);
        assert_eq!(report.issues[0].block_line, 1);
    }

    #[test]
    fn malformed_block_does_not_swallow_the_next_one() {
        let text = format!(
            "1. Broken\nA) 3\nB) 4\nC) 5\nAnswer: B\n{}",
            block(2, "Fine?", 'C')
        );
        let report = parse_report(&text);
        assert_eq!(report.questions.len(), 1);
        assert_eq!(report.questions[0].text, "Fine?");
        assert_eq!(report.issues.len(), 1);
    }

    #[test]
    fn answer_letter_outside_range_does_not_match() {
        let text = "1. What is 2+2?\nA) 3\nB) 4\nC) 5\nD) 6\nAnswer: E\n";
        let report = parse_report(text);
        assert!(report.questions.is_empty());
        assert_eq!(report.issues[0].kind, IssueKind::InvalidAnswer("E".into()));
    }

    #[test]
    fn answer_word_starting_with_valid_letter_does_not_match() {
        let text = "1. Q?\nA) a\nB) b\nC) c\nD) d\nAnswer: Bogus\n";
        assert!(parse_report(text).questions.is_empty());
    }

    #[test]
    fn answer_letter_may_be_followed_by_punctuation() {
        let text = "1. Q?\nA) a\nB) b\nC) c\nD) d\nAnswer: c) c\n";
        let questions = parse_questions(text).unwrap();
        assert_eq!(questions[0].correct, AnswerLetter::C);
    }

    #[test]
    fn answer_prefix_is_case_insensitive() {
        for prefix in ["answer:", "ANSWER:", "Correct:", "correct:"] {
            let text = format!("1. Q?\nA) a\nB) b\nC) c\nD) d\n{prefix} a\n");
            let questions = parse_questions(&text).unwrap();
            assert_eq!(questions[0].correct, AnswerLetter::A, "prefix {prefix}");
        }
    }

    #[test]
    fn option_markers_are_case_sensitive() {
        let text = "1. Q?\na) a\nb) b\nc) c\nd) d\nAnswer: A\n";
        let report = parse_report(text);
        assert!(report.questions.is_empty());
        assert!(matches!(
            report.issues[0].kind,
            IssueKind::Unexpected {
                expected: Expected::Option(AnswerLetter::A),
                ..
            }
        ));
    }

    #[test]
    fn numeric_prefix_is_optional() {
        let text = "What is 2+2?\nA) 3\nB) 4\nC) 5\nD) 6\nAnswer: B\n";
        let questions = parse_questions(text).unwrap();
        assert_eq!(questions[0].text, "What is 2+2?");
    }

    #[test]
    fn label_prefixes_are_stripped() {
        for prefix in ["Q1.", "q12:", "Question 4)", "7:"] {
            let text = format!("{prefix} Name it\nA) a\nB) b\nC) c\nD) d\nAnswer: D\n");
            let questions = parse_questions(&text).unwrap();
            assert_eq!(questions[0].text, "Name it", "prefix {prefix}");
        }
    }

    #[test]
    fn preamble_before_numbered_question_is_dropped() {
        let text = format!("Chapter 3 Review\nAnswer every question.\n{SAMPLE}");
        let questions = parse_questions(&text).unwrap();
        assert_eq!(questions[0].text, "What is 2+2?");
    }

    #[test]
    fn indented_lines_and_blank_lines_are_tolerated() {
        let text = "  1. What is 2+2?\n\n   A) 3\n   B) 4\n\n   C) 5\n   D) 6\n   Answer: B\n";
        assert_eq!(parse_questions(text).unwrap().len(), 1);
    }

    #[test]
    fn crlf_line_endings_are_handled() {
        let text = SAMPLE.replace('\n', "\r\n");
        assert_eq!(parse_questions(&text).unwrap()[0].options[3], "6");
    }

    #[test]
    fn block_split_across_pages_still_matches() {
        // Page text is joined with a newline by the extractor.
        let text = "1. What is 2+2?\nA) 3\nB) 4\n\nC) 5\nD) 6\nAnswer: B\n";
        assert_eq!(parse_questions(text).unwrap().len(), 1);
    }

    #[test]
    fn empty_question_text_is_rejected() {
        let text = "1.\nA) a\nB) b\nC) c\nD) d\nAnswer: A\n";
        let report = parse_report(text);
        assert!(report.questions.is_empty());
        assert_eq!(report.issues[0].kind, IssueKind::EmptyQuestion);
    }

    #[test]
    fn empty_option_is_rejected() {
        let text = "1. Q?\nA) a\nB)\nC) c\nD) d\nAnswer: A\n";
        let report = parse_report(text);
        assert_eq!(
            report.issues[0].kind,
            IssueKind::EmptyOption(AnswerLetter::B)
        );
    }

    #[test]
    fn truncated_block_at_end_of_text_is_reported() {
        let text = format!("{SAMPLE}2. Unfinished?\nA) x\nB) y\n");
        let report = parse_report(&text);
        assert_eq!(report.questions.len(), 1);
        assert_eq!(
            report.issues,
            vec![BlockIssue {
                line: 9,
                block_line: 7,
                kind: IssueKind::Incomplete {
                    expected: Expected::Option(AnswerLetter::C)
                },
            }]
        );
    }

    #[test]
    fn trailing_prose_is_not_an_issue() {
        let text = format!("{SAMPLE}Page 1 of 1\n");
        let report = parse_report(&text);
        assert_eq!(report.questions.len(), 1);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn numbered_line_before_answer_starts_next_question() {
        let text = format!("1. Missing answer\nA) a\nB) b\nC) c\nD) d\n{}", block(2, "Next?", 'A'));
        let report = parse_report(&text);
        assert_eq!(report.questions.len(), 1);
        assert_eq!(report.questions[0].text, "Next?");
        assert_eq!(
            report.issues[0].kind,
            IssueKind::Unexpected {
                expected: Expected::Answer,
                found: "2. Next?".into(),
            }
        );
    }

    #[test]
    fn empty_text_signals_no_questions() {
        let err = parse_questions("").unwrap_err();
        let ParseError::NoQuestions { issues } = &err;
        assert!(issues.is_empty());
        assert!(err.to_string().starts_with("No valid questions found"));
    }

    #[test]
    fn no_questions_message_lists_rejected_blocks() {
        let err = parse_questions("1. Q?\nA) a\nB) b\nC) c\nD) d\nAnswer: E\n").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Rejected blocks:"));
        assert!(msg.contains("line 6 (block starting at line 1)"));
        assert!(msg.contains("found `E`"));
    }

    #[test]
    fn classify_distinguishes_prefixes_from_arithmetic() {
        assert_eq!(classify("2+2 equals?"), Line::Text("2+2 equals?"));
        assert_eq!(classify("1.5 litres"), Line::Text("1.5 litres"));
        assert_eq!(classify("2 + 2"), Line::Text("2 + 2"));
        assert_eq!(
            classify("12) Rust?"),
            Line::Numbered {
                rest: "Rust?",
                bare: false
            }
        );
        assert_eq!(
            classify("3 Which one?"),
            Line::Numbered {
                rest: "Which one?",
                bare: true
            }
        );
        assert_eq!(classify("Answer:B"), Line::Answer("B"));
        assert_eq!(classify("C)x"), Line::Marker(AnswerLetter::C, "x"));
    }

    #[test]
    fn numbered_list_inside_question_is_kept() {
        let text = "1. Put the steps in order:\n1) boil water\n2) add tea\nWhich comes first?\nA) boil\nB) add\nC) stir\nD) pour\nAnswer: A\n";
        let report = parse_report(text);
        assert!(report.issues.is_empty());
        assert_eq!(report.questions.len(), 1);
        assert_eq!(
            report.questions[0].text,
            "Put the steps in order: 1) boil water 2) add tea Which comes first?"
        );
        assert_eq!(report.questions[0].correct_option(), "boil");
    }

    #[test]
    fn number_without_punctuation_is_a_prefix() {
        let text = "1 What is 2+2?\nA) 3\nB) 4\nC) 5\nD) 6\nAnswer: B\n";
        let questions = parse_questions(text).unwrap();
        assert_eq!(questions[0].text, "What is 2+2?");
        assert_eq!(questions[0].correct_option(), "4");
    }

    #[test]
    fn bare_number_in_wrapped_option_is_continuation() {
        let text = "1. Recipe?\nA) flour and\n2 cups of water\nB) b\nC) c\nD) d\nAnswer: A\n";
        let questions = parse_questions(text).unwrap();
        assert_eq!(questions[0].options[0], "flour and 2 cups of water");
    }

    #[test]
    fn answer_letter_on_following_line() {
        for gap in ["\n", "\n\n"] {
            let text = format!("1. What is 2+2?\nA) 3\nB) 4\nC) 5\nD) 6\nAnswer:{gap}B\n");
            let questions = parse_questions(&text).unwrap();
            assert_eq!(questions[0].correct, AnswerLetter::B, "gap {gap:?}");
        }
    }

    #[test]
    fn invalid_letter_on_following_line_is_rejected() {
        let text = "1. Q?\nA) a\nB) b\nC) c\nD) d\nCorrect:\nBogus\n";
        let report = parse_report(text);
        assert!(report.questions.is_empty());
        assert_eq!(report.issues[0].kind, IssueKind::InvalidAnswer("Bogus".into()));
        assert_eq!(report.issues[0].line, 7);
    }

    #[test]
    fn empty_answer_followed_by_next_question() {
        let text = format!("1. Q?\nA) a\nB) b\nC) c\nD) d\nAnswer:\n{}", block(2, "Next?", 'C'));
        let report = parse_report(&text);
        assert_eq!(report.questions.len(), 1);
        assert_eq!(report.questions[0].text, "Next?");
        assert_eq!(report.issues[0].kind, IssueKind::InvalidAnswer(String::new()));
        assert_eq!(report.issues[0].block_line, 1);
    }

    #[test]
    fn empty_answer_followed_by_unpunctuated_question() {
        let text = "1. Q?\nA) a\nB) b\nC) c\nD) d\nAnswer:\n2 Next?\nA) w\nB) x\nC) y\nD) z\nAnswer: D\n";
        let report = parse_report(text);
        assert_eq!(report.questions.len(), 1);
        assert_eq!(report.questions[0].text, "Next?");
        assert_eq!(report.issues.len(), 1);
    }

    #[test]
    fn empty_answer_at_end_of_text_is_incomplete() {
        let report = parse_report("1. Q?\nA) a\nB) b\nC) c\nD) d\nAnswer:\n");
        assert_eq!(
            report.issues,
            vec![BlockIssue {
                line: 6,
                block_line: 1,
                kind: IssueKind::Incomplete {
                    expected: Expected::Answer
                },
            }]
        );
    }
}
