use std::io::Write;

use owo_colors::OwoColorize;
use quizform_core::{AnswerLetter, BlockIssue, Question};
use quizform_forms::QuizForm;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print parsed questions with the correct option marked.
pub fn print_questions(
    w: &mut dyn Write,
    questions: &[Question],
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w, "Found {} questions", questions.len())?;
    writeln!(w)?;

    for (idx, q) in questions.iter().enumerate() {
        let heading = format!("{}. {}", idx + 1, q.text);
        if color.enabled() {
            writeln!(w, "{}", heading.bold())?;
        } else {
            writeln!(w, "{}", heading)?;
        }

        for letter in AnswerLetter::ALL {
            let line = format!("   {} {}", letter.marker(), q.options[letter.index()]);
            if letter != q.correct {
                writeln!(w, "{}", line)?;
            } else if color.enabled() {
                writeln!(w, "{}", format!("{line}  (correct)").green())?;
            } else {
                writeln!(w, "{line}  (correct)")?;
            }
        }
        writeln!(w)?;
    }
    Ok(())
}

/// Print blocks that looked like questions but were skipped.
pub fn print_issues(
    w: &mut dyn Write,
    issues: &[BlockIssue],
    color: ColorMode,
) -> std::io::Result<()> {
    if issues.is_empty() {
        return Ok(());
    }

    let header = format!("Skipped {} malformed block(s):", issues.len());
    if color.enabled() {
        writeln!(w, "{}", header.yellow())?;
    } else {
        writeln!(w, "{}", header)?;
    }
    for issue in issues {
        if color.enabled() {
            writeln!(w, "  {}", issue.to_string().dimmed())?;
        } else {
            writeln!(w, "  {}", issue)?;
        }
    }
    writeln!(w)?;
    Ok(())
}

/// Print the result of a successful quiz build.
pub fn print_quiz(
    w: &mut dyn Write,
    quiz: &QuizForm,
    question_count: usize,
    color: ColorMode,
) -> std::io::Result<()> {
    let summary = format!("Created quiz with {} questions", question_count);
    if color.enabled() {
        writeln!(w, "{}", summary.green().bold())?;
        writeln!(w, "Edit URL: {}", quiz.edit_url.cyan())?;
    } else {
        writeln!(w, "{}", summary)?;
        writeln!(w, "Edit URL: {}", quiz.edit_url)?;
    }
    if let Some(uri) = &quiz.responder_uri {
        writeln!(w, "Share URL: {}", uri)?;
    }
    Ok(())
}
