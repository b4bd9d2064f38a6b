//! End-to-end parsing of text shaped like real PDF extraction output,
//! plus loading settings from config files on disk.

use std::time::Duration;

use quizform_core::config_file::{self, Settings};
use quizform_core::{AnswerLetter, IssueKind, ParseError, parse_questions, parse_report};

/// Two pages as the extractor emits them: a header line, numbered
/// questions, a wrapped question and a page break inside the document.
const WORKSHEET: &str = "\
Biology 101 - Week 3 Quiz
Answer every question.

1. Which organelle produces most of the
   cell's ATP?
A) Nucleus
B) Mitochondrion
C) Ribosome
D) Golgi apparatus
Answer: B

Q2) Which molecule carries amino acids to the ribosome?
A) mRNA
B) rRNA
C) tRNA
D) DNA
Correct: C
Page 1 of 2
Question 3: Osmosis is the movement of
A) solutes
B) water
C) ions
D) proteins
answer: b
";

#[test]
fn worksheet_yields_all_questions_in_order() {
    let questions = parse_questions(WORKSHEET).unwrap();
    assert_eq!(questions.len(), 3);

    assert_eq!(
        questions[0].text,
        "Which organelle produces most of the cell's ATP?"
    );
    assert_eq!(questions[0].correct_option(), "Mitochondrion");

    assert_eq!(
        questions[1].text,
        "Which molecule carries amino acids to the ribosome?"
    );
    assert_eq!(questions[1].correct, AnswerLetter::C);
    assert_eq!(questions[1].correct_option(), "tRNA");

    assert_eq!(questions[2].text, "Osmosis is the movement of");
    assert_eq!(questions[2].correct_option(), "water");
}

#[test]
fn malformed_blocks_do_not_hide_good_ones() {
    let text = "\
1. Missing an option
A) one
B) two
C) three
Answer: A
2. Bad answer letter
A) one
B) two
C) three
D) four
Answer: E
3. Good question
A) yes
B) no
C) maybe
D) later
Answer: D
";
    let report = parse_report(text);
    assert_eq!(report.questions.len(), 1);
    assert_eq!(report.questions[0].text, "Good question");
    assert_eq!(report.questions[0].correct, AnswerLetter::D);

    assert_eq!(report.issues.len(), 2);
    assert_eq!(report.issues[0].block_line, 1);
    assert_eq!(report.issues[1].block_line, 6);
    assert!(matches!(report.issues[1].kind, IssueKind::InvalidAnswer(_)));
}

#[test]
fn prose_only_document_reports_no_questions() {
    let err = parse_questions("Lecture notes\n\nNothing to see here.\n").unwrap_err();
    let ParseError::NoQuestions { issues } = &err;
    assert!(issues.is_empty());
    assert!(
        err.to_string()
            .starts_with("No valid questions found. Ensure PDF follows required format.")
    );
}

#[test]
fn settings_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[server]
addr = "127.0.0.1:8080"
body_limit_mb = 5

[forms]
credentials_path = "/etc/quizform/client_secret.json"
document_title = "Weekly Quiz"
timeout_secs = 10
"#,
    )
    .unwrap();

    let file = config_file::load_from_path(&path).unwrap();
    let settings = Settings::resolve_with(&file, |_| None);
    assert_eq!(settings.addr, "127.0.0.1:8080");
    assert_eq!(settings.body_limit_bytes, 5 * 1024 * 1024);
    assert_eq!(
        settings.credentials_path,
        std::path::PathBuf::from("/etc/quizform/client_secret.json")
    );
    assert_eq!(settings.document_title, "Weekly Quiz");
    assert_eq!(settings.timeout, Duration::from_secs(10));
    assert_eq!(settings.access_token, None);
    assert_eq!(settings.api_base_url, "https://forms.googleapis.com");
}

#[test]
fn unparsable_config_file_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[server\naddr = ").unwrap();
    assert!(config_file::load_from_path(&path).is_none());
    assert!(config_file::load_from_path(&dir.path().join("missing.toml")).is_none());
}
