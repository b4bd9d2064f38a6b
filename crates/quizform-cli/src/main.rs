use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use quizform_core::config_file::{self, Settings};
use quizform_core::{BlockIssue, ParseError, PdfBackend, Question, parse_report};
use quizform_forms::{FormsClient, build_quiz};
use quizform_pdf_mupdf::MupdfBackend;

mod output;

use output::ColorMode;

/// Quizform - Turn multiple-choice question PDFs into graded Google Forms quizzes
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a PDF and create a quiz form from its questions
    Generate {
        /// Path to the PDF with numbered questions
        pdf: PathBuf,

        /// Path to the OAuth client secrets file
        #[arg(long)]
        credentials: Option<PathBuf>,

        /// Pre-obtained OAuth access token (skips the browser flow)
        #[arg(long)]
        access_token: Option<String>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Extract and parse a PDF without contacting Google
    Parse {
        /// Path to the PDF with numbered questions
        pdf: PathBuf,

        /// Print questions and skipped blocks as JSON
        #[arg(long)]
        json: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Generate {
            pdf,
            credentials,
            access_token,
            no_color,
        } => generate(pdf, credentials, access_token, color_mode(no_color)).await,
        Command::Parse {
            pdf,
            json,
            no_color,
        } => parse(pdf, json, color_mode(no_color)).await,
    }
}

fn color_mode(no_color: bool) -> ColorMode {
    ColorMode(!no_color && std::io::stdout().is_terminal())
}

async fn generate(
    pdf: PathBuf,
    credentials: Option<PathBuf>,
    access_token: Option<String>,
    color: ColorMode,
) -> anyhow::Result<()> {
    let mut settings = Settings::resolve(&config_file::load_config());
    if let Some(path) = credentials {
        settings.credentials_path = path;
    }
    if let Some(token) = access_token.filter(|t| !t.trim().is_empty()) {
        settings.access_token = Some(token);
    }

    let text = extract_text(&pdf).await?;
    let report = parse_report(&text);

    let mut stderr = std::io::stderr();
    output::print_issues(&mut stderr, &report.issues, color)?;
    if report.questions.is_empty() {
        return Err(ParseError::NoQuestions {
            issues: report.issues,
        }
        .into());
    }

    let client = FormsClient::from_settings(&settings)?;
    client.authenticator().preflight()?;
    let quiz = build_quiz(&client, &report.questions, &settings.document_title).await?;

    let mut stdout = std::io::stdout();
    output::print_quiz(&mut stdout, &quiz, report.questions.len(), color)?;
    stdout.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    questions: &'a [Question],
    skipped: Vec<JsonIssue>,
}

#[derive(Serialize)]
struct JsonIssue {
    line: usize,
    block_line: usize,
    message: String,
}

impl From<&BlockIssue> for JsonIssue {
    fn from(issue: &BlockIssue) -> Self {
        Self {
            line: issue.line,
            block_line: issue.block_line,
            message: issue.to_string(),
        }
    }
}

async fn parse(pdf: PathBuf, json: bool, color: ColorMode) -> anyhow::Result<()> {
    let text = extract_text(&pdf).await?;
    let report = parse_report(&text);

    let mut stdout = std::io::stdout();
    if json {
        let out = JsonReport {
            questions: &report.questions,
            skipped: report.issues.iter().map(JsonIssue::from).collect(),
        };
        serde_json::to_writer_pretty(&mut stdout, &out)?;
        writeln!(stdout)?;
    } else {
        output::print_questions(&mut stdout, &report.questions, color)?;
        output::print_issues(&mut stdout, &report.issues, color)?;
    }
    stdout.flush()?;

    if report.questions.is_empty() {
        return Err(ParseError::NoQuestions {
            issues: report.issues,
        }
        .into());
    }
    Ok(())
}

async fn extract_text(pdf: &Path) -> anyhow::Result<String> {
    let path = pdf.to_path_buf();
    let text = tokio::task::spawn_blocking(move || MupdfBackend::new().extract_text(&path))
        .await
        .context("extraction task failed")?
        .with_context(|| format!("failed to read {}", pdf.display()))?;
    tracing::debug!(
        text = quizform_core::truncate_chars(&text, 1000),
        "extracted text"
    );
    Ok(text)
}
