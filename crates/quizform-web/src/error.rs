use axum::http::StatusCode;
use thiserror::Error;

use quizform_core::{BackendError, ParseError, truncate_chars};
use quizform_forms::{ApiError, AuthError, QuizError};

/// How much extracted text is echoed back when processing fails.
pub const DIAGNOSTIC_TEXT_CHARS: usize = 1000;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("{0}")]
    Upload(String),
    #[error("could not store upload: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Extraction(#[from] BackendError),
    #[error("extraction task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
}

impl ProcessError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Upload(_) => StatusCode::BAD_REQUEST,
            Self::Io(_) | Self::Extraction(_) | Self::Join(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Parse(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Quiz(e) => match e.api_error() {
                None => StatusCode::UNPROCESSABLE_ENTITY,
                Some(ApiError::Auth(
                    AuthError::MissingCredentials(_)
                    | AuthError::InvalidSecrets { .. }
                    | AuthError::Io(_),
                )) => StatusCode::INTERNAL_SERVER_ERROR,
                Some(_) => StatusCode::BAD_GATEWAY,
            },
        }
    }
}

/// A failed request, with whatever text was extracted before it failed.
#[derive(Debug)]
pub struct Failure {
    pub error: ProcessError,
    pub extracted_text: Option<String>,
}

impl Failure {
    pub fn with_text(error: impl Into<ProcessError>, text: String) -> Self {
        Self {
            error: error.into(),
            extracted_text: Some(text),
        }
    }

    /// The message shown on the upload page.
    pub fn message(&self) -> String {
        if let ProcessError::Upload(msg) = &self.error {
            return msg.clone();
        }
        let mut msg = format!("Error processing PDF: {}", self.error);
        if let Some(text) = self.extracted_text.as_deref().filter(|t| !t.is_empty()) {
            msg.push_str("\nExtracted text was:\n");
            msg.push_str(truncate_chars(text, DIAGNOSTIC_TEXT_CHARS));
            msg.push_str("...");
        }
        msg
    }
}

impl From<ProcessError> for Failure {
    fn from(error: ProcessError) -> Self {
        Self {
            error,
            extracted_text: None,
        }
    }
}
