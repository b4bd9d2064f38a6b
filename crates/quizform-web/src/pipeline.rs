//! Per-request processing: store the upload, extract, parse, build.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::NamedTempFile;

use quizform_core::{PdfBackend, parse_questions, truncate_chars};
use quizform_forms::{QuizForm, build_quiz};

use crate::error::{DIAGNOSTIC_TEXT_CHARS, Failure, ProcessError};
use crate::state::AppState;
use crate::upload::UploadedPdf;

/// Turn one uploaded PDF into a quiz. The temporary copy of the upload is
/// removed before returning, whatever the outcome.
pub async fn process_upload(state: &AppState, upload: UploadedPdf) -> Result<QuizForm, Failure> {
    tracing::info!(
        filename = %upload.filename,
        bytes = upload.data.len(),
        "processing upload"
    );
    let temp = save_upload(&upload.data)?;

    let result = run(state, temp.path().to_path_buf()).await;

    if let Err(e) = temp.close() {
        tracing::warn!(error = %e, "could not delete temporary file");
    }
    result
}

fn save_upload(data: &[u8]) -> Result<NamedTempFile, ProcessError> {
    let mut temp = tempfile::Builder::new()
        .prefix("quizform-")
        .suffix(".pdf")
        .tempfile()?;
    temp.write_all(data)?;
    temp.flush()?;
    Ok(temp)
}

async fn run(state: &AppState, path: PathBuf) -> Result<QuizForm, Failure> {
    let text = extract_text_blocking(Arc::clone(&state.pdf), path).await?;
    tracing::debug!(
        text = truncate_chars(&text, DIAGNOSTIC_TEXT_CHARS),
        "extracted text"
    );

    let questions = match parse_questions(&text) {
        Ok(questions) => questions,
        Err(e) => return Err(Failure::with_text(e, text)),
    };

    build_quiz(state.forms.as_ref(), &questions, &state.document_title)
        .await
        .map_err(|e| Failure::with_text(e, text))
}

/// Run text extraction on the blocking pool.
async fn extract_text_blocking(
    pdf: Arc<dyn PdfBackend>,
    path: PathBuf,
) -> Result<String, ProcessError> {
    let text = tokio::task::spawn_blocking(move || pdf.extract_text(&path)).await??;
    Ok(text)
}
