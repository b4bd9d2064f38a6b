use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Redirect, Response};

use crate::error::{Failure, ProcessError};
use crate::pipeline;
use crate::state::AppState;
use crate::template;
use crate::upload;

/// Handle an upload: build the quiz and redirect to its edit page, or
/// re-render the upload page with the error.
pub async fn generate(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let upload = match upload::parse_multipart(multipart).await {
        Ok(upload) => upload,
        Err(msg) => {
            tracing::warn!(reason = %msg, "rejected upload");
            return failure_page(Failure::from(ProcessError::Upload(msg)));
        }
    };

    match pipeline::process_upload(&state, upload).await {
        Ok(quiz) => {
            tracing::info!(form_id = %quiz.form_id, url = %quiz.edit_url, "quiz ready");
            Redirect::to(&quiz.edit_url).into_response()
        }
        Err(failure) => {
            tracing::error!(error = %failure.error, "failed to process PDF");
            failure_page(failure)
        }
    }
}

fn failure_page(failure: Failure) -> Response {
    let status = failure.error.status();
    (status, template::render_index(Some(&failure.message()))).into_response()
}
