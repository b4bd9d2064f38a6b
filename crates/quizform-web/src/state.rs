use std::sync::Arc;

use quizform_core::PdfBackend;
use quizform_forms::FormsApi;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub forms: Arc<dyn FormsApi>,
    pub pdf: Arc<dyn PdfBackend>,
    /// Document title given to every created form.
    pub document_title: String,
}
