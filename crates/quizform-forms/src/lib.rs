//! Create graded Google Forms quizzes from parsed questions.
//!
//! The remote service is reached through the [`FormsApi`] trait. The real
//! implementation is [`FormsClient`], which owns an [`Authenticator`]
//! session; tests substitute `mock::MockForms` (feature `mock`).

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

pub mod auth;
pub mod builder;
pub mod client;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod model;

pub use auth::{AuthError, Authenticator, ClientSecrets, TokenSource};
pub use builder::{QuizError, QuizForm, build_quiz, edit_url};
pub use client::FormsClient;
pub use model::{BatchUpdateFormRequest, Form, NewForm, Request};

/// OAuth scope needed to create and edit forms.
pub const FORMS_SCOPE: &str = "https://www.googleapis.com/auth/forms.body";

/// Boxed future returned by [`FormsApi`] methods.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("response did not include a formId")]
    MissingFormId,
}

/// The two RPCs the quiz builder needs from the forms service.
pub trait FormsApi: Send + Sync {
    /// `forms.create`: returns the created form, including its `formId`.
    fn create_form<'a>(&'a self, form: &'a NewForm) -> ApiFuture<'a, Form>;

    /// `forms.batchUpdate`: applies all `requests` atomically.
    fn batch_update<'a>(
        &'a self,
        form_id: &'a str,
        request: &'a BatchUpdateFormRequest,
    ) -> ApiFuture<'a, ()>;
}
