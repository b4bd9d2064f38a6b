//! In-memory [`FormsApi`] for tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::model::{BatchUpdateFormRequest, Form, NewForm};
use crate::{ApiError, ApiFuture, FormsApi};

/// A recorded call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateForm(NewForm),
    BatchUpdate {
        form_id: String,
        request: BatchUpdateFormRequest,
    },
}

#[derive(Debug, Clone)]
struct Failure {
    call_index: usize,
    status: u16,
    message: String,
}

/// A hand-rolled fake implementing [`FormsApi`].
///
/// Every call is recorded in order. `create_form` always assigns the form
/// ID given to [`MockForms::new`]. One call, selected by its 0-based
/// position, can be made to fail with an HTTP status.
pub struct MockForms {
    form_id: String,
    calls: Mutex<Vec<Call>>,
    call_count: AtomicUsize,
    failure: Option<Failure>,
}

impl MockForms {
    pub fn new(form_id: impl Into<String>) -> Self {
        Self {
            form_id: form_id.into(),
            calls: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
            failure: None,
        }
    }

    /// Make the call at position `call_index` fail with `status`.
    pub fn failing_at(mut self, call_index: usize, status: u16, message: &str) -> Self {
        self.failure = Some(Failure {
            call_index,
            status,
            message: message.to_string(),
        });
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<(), ApiError> {
        let index = self.call_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(call);
        match &self.failure {
            Some(f) if f.call_index == index => Err(ApiError::Status {
                status: f.status,
                message: f.message.clone(),
            }),
            _ => Ok(()),
        }
    }
}

impl FormsApi for MockForms {
    fn create_form<'a>(&'a self, form: &'a NewForm) -> ApiFuture<'a, Form> {
        let result = self.record(Call::CreateForm(form.clone())).map(|()| Form {
            form_id: Some(self.form_id.clone()),
            responder_uri: None,
        });
        Box::pin(async move { result })
    }

    fn batch_update<'a>(
        &'a self,
        form_id: &'a str,
        request: &'a BatchUpdateFormRequest,
    ) -> ApiFuture<'a, ()> {
        let result = self.record(Call::BatchUpdate {
            form_id: form_id.to_string(),
            request: request.clone(),
        });
        Box::pin(async move { result })
    }
}
