use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use quizform_core::config_file::Settings;
use quizform_core::truncate_chars;

use crate::auth::{Authenticator, TokenSource};
use crate::model::{BatchUpdateFormRequest, Form, GoogleErrorBody, NewForm};
use crate::{ApiError, ApiFuture, FormsApi};

/// Longest raw (non-JSON) error body quoted in an [`ApiError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 300;

/// HTTP implementation of [`FormsApi`] against the Forms v1 REST endpoint.
pub struct FormsClient {
    http: reqwest::Client,
    auth: Arc<Authenticator>,
    base_url: String,
}

impl FormsClient {
    pub fn new(http: reqwest::Client, auth: Arc<Authenticator>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            auth,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build a client and its session from resolved settings. A configured
    /// access token takes precedence over the interactive flow.
    pub fn from_settings(settings: &Settings) -> Result<Self, ApiError> {
        let source = match &settings.access_token {
            Some(token) => TokenSource::Static(token.clone()),
            None => TokenSource::InstalledFlow {
                secrets_path: settings.credentials_path.clone(),
            },
        };
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;
        Ok(Self::new(
            http,
            Arc::new(Authenticator::new(source)),
            settings.api_base_url.clone(),
        ))
    }

    pub fn authenticator(&self) -> &Arc<Authenticator> {
        &self.auth
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let token = self.auth.access_token().await?;
        let resp = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        Ok(resp.json().await?)
    }
}

/// Pull the human-readable message out of a Google error envelope, falling
/// back to the (truncated) raw body.
fn error_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<GoogleErrorBody>(body) {
        let err = parsed.error;
        return match err.status {
            Some(status) if !err.message.is_empty() => format!("{status}: {}", err.message),
            Some(status) => status,
            None => err.message,
        };
    }
    let body = body.trim();
    if body.is_empty() {
        "empty response body".to_string()
    } else {
        truncate_chars(body, MAX_ERROR_BODY_CHARS).to_string()
    }
}

impl FormsApi for FormsClient {
    fn create_form<'a>(&'a self, form: &'a NewForm) -> ApiFuture<'a, Form> {
        Box::pin(async move {
            let url = format!("{}/v1/forms", self.base_url);
            let created: Form = self.post_json(&url, form).await?;
            if created.form_id.as_deref().is_none_or(str::is_empty) {
                return Err(ApiError::MissingFormId);
            }
            Ok(created)
        })
    }

    fn batch_update<'a>(
        &'a self,
        form_id: &'a str,
        request: &'a BatchUpdateFormRequest,
    ) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            let url = format!("{}/v1/forms/{}:batchUpdate", self.base_url, form_id);
            let _: serde_json::Value = self.post_json(&url, request).await?;
            Ok(())
        })
    }
}
