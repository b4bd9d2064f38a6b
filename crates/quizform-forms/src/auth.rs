//! OAuth session for the forms service.
//!
//! [`Authenticator`] is an explicitly owned session: it acquires a bearer
//! token the first time one is needed and keeps it for its own lifetime.
//! There is no refresh; a new process (or a new `Authenticator`) starts over.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;

use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge,
    RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use serde::Deserialize;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{OnceCell, oneshot};

use crate::FORMS_SCOPE;

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const REDIRECT_DONE_HTML: &str = "<html><body>The authentication flow has completed. \
You may close this window.</body></html>";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error(
        "Missing credentials file {}. Download the OAuth client secrets (Desktop app) \
         from the Google Cloud console and save them at that path.",
        .0.display()
    )]
    MissingCredentials(PathBuf),
    #[error("invalid client secrets file {}: {reason}", .path.display())]
    InvalidSecrets { path: PathBuf, reason: String },
    #[error("Google API access denied. Add your email to Test Users in OAuth consent screen.")]
    AccessDenied,
    #[error("authorization flow failed: {0}")]
    Flow(String),
    #[error("IO error during authorization: {0}")]
    Io(#[from] std::io::Error),
}

/// OAuth client configuration as downloaded from the cloud console.
#[derive(Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl fmt::Debug for ClientSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSecrets")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("auth_uri", &self.auth_uri)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

/// The file wraps the secrets in an `installed` (desktop) or `web` section.
#[derive(Deserialize)]
struct SecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    pub fn load(path: &Path) -> Result<Self, AuthError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AuthError::MissingCredentials(path.to_path_buf()));
            }
            Err(e) => return Err(AuthError::Io(e)),
        };
        Self::parse(&content).map_err(|reason| AuthError::InvalidSecrets {
            path: path.to_path_buf(),
            reason,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        let file: SecretsFile = serde_json::from_str(content).map_err(|e| e.to_string())?;
        file.installed
            .or(file.web)
            .ok_or_else(|| "expected an `installed` or `web` section".to_string())
    }
}

/// Where an [`Authenticator`] gets its bearer token from.
#[derive(Clone)]
pub enum TokenSource {
    /// A token issued out of band (config, environment, tests).
    Static(String),
    /// Interactive authorization-code flow with a loopback redirect.
    InstalledFlow { secrets_path: PathBuf },
}

impl fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(_) => f.write_str("Static(***)"),
            Self::InstalledFlow { secrets_path } => f
                .debug_struct("InstalledFlow")
                .field("secrets_path", secrets_path)
                .finish(),
        }
    }
}

/// Lazily-initialised bearer credential, shared by reference.
#[derive(Debug)]
pub struct Authenticator {
    source: TokenSource,
    token: OnceCell<String>,
}

impl Authenticator {
    pub fn new(source: TokenSource) -> Self {
        Self {
            source,
            token: OnceCell::new(),
        }
    }

    pub fn with_static_token(token: impl Into<String>) -> Self {
        Self::new(TokenSource::Static(token.into()))
    }

    pub fn installed_flow(secrets_path: impl Into<PathBuf>) -> Self {
        Self::new(TokenSource::InstalledFlow {
            secrets_path: secrets_path.into(),
        })
    }

    /// Check that a token can be obtained without running the flow: the
    /// secrets file must exist and parse.
    pub fn preflight(&self) -> Result<(), AuthError> {
        match &self.source {
            TokenSource::Static(_) => Ok(()),
            TokenSource::InstalledFlow { secrets_path } => {
                ClientSecrets::load(secrets_path).map(|_| ())
            }
        }
    }

    /// Return the cached token, acquiring it on first use.
    ///
    /// Concurrent callers wait for a single acquisition. A failed attempt
    /// leaves nothing cached, so the next call tries again.
    pub async fn access_token(&self) -> Result<&str, AuthError> {
        let token = self.token.get_or_try_init(|| self.acquire()).await?;
        Ok(token.as_str())
    }

    async fn acquire(&self) -> Result<String, AuthError> {
        match &self.source {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::InstalledFlow { secrets_path } => {
                tracing::info!(path = %secrets_path.display(), "initializing Google API credentials");
                let secrets = ClientSecrets::load(secrets_path)?;
                let token = run_installed_flow(&secrets, &[FORMS_SCOPE]).await?;
                tracing::info!("credentials obtained successfully");
                Ok(token)
            }
        }
    }
}

/// Run the authorization-code flow with a loopback redirect on an
/// ephemeral port and return the access token.
async fn run_installed_flow(secrets: &ClientSecrets, scopes: &[&str]) -> Result<String, AuthError> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();

    let client = BasicClient::new(
        ClientId::new(secrets.client_id.clone()),
        Some(ClientSecret::new(secrets.client_secret.clone())),
        AuthUrl::new(secrets.auth_uri.clone())
            .map_err(|e| AuthError::Flow(format!("invalid auth URI: {e}")))?,
        Some(
            TokenUrl::new(secrets.token_uri.clone())
                .map_err(|e| AuthError::Flow(format!("invalid token URI: {e}")))?,
        ),
    )
    .set_redirect_uri(
        RedirectUrl::new(format!("http://127.0.0.1:{port}/"))
            .map_err(|e| AuthError::Flow(format!("invalid redirect URI: {e}")))?,
    );

    let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
    let (auth_url, csrf_token) = client
        .authorize_url(CsrfToken::new_random)
        .add_scopes(scopes.iter().map(|s| Scope::new(s.to_string())))
        .set_pkce_challenge(pkce_challenge)
        .url();

    tracing::info!(%auth_url, "waiting for browser authorization");
    eprintln!("Please visit this URL to authorize this application:\n{auth_url}");

    let code = receive_redirect(listener)
        .await?
        .into_code(csrf_token.secret())?;

    let token = client
        .exchange_code(AuthorizationCode::new(code))
        .set_pkce_verifier(pkce_verifier)
        .request_async(async_http_client)
        .await
        .map_err(|e| AuthError::Flow(format!("token exchange failed: {e}")))?;

    Ok(token.access_token().secret().clone())
}

/// Query parameters delivered to the loopback redirect.
#[derive(Debug, Default, PartialEq, Eq, Deserialize)]
struct RedirectParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

impl RedirectParams {
    fn into_code(self, expected_state: &str) -> Result<String, AuthError> {
        if let Some(error) = self.error {
            if error.eq_ignore_ascii_case("access_denied") {
                return Err(AuthError::AccessDenied);
            }
            return Err(AuthError::Flow(format!("authorization server returned `{error}`")));
        }
        if self.state.as_deref() != Some(expected_state) {
            return Err(AuthError::Flow("state parameter mismatch".into()));
        }
        self.code
            .ok_or_else(|| AuthError::Flow("redirect carried no authorization code".into()))
    }
}

/// Sender half for the first redirect that carries a code or an error.
type RedirectSlot = Arc<Mutex<Option<oneshot::Sender<RedirectParams>>>>;

async fn handle_redirect(
    State(slot): State<RedirectSlot>,
    Query(params): Query<RedirectParams>,
) -> Response {
    if params.code.is_none() && params.error.is_none() {
        return (StatusCode::BAD_REQUEST, "missing authorization code").into_response();
    }
    let sender = slot.lock().ok().and_then(|mut guard| guard.take());
    if let Some(sender) = sender {
        let _ = sender.send(params);
    }
    Html(REDIRECT_DONE_HTML).into_response()
}

/// Serve the loopback redirect on `listener` until the browser delivers
/// the authorization response, then shut the server down.
async fn receive_redirect(listener: TcpListener) -> Result<RedirectParams, AuthError> {
    let (params_tx, params_rx) = oneshot::channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let slot: RedirectSlot = Arc::new(Mutex::new(Some(params_tx)));
    let app = Router::new()
        .route("/", get(handle_redirect))
        .with_state(slot);

    tokio::spawn(async move {
        let shutdown = async {
            shutdown_rx.await.ok();
        };
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
        {
            tracing::warn!(error = %e, "loopback redirect server failed");
        }
    });

    let params = params_rx
        .await
        .map_err(|_| AuthError::Flow("redirect listener stopped before authorization".into()));
    let _ = shutdown_tx.send(());
    params
}
