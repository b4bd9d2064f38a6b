use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_BODY_LIMIT_MB: u64 = 50;
pub const DEFAULT_CREDENTIALS_PATH: &str = "credentials.json";
pub const DEFAULT_API_BASE_URL: &str = "https://forms.googleapis.com";
pub const DEFAULT_DOCUMENT_TITLE: &str = "Generated Quiz";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub server: Option<ServerConfig>,
    pub forms: Option<FormsConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub addr: Option<String>,
    pub body_limit_mb: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormsConfig {
    /// OAuth client secrets JSON downloaded from the cloud console.
    pub credentials_path: Option<String>,
    /// Pre-issued bearer token; skips the interactive authorization flow.
    pub access_token: Option<String>,
    pub api_base_url: Option<String>,
    pub document_title: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Platform config directory path: `<config_dir>/quizform/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("quizform").join("config.toml"))
}

/// Load config by cascading CWD `.quizform.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".quizform.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let base_server = base.server.unwrap_or_default();
    let overlay_server = overlay.server.unwrap_or_default();
    let base_forms = base.forms.unwrap_or_default();
    let overlay_forms = overlay.forms.unwrap_or_default();

    ConfigFile {
        server: Some(ServerConfig {
            addr: overlay_server.addr.or(base_server.addr),
            body_limit_mb: overlay_server.body_limit_mb.or(base_server.body_limit_mb),
        }),
        forms: Some(FormsConfig {
            credentials_path: overlay_forms
                .credentials_path
                .or(base_forms.credentials_path),
            access_token: overlay_forms.access_token.or(base_forms.access_token),
            api_base_url: overlay_forms.api_base_url.or(base_forms.api_base_url),
            document_title: overlay_forms.document_title.or(base_forms.document_title),
            timeout_secs: overlay_forms.timeout_secs.or(base_forms.timeout_secs),
        }),
    }
}

/// Fully resolved runtime settings.
#[derive(Clone)]
pub struct Settings {
    pub addr: String,
    pub body_limit_bytes: usize,
    pub credentials_path: PathBuf,
    pub access_token: Option<String>,
    pub api_base_url: String,
    pub document_title: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("addr", &self.addr)
            .field("body_limit_bytes", &self.body_limit_bytes)
            .field("credentials_path", &self.credentials_path)
            .field("access_token", &self.access_token.as_ref().map(|_| "***"))
            .field("api_base_url", &self.api_base_url)
            .field("document_title", &self.document_title)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Settings {
    /// Resolve settings: environment > config file > defaults.
    pub fn resolve(file: &ConfigFile) -> Self {
        Self::resolve_with(file, |key| std::env::var(key).ok())
    }

    /// Like [`Settings::resolve`] but with an injectable environment lookup.
    pub fn resolve_with(file: &ConfigFile, env: impl Fn(&str) -> Option<String>) -> Self {
        let server = file.server.clone().unwrap_or_default();
        let forms = file.forms.clone().unwrap_or_default();

        let body_limit_mb = server.body_limit_mb.unwrap_or(DEFAULT_BODY_LIMIT_MB);
        let timeout_secs = env("QUIZFORM_TIMEOUT")
            .and_then(|v| v.parse().ok())
            .or(forms.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            addr: env("QUIZFORM_ADDR")
                .or(server.addr)
                .unwrap_or_else(|| DEFAULT_ADDR.to_string()),
            body_limit_bytes: (body_limit_mb as usize).saturating_mul(1024 * 1024),
            credentials_path: env("QUIZFORM_CREDENTIALS")
                .or(forms.credentials_path)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_PATH)),
            access_token: env("QUIZFORM_ACCESS_TOKEN")
                .or(forms.access_token)
                .filter(|t| !t.trim().is_empty()),
            api_base_url: env("QUIZFORM_API_BASE")
                .or(forms.api_base_url)
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            document_title: forms
                .document_title
                .unwrap_or_else(|| DEFAULT_DOCUMENT_TITLE.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn partial_toml_deserializes() {
        let toml_str = "[forms]\ncredentials_path = \"/etc/quizform/client.json\"\n";
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        assert!(parsed.server.is_none());
        let forms = parsed.forms.unwrap();
        assert_eq!(
            forms.credentials_path.as_deref(),
            Some("/etc/quizform/client.json")
        );
        assert!(forms.access_token.is_none());
    }

    #[test]
    fn merge_overlay_wins() {
        let base = ConfigFile {
            server: Some(ServerConfig {
                addr: Some("127.0.0.1:1".into()),
                body_limit_mb: Some(5),
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            server: Some(ServerConfig {
                addr: Some("127.0.0.1:2".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, overlay);
        let server = merged.server.unwrap();
        assert_eq!(server.addr.as_deref(), Some("127.0.0.1:2"));
        assert_eq!(server.body_limit_mb, Some(5), "base preserved when overlay absent");
    }

    #[test]
    fn defaults_apply_to_empty_config() {
        let settings = Settings::resolve_with(&ConfigFile::default(), no_env);
        assert_eq!(settings.addr, DEFAULT_ADDR);
        assert_eq!(settings.body_limit_bytes, 50 * 1024 * 1024);
        assert_eq!(settings.credentials_path, PathBuf::from("credentials.json"));
        assert_eq!(settings.api_base_url, "https://forms.googleapis.com");
        assert_eq!(settings.document_title, "Generated Quiz");
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert!(settings.access_token.is_none());
    }

    #[test]
    fn environment_overrides_file() {
        let file = ConfigFile {
            forms: Some(FormsConfig {
                credentials_path: Some("from-file.json".into()),
                access_token: Some("file-token".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let env: HashMap<&str, &str> = [
            ("QUIZFORM_CREDENTIALS", "from-env.json"),
            ("QUIZFORM_TIMEOUT", "5"),
        ]
        .into_iter()
        .collect();

        let settings =
            Settings::resolve_with(&file, |k| env.get(k).map(|v| v.to_string()));
        assert_eq!(settings.credentials_path, PathBuf::from("from-env.json"));
        assert_eq!(settings.access_token.as_deref(), Some("file-token"));
        assert_eq!(settings.timeout, Duration::from_secs(5));
    }

    #[test]
    fn blank_access_token_is_ignored() {
        let settings =
            Settings::resolve_with(&ConfigFile::default(), |k| {
                (k == "QUIZFORM_ACCESS_TOKEN").then(|| "   ".to_string())
            });
        assert!(settings.access_token.is_none());
    }

    #[test]
    fn debug_redacts_access_token() {
        let settings = Settings::resolve_with(&ConfigFile::default(), |k| {
            (k == "QUIZFORM_ACCESS_TOKEN").then(|| "ya29.secret".to_string())
        });
        let debug = format!("{settings:?}");
        assert!(!debug.contains("ya29.secret"));
        assert!(debug.contains("***"));
    }
}
