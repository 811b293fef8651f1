use serde::Deserialize;
use std::io;
use std::path::PathBuf;
use std::process::Command;

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub journal: JournalConfig,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the chat service.
    pub base_url: String,
    /// Command to run to get the bearer token (e.g., "pass show walletagent").
    /// The command is run via `sh -c`.
    pub auth_token_cmd: Option<String>,
    /// User id sent with chat requests.
    pub user_id: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            auth_token_cmd: None,
            user_id: None,
        }
    }
}

impl ApiConfig {
    /// Resolve the bearer token from auth_token_cmd or WALLETAGENT_TOKEN.
    pub fn resolve_auth_token(&self) -> io::Result<String> {
        if let Some(cmd) = &self.auth_token_cmd {
            let output = Command::new("sh").arg("-c").arg(cmd).output()?;

            if output.status.success() {
                let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !token.is_empty() {
                    return Ok(token);
                }
            }
        }

        std::env::var("WALLETAGENT_TOKEN").map_err(|_| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "WALLETAGENT_TOKEN not set and no auth_token_cmd configured",
            )
        })
    }

    /// Resolve the user id from config or WALLETAGENT_USER.
    pub fn resolve_user_id(&self) -> io::Result<String> {
        if let Some(id) = &self.user_id {
            if !id.is_empty() {
                return Ok(id.clone());
            }
        }

        std::env::var("WALLETAGENT_USER").map_err(|_| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "WALLETAGENT_USER not set and no user_id configured",
            )
        })
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct JournalConfig {
    /// Enable chat journaling.
    pub enabled: bool,
    /// Custom sessions directory. Defaults to ~/.local/share/walletagent/sessions/.
    pub sessions_dir: Option<String>,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sessions_dir: None,
        }
    }
}

impl JournalConfig {
    /// Resolve the sessions directory, using the configured path or the XDG default.
    pub fn resolve_sessions_dir(&self) -> PathBuf {
        if let Some(ref custom) = self.sessions_dir {
            return PathBuf::from(custom);
        }

        let base = std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".local").join("share")
            });
        base.join("walletagent").join("sessions")
    }
}

impl Config {
    pub fn load_or_default() -> Self {
        let path = config_path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "failed to parse config, using defaults");
                Config::default()
            }),
            Err(_) => Config::default(),
        }
    }
}

fn config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("walletagent").join("config.toml")
}
