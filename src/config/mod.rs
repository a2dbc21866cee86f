use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{GatorError, GatorResult};
use crate::sources::rss_atom::DEFAULT_USER_AGENT;

const CONFIG_FILE_NAME: &str = ".gatorconfig.json";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Persisted part of the configuration, stored as JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_user_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub file: ConfigFile,
    pub file_path: PathBuf,
    pub db_path: String,
    /// `None` disables the request timeout.
    pub fetch_timeout: Option<Duration>,
    pub user_agent: String,
    pub log_level: String,
}

impl Config {
    /// Get the directory where the executable is located
    fn exe_dir() -> Option<PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    fn default_file_path() -> PathBuf {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_FILE_NAME)
    }

    pub fn load() -> GatorResult<Self> {
        let exe_dir = Self::exe_dir();

        // Try to load .env from executable's directory first
        if let Some(ref dir) = exe_dir {
            let env_path = dir.join(".env");
            if env_path.exists() {
                dotenvy::from_path(&env_path).ok();
            }
        }
        // Fall back to current directory
        dotenvy::dotenv().ok();

        let file_path = std::env::var_os("GATOR_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_file_path);
        let file = Self::read_file(&file_path)?;

        let db_path = std::env::var("GATOR_DB_PATH")
            .ok()
            .or_else(|| file.db_url.clone())
            .unwrap_or_else(|| {
                exe_dir
                    .map(|d| d.join("gator.db").to_string_lossy().into_owned())
                    .unwrap_or_else(|| "./gator.db".to_string())
            });

        let fetch_timeout = match std::env::var("GATOR_FETCH_TIMEOUT") {
            Ok(raw) => parse_timeout(&raw)?,
            Err(_) => Some(Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS)),
        };

        let user_agent =
            std::env::var("GATOR_USER_AGENT").unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string());

        let log_level = std::env::var("GATOR_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            file,
            file_path,
            db_path,
            fetch_timeout,
            user_agent,
            log_level,
        })
    }

    /// A missing file is an empty configuration; a malformed one is an error.
    pub fn read_file(path: &Path) -> GatorResult<ConfigFile> {
        if !path.exists() {
            return Ok(ConfigFile::default());
        }

        let data = fs::read_to_string(path)?;
        serde_json::from_str(&data)
            .map_err(|e| GatorError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn save(&self) -> GatorResult<()> {
        let data = serde_json::to_string_pretty(&self.file)?;
        fs::write(&self.file_path, data)?;
        Ok(())
    }

    pub fn set_current_user(&mut self, name: &str) -> GatorResult<()> {
        self.file.current_user_name = Some(name.to_string());
        self.save()
    }

    pub fn current_user_name(&self) -> GatorResult<&str> {
        self.file
            .current_user_name
            .as_deref()
            .ok_or(GatorError::NotLoggedIn)
    }
}

/// Whole seconds; `0` means no timeout.
fn parse_timeout(raw: &str) -> GatorResult<Option<Duration>> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| GatorError::Config(format!("GATOR_FETCH_TIMEOUT must be seconds, got '{raw}'")))?;

    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}
