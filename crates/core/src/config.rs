use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::{BaseDirs, ProjectDirs};
use once_cell::sync::Lazy;
use serde::Deserialize;

static CONFIG_FILE_NAME: &str = "config.json";
static ENV_DATA_DIR: &str = "ORDO_DATA_DIR";
static ENV_BASE_URL: &str = "ORDO_API_BASE_URL";
static ENV_TOKEN: &str = "ORDO_TOKEN";

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(5_000);
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(200);

static PROJECT_DIRS: Lazy<Option<ProjectDirs>> =
    Lazy::new(|| ProjectDirs::from("dev", "ordo", "ordo"));

/// Values supplied on the command line; they win over everything else.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub base_url: Option<String>,
    pub token: Option<String>,
}

/// On-disk settings, all optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct FileConfig {
    api_base_url: Option<String>,
    request_timeout_ms: Option<u64>,
    debounce_ms: Option<u64>,
    token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    data_dir: PathBuf,
    api_base_url: String,
    request_timeout: Duration,
    debounce_window: Duration,
    token: Option<String>,
}

impl AppConfig {
    /// Construct [`AppConfig`] by resolving the data directory, reading its optional
    /// `config.json`, then layering environment variables and explicit overrides.
    pub fn discover(overrides: ConfigOverrides) -> Result<Self> {
        let data_dir = resolve_data_dir(overrides.data_dir.clone())?;
        if !data_dir.exists() {
            fs::create_dir_all(&data_dir).with_context(|| {
                format!("Failed to create data directory at {}", data_dir.display())
            })?;
        }

        let mut config = Self::from_data_dir(data_dir)?;
        if let Ok(base_url) = env::var(ENV_BASE_URL) {
            config.api_base_url = base_url;
        }
        if let Ok(token) = env::var(ENV_TOKEN) {
            config.token = Some(token);
        }
        Ok(config.with_overrides(overrides))
    }

    /// Construct [`AppConfig`] from a resolved data directory and its config file only.
    pub fn from_data_dir(data_dir: PathBuf) -> Result<Self> {
        let file = read_config_file(&data_dir.join(CONFIG_FILE_NAME))?;
        Ok(Self {
            api_base_url: file
                .api_base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            request_timeout: file
                .request_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            debounce_window: file
                .debounce_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_DEBOUNCE_WINDOW),
            token: file.token,
            data_dir,
        })
    }

    fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(base_url) = overrides.base_url {
            self.api_base_url = base_url;
        }
        if let Some(token) = overrides.token {
            self.token = Some(token);
        }
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn api_base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn debounce_window(&self) -> Duration {
        self.debounce_window
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|token| !token.is_empty())
    }
}

fn read_config_file(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

fn resolve_data_dir(data_dir_override: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = data_dir_override {
        return Ok(dir);
    }

    if let Ok(env_dir) = env::var(ENV_DATA_DIR) {
        return Ok(PathBuf::from(env_dir));
    }

    if cfg!(debug_assertions) {
        let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        let dev_dir = manifest_dir.join("..").join("..").join("tmp").join("dev-ordo");
        return Ok(dev_dir);
    }

    if let Some(project) = &*PROJECT_DIRS {
        return Ok(project.config_dir().to_path_buf());
    }

    if let Some(base) = BaseDirs::new() {
        return Ok(base.home_dir().join(".ordo"));
    }

    Ok(env::current_dir()?.join(".ordo"))
}
