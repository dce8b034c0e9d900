use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_URL: &str = "https://sourcegraph.com";
pub const GRAPHQL_PATH: &str = "/.api/graphql";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub search: SearchSettings,
}

fn default_url() -> String {
    DEFAULT_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default)]
    pub token: Option<String>,
    /// Environment variable consulted for the access token before `SRC_ACCESS_TOKEN`.
    #[serde(default)]
    pub token_env: Option<String>,
    #[serde(default)]
    pub auth_scheme: AuthScheme,
    /// Refuse to search anonymously when no token can be found.
    #[serde(default)]
    pub require_auth: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            token: None,
            token_env: None,
            auth_scheme: AuthScheme::default(),
            require_auth: false,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    #[default]
    Token,
    Bearer,
}

impl std::fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthScheme::Token => write!(f, "token"),
            AuthScheme::Bearer => write!(f, "bearer"),
        }
    }
}

impl std::str::FromStr for AuthScheme {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "token" => Ok(AuthScheme::Token),
            "bearer" => Ok(AuthScheme::Bearer),
            _ => Err(format!("Unknown auth scheme: {s}. Use token or bearer.")),
        }
    }
}

/// Search syntax mode understood by the remote service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternType {
    #[default]
    Literal,
    Regexp,
    Structural,
}

impl PatternType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternType::Literal => "literal",
            PatternType::Regexp => "regexp",
            PatternType::Structural => "structural",
        }
    }
}

impl std::fmt::Display for PatternType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PatternType {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "literal" => Ok(PatternType::Literal),
            "regexp" | "regex" => Ok(PatternType::Regexp),
            "structural" => Ok(PatternType::Structural),
            _ => Err(format!(
                "Unknown pattern type: {s}. Use literal, regexp, or structural."
            )),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchSettings {
    #[serde(default)]
    pub pattern_type: PatternType,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub max_results: Option<usize>,
}

/// Where the search service lives and how to authenticate against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    uri: String,
    auth_token: Option<String>,
    auth_scheme: AuthScheme,
}

impl Location {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into().trim_end_matches('/').to_string(),
            auth_token: None,
            auth_scheme: AuthScheme::Token,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>, scheme: AuthScheme) -> Self {
        let token = token.into();
        self.auth_token = if token.is_empty() { None } else { Some(token) };
        self.auth_scheme = scheme;
        self
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn requires_auth(&self) -> bool {
        self.auth_token.is_some()
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn auth_scheme(&self) -> AuthScheme {
        self.auth_scheme
    }

    pub fn graphql_url(&self) -> String {
        format!("{}{GRAPHQL_PATH}", self.uri)
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sgsearch")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn ensure_dirs() -> Result<()> {
        std::fs::create_dir_all(Self::config_dir())?;
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        Self::ensure_dirs()?;
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    pub fn load_project(project_root: &Path) -> Result<Option<Self>> {
        let path = project_root.join(".sgsearch").join("config.toml");
        if path.exists() {
            let content =
                std::fs::read_to_string(&path).context("Failed to read project config")?;
            let config: Config =
                toml::from_str(&content).context("Failed to parse project config")?;
            tracing::debug!(path = %path.display(), "Loaded project config");
            Ok(Some(config))
        } else {
            Ok(None)
        }
    }

    pub fn merge(global: &Config, project: &Config) -> Config {
        let location = LocationConfig {
            url: if project.location.url != default_url() {
                project.location.url.clone()
            } else {
                global.location.url.clone()
            },
            token: project
                .location
                .token
                .clone()
                .or_else(|| global.location.token.clone()),
            token_env: project
                .location
                .token_env
                .clone()
                .or_else(|| global.location.token_env.clone()),
            auth_scheme: if project.location.auth_scheme != AuthScheme::default() {
                project.location.auth_scheme
            } else {
                global.location.auth_scheme
            },
            require_auth: project.location.require_auth || global.location.require_auth,
            timeout_secs: if project.location.timeout_secs != default_timeout_secs() {
                project.location.timeout_secs
            } else {
                global.location.timeout_secs
            },
        };

        let search = SearchSettings {
            pattern_type: if project.search.pattern_type != PatternType::default() {
                project.search.pattern_type
            } else {
                global.search.pattern_type
            },
            case_sensitive: project.search.case_sensitive || global.search.case_sensitive,
            max_results: project.search.max_results.or(global.search.max_results),
        };

        Config { location, search }
    }
}
