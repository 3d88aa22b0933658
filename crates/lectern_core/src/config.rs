//! Runtime configuration for the core.
//!
//! # Responsibility
//! - Hold every tunable the services and bootstrap code read.
//! - Load overrides from `LECTERN_*` environment variables.
//!
//! # Invariants
//! - Page limits are at least 1.
//! - Code length bounds satisfy `code_min_chars <= code_max_chars`.

use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DATABASE_PATH: &str = "LECTERN_DATABASE_PATH";
pub const ENV_LOG_LEVEL: &str = "LECTERN_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "LECTERN_LOG_DIR";
pub const ENV_DELETE_POLICY: &str = "LECTERN_DELETE_POLICY";
pub const ENV_MAX_PAGE_LIMIT: &str = "LECTERN_MAX_PAGE_LIMIT";

const DEFAULT_DATABASE_FILE: &str = "lectern.sqlite3";

/// What happens to descendants when a parent record is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletePolicy {
    /// Reject deleting a record that still has children.
    #[default]
    Restrict,
    /// Delete the record and its whole subtree in one transaction.
    Cascade,
}

impl DeletePolicy {
    pub fn parse(value: &str) -> Option<DeletePolicy> {
        match value.trim().to_ascii_lowercase().as_str() {
            "restrict" => Some(Self::Restrict),
            "cascade" => Some(Self::Cascade),
            _ => None,
        }
    }
}

/// Page size defaults used by list operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingDefaults {
    pub collection_default_limit: u32,
    /// Default for units, subunits and leaves.
    pub child_default_limit: u32,
    /// Oversized requested limits are clamped to this value when set.
    pub max_page_limit: Option<u32>,
}

impl Default for PagingDefaults {
    fn default() -> Self {
        Self {
            collection_default_limit: 20,
            child_default_limit: 50,
            max_page_limit: Some(100),
        }
    }
}

/// Field-level bounds enforced by boundary input validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputLimits {
    pub code_min_chars: usize,
    pub code_max_chars: usize,
    pub name_max_chars: usize,
    pub unit_ordinal_max: u32,
    pub leaf_text_max_chars: usize,
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            code_min_chars: 2,
            code_max_chars: 10,
            name_max_chars: 200,
            unit_ordinal_max: 66,
            leaf_text_max_chars: 1000,
        }
    }
}

/// Main configuration for one core instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite database file.
    pub database_path: PathBuf,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Rolling log file directory; logs go to stderr when unset.
    pub log_dir: Option<PathBuf>,
    pub delete_policy: DeletePolicy,
    pub paging: PagingDefaults,
    pub limits: InputLimits,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_FILE),
            log_level: default_log_level().to_string(),
            log_dir: None,
            delete_policy: DeletePolicy::default(),
            paging: PagingDefaults::default(),
            limits: InputLimits::default(),
        }
    }
}

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue {
                key,
                value,
                expected,
            } => write!(f, "invalid value `{value}` for {key}; expected {expected}"),
        }
    }
}

impl Error for ConfigError {}

impl CoreConfig {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Builds a config from defaults overridden by `LECTERN_*` variables.
    pub fn from_env() -> Result<CoreConfig, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from defaults overridden by values from `lookup`.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<CoreConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = CoreConfig::default();

        if let Some(path) = get(ENV_DATABASE_PATH) {
            config.database_path = PathBuf::from(path);
        }
        if let Some(level) = get(ENV_LOG_LEVEL) {
            let normalized = normalize_level(&level).map_err(|_| ConfigError::InvalidValue {
                key: ENV_LOG_LEVEL,
                value: level.clone(),
                expected: "trace|debug|info|warn|error",
            })?;
            config.log_level = normalized.to_string();
        }
        if let Some(dir) = get(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(policy) = get(ENV_DELETE_POLICY) {
            config.delete_policy =
                DeletePolicy::parse(&policy).ok_or(ConfigError::InvalidValue {
                    key: ENV_DELETE_POLICY,
                    value: policy.clone(),
                    expected: "restrict|cascade",
                })?;
        }
        if let Some(max) = get(ENV_MAX_PAGE_LIMIT) {
            let parsed = max
                .parse::<u32>()
                .ok()
                .filter(|value| *value >= 1)
                .ok_or(ConfigError::InvalidValue {
                    key: ENV_MAX_PAGE_LIMIT,
                    value: max.clone(),
                    expected: "a positive integer",
                })?;
            config.paging.max_page_limit = Some(parsed);
        }

        Ok(config)
    }
}

/// Builder for `CoreConfig`.
#[derive(Default)]
pub struct ConfigBuilder {
    config: CoreConfig,
}

impl ConfigBuilder {
    pub fn database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.database_path = path.into();
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.log_level = level.into();
        self
    }

    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.log_dir = Some(dir.into());
        self
    }

    pub fn delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.config.delete_policy = policy;
        self
    }

    pub fn paging(mut self, paging: PagingDefaults) -> Self {
        self.config.paging = paging;
        self
    }

    /// Removes the upper clamp on requested page limits.
    pub fn unbounded_page_limit(mut self) -> Self {
        self.config.paging.max_page_limit = None;
        self
    }

    pub fn limits(mut self, limits: InputLimits) -> Self {
        self.config.limits = limits;
        self
    }

    pub fn build(self) -> CoreConfig {
        self.config
    }
}
