//! Run configuration: YAML file, CLI overrides and environment.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::changes::category::CategoryTables;
use crate::changes::compare::CompareOptions;
use crate::changes::render::DEFAULT_CONTEXT_LINES;
use crate::ports::filesystem::FileSystem;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = ".prdiff.yaml";

/// Failures while loading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {}: {reason}", path.display())]
    Read {
        /// Config file path.
        path: PathBuf,
        /// Underlying error text.
        reason: String,
    },
    /// The file is not valid YAML for [`Config`].
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        /// Config file path.
        path: PathBuf,
        /// YAML error.
        source: serde_yaml::Error,
    },
}

/// Knobs that shape the generated report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Lines of context around each diff hunk.
    pub context_lines: usize,
    /// Embed the full text of new files.
    pub include_new_content: bool,
    /// New files larger than this are listed without content.
    pub max_new_content_bytes: u64,
    /// Directory names skipped while walking both trees.
    pub exclude_dirs: Vec<String>,
    /// Replacement categorization tables.
    pub categories: Option<CategoryTables>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            context_lines: DEFAULT_CONTEXT_LINES,
            include_new_content: true,
            max_new_content_bytes: 256 * 1024,
            exclude_dirs: vec![".git".to_string()],
            categories: None,
        }
    }
}

impl Config {
    /// Loads configuration.
    ///
    /// With `explicit` set, that file must exist. Otherwise
    /// [`DEFAULT_CONFIG_FILE`] under `cwd` is used when present, and defaults
    /// apply when it is not.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the chosen file cannot be read or parsed.
    pub fn load(
        fs: &dyn FileSystem,
        cwd: &Path,
        explicit: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = cwd.join(DEFAULT_CONFIG_FILE);
                if !fs.exists(&candidate) {
                    return Ok(Self::default());
                }
                candidate
            }
        };
        let text = fs
            .read_to_string(&path)
            .map_err(|e| ConfigError::Read { path: path.clone(), reason: e.to_string() })?;
        let config: Self = serde_yaml::from_str(&text)
            .map_err(|source| ConfigError::Parse { path: path.clone(), source })?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Applies command-line overrides.
    #[must_use]
    pub fn with_overrides(mut self, context_lines: Option<usize>, no_new_content: bool) -> Self {
        if let Some(lines) = context_lines {
            self.context_lines = lines;
        }
        if no_new_content {
            self.include_new_content = false;
        }
        self
    }

    /// Options for the tree comparison derived from this config.
    #[must_use]
    pub fn compare_options(&self) -> CompareOptions {
        CompareOptions {
            tables: self.categories.clone().unwrap_or_default(),
            exclude_dirs: self.exclude_dirs.clone(),
        }
    }
}

/// Secrets and paths read from the environment (and `.env`).
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// `GITHUB_TOKEN`.
    pub github_token: Option<String>,
    /// `GITHUB_API_URL`, API root for GitHub Enterprise.
    pub github_api_url: Option<String>,
    /// `AZURE_DEVOPS_PAT`.
    pub azure_pat: Option<String>,
    /// `PRDIFF_WORKDIR`, parent directory for checkouts.
    pub workdir: Option<PathBuf>,
}

impl Environment {
    /// Reads the process environment after loading `.env` if present.
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let var = |name: &str| env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            github_token: var("GITHUB_TOKEN"),
            github_api_url: var("GITHUB_API_URL"),
            azure_pat: var("AZURE_DEVOPS_PAT"),
            workdir: var("PRDIFF_WORKDIR").map(PathBuf::from),
        }
    }

    /// Directory under which per-run checkout workspaces are created.
    #[must_use]
    pub fn checkout_parent(&self) -> PathBuf {
        self.workdir.clone().unwrap_or_else(env::temp_dir)
    }
}
