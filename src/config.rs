//! Configuration file handling
//!
//! A single TOML file holds credential profiles and tracked projects:
//!
//! ```toml
//! [profiles.default]
//! token_env = "GITHUB_TOKEN"
//!
//! [projects.php]
//! repo = "acme/php-images"
//! path = "work/php-images"
//! fork = "acme-bot"
//! source_files = ["versions.rb"]
//! components = ["8.1", "8.2", "8.3"]
//! probe_url = "https://www.php.net/distributions/php-{version}.tar.gz"
//! build_suffix = "date"
//! ```
//!
//! The file is read once per run. `ProjectSettings` is the resolved,
//! validated view handed to each component.

use crate::codec::{DEFAULT_VALUE_ID, DEFAULT_VERSION_VALUE};
use crate::error::ConfigError;
use crate::hosting::{RepositoryRef, DEFAULT_HOST};
use crate::probe::VERSION_PLACEHOLDER;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file name
pub const DEFAULT_CONFIG_FILE: &str = "autobump.toml";

/// Environment variable consulted for the token when a profile names none
pub const DEFAULT_TOKEN_ENV: &str = "GITHUB_TOKEN";

const DEFAULT_PROFILE: &str = "default";
const DEFAULT_BASE_BRANCH: &str = "main";
const DEFAULT_PREAMBLE: &str = "Update to";
const DEFAULT_BRANCH_PREFIX: &str = "bump/";

/// Build code appended to new versions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildSuffix {
    /// Write the bare version
    #[default]
    None,
    /// Append `-YYYYMMDD` of the run date
    Date,
}

impl BuildSuffix {
    /// Build code for a run on `date`
    pub fn code(&self, date: NaiveDate) -> Option<String> {
        match self {
            BuildSuffix::None => None,
            BuildSuffix::Date => Some(date.format("%Y%m%d").to_string()),
        }
    }
}

/// Credential profile as written in the file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Profile {
    pub token: Option<String>,
    pub token_env: Option<String>,
    /// GitHub Enterprise hostname
    pub host: Option<String>,
}

/// Project section as written in the file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectConfig {
    pub repo: Option<String>,
    pub path: Option<PathBuf>,
    pub fork: Option<String>,
    pub base_branch: Option<String>,
    #[serde(default)]
    pub source_files: Vec<PathBuf>,
    #[serde(default)]
    pub components: Vec<String>,
    pub probe_url: Option<String>,
    pub identifier: Option<String>,
    pub version_value: Option<String>,
    pub preamble: Option<String>,
    pub branch_prefix: Option<String>,
    #[serde(default)]
    pub build_suffix: BuildSuffix,
    pub remote_url: Option<String>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
}

/// Parsed configuration file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
    #[serde(default)]
    pub projects: BTreeMap<String, ProjectConfig>,
    /// Directory relative project paths resolve against
    #[serde(skip)]
    base_dir: PathBuf,
}

/// Resolved access credentials
#[derive(Clone)]
pub struct Credentials {
    pub token: String,
    pub host: Option<String>,
}

impl Credentials {
    /// Web host clone URLs live on
    pub fn web_host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"***")
            .field("host", &self.host)
            .finish()
    }
}

impl Config {
    /// Read and parse a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse(&text, path)?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    /// Parse config text; `origin` is only used in error messages
    pub fn parse(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::ParseError {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Resolve and validate one project
    pub fn project(&self, name: &str) -> Result<ProjectSettings, ConfigError> {
        let raw = self
            .projects
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProject {
                name: name.to_string(),
            })?;
        let key = |field: &str| format!("projects.{}.{}", name, field);

        let repo = raw
            .repo
            .as_deref()
            .ok_or_else(|| ConfigError::missing(key("repo")))?;
        let repo = RepositoryRef::parse(repo)?;

        let path = raw
            .path
            .as_ref()
            .ok_or_else(|| ConfigError::missing(key("path")))?;
        let path = if path.is_relative() {
            self.base_dir.join(path)
        } else {
            path.clone()
        };

        if raw.source_files.is_empty() {
            return Err(ConfigError::missing(key("source_files")));
        }

        for component in &raw.components {
            if !is_component(component) {
                return Err(ConfigError::InvalidValue {
                    key: key("components"),
                    value: component.clone(),
                    message: "expected 'major.minor'".to_string(),
                });
            }
        }

        if let Some(url) = &raw.probe_url {
            if !url.contains(VERSION_PLACEHOLDER) {
                return Err(ConfigError::InvalidValue {
                    key: key("probe_url"),
                    value: url.clone(),
                    message: format!("must contain {}", VERSION_PLACEHOLDER),
                });
            }
        }

        Ok(ProjectSettings {
            name: name.to_string(),
            repo,
            path,
            fork: raw.fork.clone(),
            base_branch: raw
                .base_branch
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_BRANCH.to_string()),
            source_files: raw.source_files.clone(),
            components: raw.components.clone(),
            probe_url: raw.probe_url.clone(),
            identifier: raw
                .identifier
                .clone()
                .unwrap_or_else(|| DEFAULT_VALUE_ID.to_string()),
            version_value: raw
                .version_value
                .clone()
                .unwrap_or_else(|| DEFAULT_VERSION_VALUE.to_string()),
            preamble: raw
                .preamble
                .clone()
                .unwrap_or_else(|| DEFAULT_PREAMBLE.to_string()),
            branch_prefix: raw
                .branch_prefix
                .clone()
                .unwrap_or_else(|| DEFAULT_BRANCH_PREFIX.to_string()),
            build_suffix: raw.build_suffix,
            remote_url: raw.remote_url.clone(),
            author_name: raw.author_name.clone(),
            author_email: raw.author_email.clone(),
        })
    }

    /// Resolve credentials from the process environment
    pub fn credentials(&self, profile: Option<&str>) -> Result<Credentials, ConfigError> {
        self.credentials_with(profile, |var| std::env::var(var).ok())
    }

    /// Resolve credentials with a custom environment lookup.
    ///
    /// A named profile must exist. Without a name the `default` profile is
    /// used when present, else an empty one (token from `GITHUB_TOKEN`).
    pub fn credentials_with(
        &self,
        profile: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Credentials, ConfigError> {
        let fallback = Profile::default();
        let (name, profile) = match profile {
            Some(name) => (
                name,
                self.profiles
                    .get(name)
                    .ok_or_else(|| ConfigError::UnknownProfile {
                        name: name.to_string(),
                    })?,
            ),
            None => (
                DEFAULT_PROFILE,
                self.profiles.get(DEFAULT_PROFILE).unwrap_or(&fallback),
            ),
        };

        let env_var = profile.token_env.as_deref().unwrap_or(DEFAULT_TOKEN_ENV);
        let token = profile
            .token
            .clone()
            .or_else(|| env(env_var))
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ConfigError::missing(format!("profiles.{}.token (or ${})", name, env_var)))?;

        Ok(Credentials {
            token,
            host: profile.host.clone(),
        })
    }
}

fn is_component(value: &str) -> bool {
    match value.split_once('.') {
        Some((major, minor)) => {
            !major.is_empty()
                && !minor.is_empty()
                && major.chars().all(|c| c.is_ascii_digit())
                && minor.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

/// Validated settings for one project
#[derive(Debug, Clone)]
pub struct ProjectSettings {
    pub name: String,
    pub repo: RepositoryRef,
    /// Local checkout directory
    pub path: PathBuf,
    /// Owner of the fork that receives pushes
    pub fork: Option<String>,
    pub base_branch: String,
    /// Tracked files, relative to the checkout
    pub source_files: Vec<PathBuf>,
    /// `major.minor` scopes to keep current
    pub components: Vec<String>,
    /// Existence template with a `{version}` placeholder
    pub probe_url: Option<String>,
    pub identifier: String,
    pub version_value: String,
    pub preamble: String,
    pub branch_prefix: String,
    pub build_suffix: BuildSuffix,
    pub remote_url: Option<String>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
}

impl ProjectSettings {
    /// Clone URL of the primary repository, without credentials
    pub fn clone_url(&self, host: &str) -> String {
        self.remote_url
            .clone()
            .unwrap_or_else(|| self.repo.clone_url(host))
    }

    /// Clone URL of the fork, without credentials
    pub fn fork_url(&self, host: &str) -> Option<String> {
        self.fork
            .as_ref()
            .map(|owner| RepositoryRef::new(owner, &self.repo.name).clone_url(host))
    }

    /// Probe template, required for upstream probing
    pub fn probe_template(&self) -> Result<&str, ConfigError> {
        self.probe_url
            .as_deref()
            .ok_or_else(|| ConfigError::missing(format!("projects.{}.probe_url", self.name)))
    }

    /// Components to probe, required for upstream probing
    pub fn tracked_components(&self) -> Result<&[String], ConfigError> {
        if self.components.is_empty() {
            return Err(ConfigError::missing(format!(
                "projects.{}.components",
                self.name
            )));
        }
        Ok(&self.components)
    }
}
