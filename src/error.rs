//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ConfigError: missing settings, bad config files, wrong repository bindings
//! - ProbeError: upstream version existence checks
//! - PatchError: reading and writing tracked files
//! - GitError: working-copy command failures
//! - HostingError: remote hosting API failures
//!
//! Every variant is fatal for the current run. Outcomes such as "nothing to
//! update" are reported through `UpdateDecision`, never through these types.

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Upstream probing errors
    #[error(transparent)]
    Probe(#[from] ProbeError),

    /// File patching errors
    #[error(transparent)]
    Patch(#[from] PatchError),

    /// Working copy (git) errors
    #[error(transparent)]
    Git(#[from] GitError),

    /// Remote hosting API errors
    #[error(transparent)]
    Hosting(#[from] HostingError),
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required setting is absent
    #[error("missing required setting '{key}'")]
    MissingSetting { key: String },

    /// Config file could not be read
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for our schema
    #[error("failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    /// Named project is not configured
    #[error("unknown project '{name}'")]
    UnknownProject { name: String },

    /// Named credential profile is not configured
    #[error("unknown profile '{name}'")]
    UnknownProfile { name: String },

    /// Local directory is bound to another repository.
    /// Both URLs must already be redacted.
    #[error("directory {path} is bound to {found}, expected {expected}")]
    RepositoryMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    /// Identifier template cannot be compiled
    #[error("invalid identifier pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A configured component has no version entry in any source file
    #[error("component '{component}' not found in tracked files")]
    UntrackedComponent { component: String },

    /// Invalid value for a setting
    #[error("invalid value '{value}' for '{key}': {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },
}

/// Errors related to upstream version probing
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The recorded current version does not exist upstream
    #[error("version {version} not available upstream at {location}")]
    UpstreamUnavailable { version: String, location: String },

    /// Version string has no numeric trailing segment to increment
    #[error("invalid version '{version}': last segment must be numeric")]
    InvalidVersion { version: String },

    /// Network request failed
    #[error("failed to probe {location}: {message}")]
    Network { location: String, message: String },

    /// Timeout
    #[error("timeout while probing {location}")]
    Timeout { location: String },
}

/// Errors related to patching tracked files
#[derive(Error, Debug)]
pub enum PatchError {
    /// Failed to read tracked file
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write tracked file
    #[error("failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to git execution
#[derive(Error, Debug)]
pub enum GitError {
    /// git exited non-zero
    #[error("git {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// git could not be started
    #[error("failed to run git: {message}")]
    Spawn { message: String },

    /// Filesystem preparation around a clone failed
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to the remote hosting API
#[derive(Error, Debug)]
pub enum HostingError {
    /// API request failed
    #[error("hosting API error: {message}")]
    Api { message: String },

    /// Credentials missing or rejected
    #[error("authentication failed: {message}")]
    Auth { message: String },
}

impl ConfigError {
    /// Creates a new MissingSetting error
    pub fn missing(key: impl Into<String>) -> Self {
        ConfigError::MissingSetting { key: key.into() }
    }

    /// Creates a new InvalidPattern error
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}

impl ProbeError {
    /// Creates a new UpstreamUnavailable error
    pub fn upstream_unavailable(version: impl Into<String>, location: impl Into<String>) -> Self {
        ProbeError::UpstreamUnavailable {
            version: version.into(),
            location: location.into(),
        }
    }

    /// Creates a new InvalidVersion error
    pub fn invalid_version(version: impl Into<String>) -> Self {
        ProbeError::InvalidVersion {
            version: version.into(),
        }
    }

    /// Creates a new Network error
    pub fn network(location: impl Into<String>, message: impl Into<String>) -> Self {
        ProbeError::Network {
            location: location.into(),
            message: message.into(),
        }
    }
}

impl PatchError {
    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PatchError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new WriteError
    pub fn write_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PatchError::WriteError {
            path: path.into(),
            source,
        }
    }
}

impl GitError {
    /// Creates a new CommandFailed error
    pub fn command_failed(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        GitError::CommandFailed {
            command: command.into(),
            stderr: stderr.into(),
        }
    }
}

impl HostingError {
    /// Creates a new Api error
    pub fn api(message: impl Into<String>) -> Self {
        HostingError::Api {
            message: message.into(),
        }
    }
}

impl From<octocrab::Error> for HostingError {
    fn from(err: octocrab::Error) -> Self {
        HostingError::api(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_missing() {
        let err = ConfigError::missing("projects.php.repo");
        let msg = format!("{}", err);
        assert!(msg.contains("missing required setting"));
        assert!(msg.contains("projects.php.repo"));
    }

    #[test]
    fn test_config_error_repository_mismatch() {
        let err = ConfigError::RepositoryMismatch {
            path: PathBuf::from("/work/php"),
            expected: "https://github.com/acme/php.git".to_string(),
            found: "https://***@github.com/other/repo.git".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("/work/php"));
        assert!(msg.contains("acme/php"));
        assert!(msg.contains("other/repo"));
    }

    #[test]
    fn test_config_error_invalid_pattern() {
        let err = ConfigError::invalid_pattern("php-", "no placeholder");
        let msg = format!("{}", err);
        assert!(msg.contains("invalid identifier pattern 'php-'"));
        assert!(msg.contains("no placeholder"));
    }

    #[test]
    fn test_probe_error_upstream_unavailable() {
        let err = ProbeError::upstream_unavailable("8.1.3", "https://example.org/php-8.1.3.tar.gz");
        let msg = format!("{}", err);
        assert!(msg.contains("8.1.3"));
        assert!(msg.contains("not available upstream"));
    }

    #[test]
    fn test_probe_error_invalid_version() {
        let err = ProbeError::invalid_version("8.1.x");
        let msg = format!("{}", err);
        assert!(msg.contains("invalid version '8.1.x'"));
    }

    #[test]
    fn test_probe_error_network() {
        let err = ProbeError::network("https://example.org", "connection refused");
        let msg = format!("{}", err);
        assert!(msg.contains("failed to probe"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_patch_error_read() {
        let err = PatchError::read_error(
            "/work/Dockerfile",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        let msg = format!("{}", err);
        assert!(msg.contains("failed to read"));
        assert!(msg.contains("Dockerfile"));
    }

    #[test]
    fn test_git_error_command_failed() {
        let err = GitError::command_failed("push fork bump/8.1.5", "rejected");
        let msg = format!("{}", err);
        assert!(msg.contains("git push fork bump/8.1.5 failed"));
        assert!(msg.contains("rejected"));
    }

    #[test]
    fn test_hosting_error_api() {
        let err = HostingError::api("422 Unprocessable Entity");
        assert!(err.to_string().contains("hosting API error"));
    }

    #[test]
    fn test_app_error_from_config_error() {
        let app_err: AppError = ConfigError::UnknownProject {
            name: "php".to_string(),
        }
        .into();
        assert!(app_err.to_string().contains("unknown project 'php'"));
    }

    #[test]
    fn test_app_error_from_probe_error() {
        let app_err: AppError = ProbeError::invalid_version("abc").into();
        assert!(app_err.to_string().contains("invalid version"));
    }

    #[test]
    fn test_app_error_from_git_error() {
        let app_err: AppError = GitError::Spawn {
            message: "not found".to_string(),
        }
        .into();
        assert!(app_err.to_string().contains("failed to run git"));
    }
}
