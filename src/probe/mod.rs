//! Upstream version discovery
//!
//! This module provides:
//! - The `ExistenceProber` seam: "does this version exist upstream?"
//! - `TemplateLocation`, a prober over a templated download location
//! - `VersionProbe`, which walks patch levels up from the recorded version

mod client;
mod location;

pub use client::HttpClient;
pub use location::{TemplateLocation, VERSION_PLACEHOLDER};

use crate::domain::version::increment_last;
use crate::error::ProbeError;
use async_trait::async_trait;
use tracing::{debug, warn};

/// Upper bound on consecutive patch levels probed in one call
const MAX_PROBE_STEPS: usize = 500;

/// Boolean existence check against an upstream source
#[async_trait]
pub trait ExistenceProber: Send + Sync {
    /// Concrete location checked for a version (used in messages)
    fn location(&self, version: &str) -> String;

    /// Whether the version is published upstream
    async fn exists(&self, version: &str) -> Result<bool, ProbeError>;
}

#[async_trait]
impl<T: ExistenceProber + ?Sized> ExistenceProber for Box<T> {
    fn location(&self, version: &str) -> String {
        (**self).location(version)
    }

    async fn exists(&self, version: &str) -> Result<bool, ProbeError> {
        (**self).exists(version).await
    }
}

#[async_trait]
impl<T: ExistenceProber + ?Sized> ExistenceProber for &T {
    fn location(&self, version: &str) -> String {
        (**self).location(version)
    }

    async fn exists(&self, version: &str) -> Result<bool, ProbeError> {
        (**self).exists(version).await
    }
}

/// Finds the highest published patch level above a recorded version
pub struct VersionProbe<P> {
    prober: P,
}

impl<P: ExistenceProber> VersionProbe<P> {
    /// Create a probe over the given prober
    pub fn new(prober: P) -> Self {
        Self { prober }
    }

    /// Return the last version in the unbroken run of published patch levels
    /// starting at `current`.
    ///
    /// Fails with `UpstreamUnavailable` when `current` itself is missing.
    pub async fn find_latest_available(&self, current: &str) -> Result<String, ProbeError> {
        // Reject non-numeric trailing segments before touching the network
        increment_last(current).ok_or_else(|| ProbeError::invalid_version(current))?;

        if !self.prober.exists(current).await? {
            return Err(ProbeError::upstream_unavailable(
                current,
                self.prober.location(current),
            ));
        }

        let mut latest = current.to_string();
        for _ in 0..MAX_PROBE_STEPS {
            let next = increment_last(&latest).ok_or_else(|| ProbeError::invalid_version(&latest))?;
            if !self.prober.exists(&next).await? {
                debug!(current, latest = %latest, missing = %next, "probe stopped at gap");
                return Ok(latest);
            }
            latest = next;
        }

        warn!(current, latest = %latest, "probe step limit reached");
        Ok(latest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    struct SetProber {
        versions: HashSet<String>,
        calls: Mutex<Vec<String>>,
    }

    impl SetProber {
        fn new(versions: &[&str]) -> Self {
            Self {
                versions: versions.iter().map(|v| v.to_string()).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ExistenceProber for SetProber {
        fn location(&self, version: &str) -> String {
            format!("stub://{}", version)
        }

        async fn exists(&self, version: &str) -> Result<bool, ProbeError> {
            self.calls.lock().unwrap().push(version.to_string());
            Ok(self.versions.contains(version))
        }
    }

    #[tokio::test]
    async fn test_finds_last_before_gap() {
        let probe = VersionProbe::new(SetProber::new(&[
            "8.1.0", "8.1.1", "8.1.2", "8.1.3", "8.1.4", "8.1.5",
        ]));
        assert_eq!(probe.find_latest_available("8.1.0").await.unwrap(), "8.1.5");
    }

    #[tokio::test]
    async fn test_current_is_latest() {
        let probe = VersionProbe::new(SetProber::new(&["8.2.3"]));
        assert_eq!(probe.find_latest_available("8.2.3").await.unwrap(), "8.2.3");
    }

    #[tokio::test]
    async fn test_stops_at_first_gap() {
        let prober = SetProber::new(&["8.1.0", "8.1.1", "8.1.3"]);
        let probe = VersionProbe::new(prober);
        assert_eq!(probe.find_latest_available("8.1.0").await.unwrap(), "8.1.1");
        assert_eq!(
            *probe.prober.calls.lock().unwrap(),
            vec!["8.1.0", "8.1.1", "8.1.2"]
        );
    }

    #[tokio::test]
    async fn test_missing_current_fails_fast() {
        let probe = VersionProbe::new(SetProber::new(&["8.1.1"]));
        let err = probe.find_latest_available("8.1.0").await.unwrap_err();
        assert!(matches!(err, ProbeError::UpstreamUnavailable { .. }));
        assert!(err.to_string().contains("stub://8.1.0"));
    }

    #[tokio::test]
    async fn test_non_numeric_version_rejected() {
        let prober = SetProber::new(&["8.1.0rc1"]);
        let probe = VersionProbe::new(prober);
        let err = probe.find_latest_available("8.1.0rc1").await.unwrap_err();
        assert!(matches!(err, ProbeError::InvalidVersion { .. }));
        assert!(probe.prober.calls.lock().unwrap().is_empty());
    }
}
