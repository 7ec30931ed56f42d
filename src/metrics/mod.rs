//! Host metrics collection.
//!
//! A [`MetricsSnapshot`] is one point-in-time read of CPU, memory and disk
//! utilization together with the instance identity. Snapshots are produced
//! fresh for every request through a [`MetricsSource`] and are never cached.
//! Collection is fallible: a failed lookup is reported as a [`CollectionError`]
//! rather than a zeroed snapshot, so a broken sampler can never look healthy.

mod system;

pub use system::SystemCollector;

use async_trait::async_trait;
use serde::Serialize;

/// Error payload label for failed collections
pub const COLLECTION_FAILED: &str = "Failed to collect metrics";

/// One point-in-time reading of host resources.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub hostname: String,
    pub internal_ip: String,
    pub cpu_percent: f64,
    pub memory_percent: f64,
    /// Usage of the filesystem holding the configured path. `None` when disk is
    /// not sampled or the path does not exist.
    #[serde(rename = "disk_usage", skip_serializing_if = "Option::is_none")]
    pub disk_percent: Option<f64>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum CollectionError {
    #[error("Hostname lookup failed: {0}")]
    Hostname(String),

    #[error("Failed to resolve {host}: {message}")]
    Resolve { host: String, message: String },

    #[error("Metric sampling failed: {0}")]
    Sampler(String),
}

/// Source of metrics snapshots.
///
/// The production implementation is [`SystemCollector`]; tests inject fixed readings.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    async fn collect(&self) -> Result<MetricsSnapshot, CollectionError>;
}

/// Validate a raw percentage reading and clamp it into [0, 100].
pub fn checked_percent(name: &str, value: f64) -> Result<f64, CollectionError> {
    if !value.is_finite() {
        return Err(CollectionError::Sampler(format!(
            "{} reading is not a number: {}",
            name, value
        )));
    }
    Ok(value.clamp(0.0, 100.0))
}

/// Percentage of `used` over `total`, or `None` for an empty total.
pub fn ratio_percent(used: u64, total: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some((used as f64 / total as f64 * 100.0).clamp(0.0, 100.0))
}

/// Collect a snapshot, logging failures at error severity.
pub async fn collect_logged(source: &dyn MetricsSource) -> Result<MetricsSnapshot, CollectionError> {
    let result = source.collect().await;
    if let Err(ref e) = result {
        tracing::error!(error = %e, "Error collecting instance information");
    }
    result
}

/// Instance information as embedded in informational responses.
///
/// Serializes as the snapshot fields on success, or as
/// `{error, message}` when collection failed.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum InstanceInfo {
    Metrics(MetricsSnapshot),
    Unavailable {
        error: &'static str,
        message: String,
    },
}

impl InstanceInfo {
    pub fn hostname(&self) -> Option<&str> {
        match self {
            InstanceInfo::Metrics(snapshot) => Some(&snapshot.hostname),
            InstanceInfo::Unavailable { .. } => None,
        }
    }
}

impl From<Result<MetricsSnapshot, CollectionError>> for InstanceInfo {
    fn from(result: Result<MetricsSnapshot, CollectionError>) -> Self {
        match result {
            Ok(snapshot) => InstanceInfo::Metrics(snapshot),
            Err(e) => InstanceInfo::Unavailable {
                error: COLLECTION_FAILED,
                message: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(disk: Option<f64>) -> MetricsSnapshot {
        MetricsSnapshot {
            hostname: "web-1".to_string(),
            internal_ip: "10.0.0.5".to_string(),
            cpu_percent: 12.5,
            memory_percent: 40.0,
            disk_percent: disk,
        }
    }

    #[test]
    fn test_checked_percent_clamps() {
        assert_eq!(checked_percent("cpu", -3.0).unwrap(), 0.0);
        assert_eq!(checked_percent("cpu", 55.5).unwrap(), 55.5);
        assert_eq!(checked_percent("cpu", 104.0).unwrap(), 100.0);
    }

    #[test]
    fn test_checked_percent_rejects_nan() {
        let err = checked_percent("memory", f64::NAN).unwrap_err();
        assert!(matches!(err, CollectionError::Sampler(_)));
        assert!(checked_percent("memory", f64::INFINITY).is_err());
    }

    #[test]
    fn test_ratio_percent() {
        assert_eq!(ratio_percent(50, 200), Some(25.0));
        assert_eq!(ratio_percent(0, 0), None);
        assert_eq!(ratio_percent(300, 200), Some(100.0));
    }

    #[test]
    fn test_snapshot_serializes_disk_as_disk_usage() {
        let value = serde_json::to_value(snapshot(Some(30.0))).unwrap();
        assert_eq!(value["disk_usage"], 30.0);
        assert_eq!(value["hostname"], "web-1");
        assert!(value.get("disk_percent").is_none());
    }

    #[test]
    fn test_snapshot_omits_missing_disk() {
        let value = serde_json::to_value(snapshot(None)).unwrap();
        assert!(value.get("disk_usage").is_none());
        assert_eq!(value["cpu_percent"], 12.5);
    }

    #[test]
    fn test_instance_info_failure_shape() {
        let info = InstanceInfo::from(Err(CollectionError::Hostname(
            "no such host".to_string(),
        )));
        assert!(info.hostname().is_none());

        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["error"], COLLECTION_FAILED);
        assert!(value["message"].as_str().unwrap().contains("no such host"));
        assert!(value.get("cpu_percent").is_none());
    }

    #[test]
    fn test_instance_info_success_shape() {
        let info = InstanceInfo::from(Ok(snapshot(None)));
        assert_eq!(info.hostname(), Some("web-1"));
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["internal_ip"], "10.0.0.5");
        assert!(value.get("error").is_none());
    }
}
