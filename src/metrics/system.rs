//! Metrics collection from the running host.
//!
//! CPU and memory come from `sysinfo`, disk usage from `statvfs` on the
//! configured path. The CPU reading is an interval sample: two refreshes
//! separated by the configured window. The `/proc` reads run on the blocking
//! pool and the window itself is an async sleep, so no runtime worker is held.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use nix::errno::Errno;
use nix::sys::statvfs::statvfs;
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};

use super::{checked_percent, ratio_percent, CollectionError, MetricsSnapshot, MetricsSource};
use crate::config::MetricsConfig;

/// Samples the local host on every call.
#[derive(Debug, Clone)]
pub struct SystemCollector {
    cpu_window: Duration,
    disk_mount: Option<PathBuf>,
}

impl SystemCollector {
    /// Build a collector from configuration. `sample_disk` controls whether disk
    /// usage is read at all.
    pub fn new(config: &MetricsConfig, sample_disk: bool) -> Self {
        // sysinfo needs at least this long between refreshes to compute usage
        let cpu_window =
            Duration::from_millis(config.cpu_sample_ms).max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        Self {
            cpu_window,
            disk_mount: sample_disk.then(|| PathBuf::from(&config.disk_mount)),
        }
    }

    async fn sample_cpu_and_memory(&self) -> Result<(f64, f64), CollectionError> {
        let mut sys = tokio::task::spawn_blocking(|| {
            let mut sys = System::new_with_specifics(
                RefreshKind::nothing()
                    .with_cpu(CpuRefreshKind::nothing().with_cpu_usage())
                    .with_memory(MemoryRefreshKind::nothing().with_ram()),
            );
            sys.refresh_cpu_usage();
            sys
        })
        .await
        .map_err(sampler_task_failed)?;

        tokio::time::sleep(self.cpu_window).await;

        let (cpu, used_memory, total_memory) = tokio::task::spawn_blocking(move || {
            sys.refresh_cpu_usage();
            sys.refresh_memory();
            (sys.global_cpu_usage(), sys.used_memory(), sys.total_memory())
        })
        .await
        .map_err(sampler_task_failed)?;

        let cpu = checked_percent("cpu", f64::from(cpu))?;
        let memory = ratio_percent(used_memory, total_memory)
            .ok_or_else(|| CollectionError::Sampler("total memory reported as zero".to_string()))?;

        Ok((cpu, memory))
    }

    async fn sample_disk(&self) -> Result<Option<f64>, CollectionError> {
        let Some(path) = self.disk_mount.as_ref() else {
            return Ok(None);
        };

        let target = path.clone();
        let stat = tokio::task::spawn_blocking(move || statvfs(target.as_path()))
            .await
            .map_err(sampler_task_failed)?;

        match stat {
            Ok(stat) => Ok(filesystem_percent(
                stat.blocks() as u64,
                stat.blocks_free() as u64,
                stat.blocks_available() as u64,
                stat.fragment_size() as u64,
            )),
            Err(Errno::ENOENT) => {
                tracing::warn!(
                    path = %path.display(),
                    "Disk path does not exist; disk reading missing"
                );
                Ok(None)
            }
            Err(errno) => Err(CollectionError::Sampler(format!(
                "statvfs {} failed: {}",
                path.display(),
                errno
            ))),
        }
    }
}

fn sampler_task_failed(e: tokio::task::JoinError) -> CollectionError {
    CollectionError::Sampler(format!("sampler task failed: {}", e))
}

#[async_trait]
impl MetricsSource for SystemCollector {
    async fn collect(&self) -> Result<MetricsSnapshot, CollectionError> {
        let hostname = local_hostname()?;
        let internal_ip = resolve_host(&hostname).await?;
        let (cpu_percent, memory_percent) = self.sample_cpu_and_memory().await?;
        let disk_percent = self.sample_disk().await?;

        tracing::debug!(
            %hostname,
            %internal_ip,
            cpu_percent,
            memory_percent,
            disk_percent = ?disk_percent,
            "Collected instance metrics"
        );

        Ok(MetricsSnapshot {
            hostname,
            internal_ip,
            cpu_percent,
            memory_percent,
            disk_percent,
        })
    }
}

fn local_hostname() -> Result<String, CollectionError> {
    hostname::get()
        .map_err(|e| CollectionError::Hostname(e.to_string()))?
        .into_string()
        .map_err(|raw| CollectionError::Hostname(format!("hostname is not valid UTF-8: {:?}", raw)))
}

/// Resolve the host's own name to an address, preferring IPv4.
async fn resolve_host(host: &str) -> Result<String, CollectionError> {
    let resolve_err = |message: String| CollectionError::Resolve {
        host: host.to_string(),
        message,
    };

    let addrs: Vec<IpAddr> = tokio::net::lookup_host((host, 0))
        .await
        .map_err(|e| resolve_err(e.to_string()))?
        .map(|addr| addr.ip())
        .collect();

    pick_address(&addrs)
        .map(|ip| ip.to_string())
        .ok_or_else(|| resolve_err("no addresses returned".to_string()))
}

fn pick_address(addrs: &[IpAddr]) -> Option<IpAddr> {
    addrs
        .iter()
        .find(|ip| ip.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
}

/// Filesystem usage the way `df` reports it.
///
/// Blocks reserved for root count neither as used nor as available, so the
/// percentage is `used / (used + available)` with `used = blocks - free`.
fn filesystem_percent(blocks: u64, free: u64, available: u64, fragment_size: u64) -> Option<f64> {
    let used = blocks.saturating_sub(free).saturating_mul(fragment_size);
    let available = available.saturating_mul(fragment_size);
    ratio_percent(used, used.saturating_add(available))
}
