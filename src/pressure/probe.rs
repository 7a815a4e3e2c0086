/*!
 * Usage Probes
 * Platform memory readings consumed by pressure sources and the profiler
 */

use crate::core::errors::{ProbeError, ProbeResult};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// One reading of process and system memory counters (bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UsageReading {
    pub rss_bytes: u64,
    pub heap_used_bytes: u64,
    pub heap_capacity_bytes: u64,
    pub external_bytes: u64,
    pub system_total_bytes: u64,
    pub system_available_bytes: u64,
}

impl UsageReading {
    /// Fraction of system memory in use; zero when the total is unknown
    pub fn usage_ratio(&self) -> f64 {
        if self.system_total_bytes == 0 {
            return 0.0;
        }
        let used = self
            .system_total_bytes
            .saturating_sub(self.system_available_bytes);
        used as f64 / self.system_total_bytes as f64
    }
}

/// Source of memory readings
pub trait UsageProbe: Send + Sync {
    fn read(&self) -> ProbeResult<UsageReading>;
}

/// Linux procfs probe
///
/// Reads `MemTotal`/`MemAvailable` from meminfo and the process counters from
/// `/proc/self/status`: `VmRSS` as resident size, `RssAnon` as heap in use,
/// `VmData` as heap capacity and `RssFile + RssShmem` as external memory.
#[derive(Debug, Clone)]
pub struct ProcfsProbe {
    meminfo: PathBuf,
    status: PathBuf,
}

impl ProcfsProbe {
    pub fn new() -> Self {
        Self::with_paths("/proc/meminfo", "/proc/self/status")
    }

    pub fn with_paths(meminfo: impl Into<PathBuf>, status: impl Into<PathBuf>) -> Self {
        Self {
            meminfo: meminfo.into(),
            status: status.into(),
        }
    }
}

impl Default for ProcfsProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl UsageProbe for ProcfsProbe {
    fn read(&self) -> ProbeResult<UsageReading> {
        let meminfo = read_file(&self.meminfo)?;
        let status = read_file(&self.status)?;

        let field = |text: &str, path: &Path, name: &str| -> ProbeResult<u64> {
            kb_field(text, name).ok_or_else(|| ProbeError::Parse {
                path: path.display().to_string(),
                field: name.to_string(),
            })
        };

        let rss_bytes = field(&status, &self.status, "VmRSS")?;
        // RssAnon/RssFile/RssShmem are absent on older kernels
        let heap_used_bytes = kb_field(&status, "RssAnon").unwrap_or(rss_bytes);
        let heap_capacity_bytes = kb_field(&status, "VmData").unwrap_or(heap_used_bytes);
        let external_bytes = kb_field(&status, "RssFile")
            .unwrap_or(0)
            .saturating_add(kb_field(&status, "RssShmem").unwrap_or(0));

        Ok(UsageReading {
            rss_bytes,
            heap_used_bytes,
            heap_capacity_bytes,
            external_bytes,
            system_total_bytes: field(&meminfo, &self.meminfo, "MemTotal")?,
            system_available_bytes: field(&meminfo, &self.meminfo, "MemAvailable")?,
        })
    }
}

fn read_file(path: &Path) -> ProbeResult<String> {
    std::fs::read_to_string(path).map_err(|e| ProbeError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Parse a `Name:   1234 kB` line into bytes
fn kb_field(text: &str, name: &str) -> Option<u64> {
    text.lines()
        .find_map(|line| line.strip_prefix(name)?.strip_prefix(':'))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|value| value.parse::<u64>().ok())
        .map(|kb| kb.saturating_mul(1024))
}

/// Probe that replays scripted readings
///
/// The final scripted result repeats once the script is exhausted.
pub struct StaticProbe {
    script: Mutex<VecDeque<ProbeResult<UsageReading>>>,
    last: Mutex<ProbeResult<UsageReading>>,
}

impl StaticProbe {
    pub fn new(reading: UsageReading) -> Self {
        Self::scripted(vec![Ok(reading)])
    }

    pub fn scripted(script: Vec<ProbeResult<UsageReading>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(Err(ProbeError::Unavailable("empty script".into()))),
        }
    }

    /// Probe that always fails, for exercising fallback paths
    pub fn failing(reason: &str) -> Self {
        Self::scripted(vec![Err(ProbeError::Unavailable(reason.to_string()))])
    }

    /// Append a reading to the script
    pub fn push(&self, reading: UsageReading) {
        self.script.lock().push_back(Ok(reading));
    }
}

impl UsageProbe for StaticProbe {
    fn read(&self) -> ProbeResult<UsageReading> {
        let mut last = self.last.lock();
        if let Some(next) = self.script.lock().pop_front() {
            *last = next;
        }
        last.clone()
    }
}
