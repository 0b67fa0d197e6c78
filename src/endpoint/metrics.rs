//! Runtime metrics provider: process memory and uptime behind a trait
//! so health logic is testable without a real process.

use std::sync::Mutex;
use std::time::Duration;
use sysinfo::{Pid, System};

/// Process memory usage snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryUsage {
    /// Resident set size in bytes.
    pub rss_bytes: u64,
    /// Virtual memory size in bytes.
    pub virtual_bytes: u64,
}

/// Source of process-level metrics.
pub trait RuntimeMetrics: Send + Sync {
    /// Current memory usage of the process.
    fn memory(&self) -> MemoryUsage;

    /// Time the process has been running.
    fn uptime(&self) -> Duration;
}

/// Metrics provider backed by the host system.
pub struct SystemMetrics {
    system: Mutex<System>,
    pid: Pid,
}

impl SystemMetrics {
    /// Create a provider for the current process.
    pub fn new() -> Self {
        let mut system = System::new_all();
        system.refresh_all();
        let pid = sysinfo::get_current_pid().unwrap_or(Pid::from_u32(0));
        Self {
            system: Mutex::new(system),
            pid,
        }
    }
}

impl Default for SystemMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeMetrics for SystemMetrics {
    fn memory(&self) -> MemoryUsage {
        let mut system = match self.system.lock() {
            Ok(system) => system,
            Err(_) => return MemoryUsage::default(),
        };
        system.refresh_all();
        match system.process(self.pid) {
            Some(process) => MemoryUsage {
                rss_bytes: process.memory(),
                virtual_bytes: process.virtual_memory(),
            },
            None => MemoryUsage {
                rss_bytes: system.used_memory(),
                virtual_bytes: 0,
            },
        }
    }

    fn uptime(&self) -> Duration {
        let mut system = match self.system.lock() {
            Ok(system) => system,
            Err(_) => return Duration::ZERO,
        };
        system.refresh_all();
        system
            .process(self.pid)
            .map(|process| Duration::from_secs(process.run_time()))
            .unwrap_or(Duration::ZERO)
    }
}

/// Fixed-value provider for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedMetrics {
    /// Memory usage to report.
    pub memory: MemoryUsage,
    /// Uptime to report.
    pub uptime: Duration,
}

impl RuntimeMetrics for FixedMetrics {
    fn memory(&self) -> MemoryUsage {
        self.memory
    }

    fn uptime(&self) -> Duration {
        self.uptime
    }
}
