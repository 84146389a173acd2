//! Process memory sampling around a single coder call.
//!
//! The resident set of this process is read through `sysinfo` immediately
//! before and after the call; the reported figure is the growth in KiB.
//! Memory released inside the call is not seen, so this is a lower bound on
//! the call's peak.

use sysinfo::{Pid, ProcessExt, ProcessRefreshKind, System, SystemExt};

pub struct MemorySampler {
    system: System,
    pid: Option<Pid>,
}

impl MemorySampler {
    pub fn new() -> Self {
        Self {
            system: System::new(),
            pid: sysinfo::get_current_pid().ok(),
        }
    }

    /// Resident set size of this process in bytes, 0 if unavailable.
    pub fn resident_bytes(&mut self) -> u64 {
        let Some(pid) = self.pid else {
            return 0;
        };
        self.system
            .refresh_process_specifics(pid, ProcessRefreshKind::new());
        self.system.process(pid).map(|p| p.memory()).unwrap_or(0)
    }

    /// Run `f` and return its result with the resident-set growth in KiB.
    pub fn measure<T>(&mut self, f: impl FnOnce() -> T) -> (T, f64) {
        let before = self.resident_bytes();
        let result = f();
        let after = self.resident_bytes();
        (result, growth_kib(before, after))
    }
}

impl Default for MemorySampler {
    fn default() -> Self {
        Self::new()
    }
}

/// Growth from `before` to `after` bytes in KiB; shrinking counts as zero.
pub fn growth_kib(before: u64, after: u64) -> f64 {
    after.saturating_sub(before) as f64 / 1024.0
}
