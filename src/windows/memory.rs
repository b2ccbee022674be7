//! Physical-memory snapshots

use sysinfo::System;

/// Point-in-time view of physical memory.
#[derive(Debug, Clone)]
pub struct MemoryStatus {
    pub total_physical_mb: f64,
    pub available_physical_mb: f64,
    pub memory_load_percent: u32,
}

impl MemoryStatus {
    pub fn used_physical_mb(&self) -> f64 {
        self.total_physical_mb - self.available_physical_mb
    }

    pub fn total_physical_gb(&self) -> f64 {
        self.total_physical_mb / 1024.0
    }

    pub fn is_high_pressure(&self) -> bool {
        self.memory_load_percent > 80
    }

    pub fn is_critical(&self) -> bool {
        self.memory_load_percent > 95
    }
}

/// Read the current memory status.
pub fn read_memory_status() -> MemoryStatus {
    let mut sys = System::new();
    sys.refresh_memory();
    let total = sys.total_memory() as f64 / 1024.0 / 1024.0;
    let avail = sys.available_memory() as f64 / 1024.0 / 1024.0;
    let load = if total > 0.0 {
        (((total - avail) / total) * 100.0) as u32
    } else {
        0
    };
    MemoryStatus {
        total_physical_mb: total,
        available_physical_mb: avail,
        memory_load_percent: load,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_helpers() {
        let status = MemoryStatus {
            total_physical_mb: 16384.0,
            available_physical_mb: 4096.0,
            memory_load_percent: 75,
        };
        assert_eq!(status.used_physical_mb(), 12288.0);
        assert_eq!(status.total_physical_gb(), 16.0);
        assert!(!status.is_high_pressure());
        assert!(!status.is_critical());

        let critical = MemoryStatus {
            memory_load_percent: 96,
            ..status
        };
        assert!(critical.is_high_pressure());
        assert!(critical.is_critical());
    }

    #[test]
    fn live_snapshot_is_sane() {
        let status = read_memory_status();
        assert!(status.total_physical_mb > 0.0);
        assert!(status.available_physical_mb <= status.total_physical_mb);
        assert!(status.memory_load_percent <= 100);
    }
}
