//! Process enumeration

use sysinfo::{ProcessesToUpdate, System};

/// A process visible to the caller at enumeration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: String,
}

/// Enumerate all running processes, freshly at call time.
///
/// Order is whatever the enumeration yields; no sorting or prioritization.
/// A process that exits after enumeration simply fails its trim attempt.
pub fn list_processes() -> Vec<ProcessEntry> {
    let mut sys = System::new();
    sys.refresh_processes(ProcessesToUpdate::All, true);

    sys.processes()
        .iter()
        .map(|(pid, p)| ProcessEntry {
            pid: pid.as_u32(),
            name: p.name().to_string_lossy().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumeration_sees_this_process() {
        let own_pid = std::process::id();
        let procs = list_processes();
        assert!(!procs.is_empty());
        assert!(procs.iter().any(|p| p.pid == own_pid));
    }
}
