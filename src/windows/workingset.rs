//! Working-set eviction sweep

use std::thread;
use std::time::Duration;
use tracing::debug;

use super::process::{list_processes, ProcessEntry};
use crate::error::{SweepError, SweepResult};

/// A process whose trim attempt failed, with the error detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimFailure {
    pub name: String,
    pub detail: String,
}

/// Partitioned outcome of a trim sweep, in visitation order.
///
/// Every visited process lands in exactly one of the two lists.
#[derive(Debug, Clone, Default)]
pub struct TrimReport {
    pub trimmed: Vec<String>,
    pub failed: Vec<TrimFailure>,
}

impl TrimReport {
    /// Number of processes visited.
    pub fn visited(&self) -> usize {
        self.trimmed.len() + self.failed.len()
    }
}

/// Ask the kernel to evict one process's resident pages.
///
/// A request, not a guarantee: the OS or the target process may fault the
/// pages straight back in. Protected and already-exited processes fail the
/// `OpenProcess` step.
pub fn empty_working_set(pid: u32) -> SweepResult<()> {
    #[cfg(windows)]
    {
        use windows::Win32::Foundation::CloseHandle;
        use windows::Win32::System::ProcessStatus::K32EmptyWorkingSet;
        use windows::Win32::System::Threading::{
            OpenProcess, PROCESS_QUERY_INFORMATION, PROCESS_SET_QUOTA,
        };

        unsafe {
            let handle = OpenProcess(PROCESS_SET_QUOTA | PROCESS_QUERY_INFORMATION, false, pid)
                .map_err(|e| SweepError::win32("OpenProcess", &e))?;
            let result = K32EmptyWorkingSet(handle)
                .map_err(|e| SweepError::win32("K32EmptyWorkingSet", &e));
            let _ = CloseHandle(handle);
            result
        }
    }
    #[cfg(not(windows))]
    {
        let _ = pid;
        Err(SweepError::NotSupported(
            "working-set eviction requires Windows".into(),
        ))
    }
}

/// Trim every currently running process, best effort.
///
/// `delay` bounds the rate of the sweep; it is inserted after each
/// successful trim, not a correctness requirement.
pub fn trim_all(delay: Duration) -> TrimReport {
    let procs = list_processes();
    debug!("visiting {} processes", procs.len());
    sweep(procs, delay, empty_working_set)
}

// Result-per-item fold over the enumerated sequence. No single failure
// aborts the sweep.
fn sweep<F>(procs: Vec<ProcessEntry>, delay: Duration, mut trim: F) -> TrimReport
where
    F: FnMut(u32) -> SweepResult<()>,
{
    let mut report = TrimReport::default();
    for entry in procs {
        match trim(entry.pid) {
            Ok(()) => {
                debug!("trimmed {}", entry.name);
                if !delay.is_zero() {
                    thread::sleep(delay);
                }
                report.trimmed.push(entry.name);
            }
            Err(e) => {
                debug!("could not trim {}: {}", entry.name, e);
                report.failed.push(TrimFailure {
                    name: entry.name,
                    detail: e.to_string(),
                });
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(names: &[&str]) -> Vec<ProcessEntry> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| ProcessEntry {
                pid: i as u32 + 1,
                name: (*name).to_string(),
            })
            .collect()
    }

    #[test]
    fn empty_list_yields_empty_report() {
        let report = sweep(Vec::new(), Duration::ZERO, |_| Ok(()));
        assert_eq!(report.visited(), 0);
        assert!(report.trimmed.is_empty());
        assert!(report.failed.is_empty());
    }

    #[test]
    fn report_partitions_the_visited_set() {
        let procs = entries(&["a", "b", "c", "d", "e"]);
        let report = sweep(procs, Duration::ZERO, |pid| {
            if pid % 2 == 0 {
                Err(SweepError::PermissionDenied("denied".into()))
            } else {
                Ok(())
            }
        });
        assert_eq!(report.visited(), 5);
        assert_eq!(report.trimmed, vec!["a", "c", "e"]);
        assert_eq!(report.failed.len(), 2);
    }

    #[test]
    fn lists_preserve_visitation_order() {
        let procs = entries(&["first", "second", "third"]);
        let report = sweep(procs, Duration::ZERO, |pid| {
            if pid == 2 {
                Err(SweepError::NotSupported("gone".into()))
            } else {
                Ok(())
            }
        });
        assert_eq!(report.trimmed, vec!["first", "third"]);
        assert_eq!(report.failed[0].name, "second");
        assert!(report.failed[0].detail.contains("gone"));
    }

    #[test]
    fn a_failure_never_aborts_the_sweep() {
        let procs = entries(&["a", "b", "c"]);
        let mut calls = 0;
        let report = sweep(procs, Duration::ZERO, |_| {
            calls += 1;
            Err(SweepError::PermissionDenied("all denied".into()))
        });
        assert_eq!(calls, 3);
        assert_eq!(report.failed.len(), 3);
        assert!(report.trimmed.is_empty());
    }
}
