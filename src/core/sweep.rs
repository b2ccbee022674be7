//! One-shot sweep orchestration
//!
//! Runs the linear sequence: memory snapshot, working-set trim over every
//! process, cache purge, second snapshot. Partial failure is the expected
//! outcome of a best-effort sweep, so `run` never returns an error.

use std::time::Duration;
use tracing::{info, warn};

use super::config::SweepConfig;
use crate::logging::SessionLog;
use crate::security::privileges;
use crate::windows::cache::{purge_system_caches, CachePurgeReport, PurgeOptions, StepOutcome};
use crate::windows::memory::{read_memory_status, MemoryStatus};
use crate::windows::workingset::{trim_all, TrimReport};

/// Everything a single run produced.
#[derive(Debug, Clone)]
pub struct SweepSummary {
    pub before: MemoryStatus,
    pub after: MemoryStatus,
    pub trim: TrimReport,
    pub cache: CachePurgeReport,
}

impl SweepSummary {
    /// Full success/failure listing in visitation order, for verbose output
    /// and the session log.
    pub fn detail_block(&self) -> String {
        let mut out = String::new();
        out.push_str("=====Begin Output=====\n");
        out.push_str(&format!("Memory freed from: {}\n", self.trim.trimmed.len()));
        out.push_str("_________________________\n");
        for name in &self.trim.trimmed {
            out.push_str(name);
            out.push('\n');
        }
        out.push_str(&format!("\nFailed: {}\n", self.trim.failed.len()));
        out.push_str("_________________________\n");
        for failure in &self.trim.failed {
            out.push_str(&format!("{}: {}\n", failure.name, failure.detail));
        }
        out
    }
}

pub struct MemorySweeper {
    config: SweepConfig,
    log: SessionLog,
}

impl MemorySweeper {
    pub fn new(config: SweepConfig) -> Self {
        if !privileges::is_elevated() {
            warn!("not running as administrator; cache purge steps will be skipped");
        }
        let log = SessionLog::new(config.resolved_log_path(), config.log_enabled);
        Self { config, log }
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    /// Run the sweep to completion over a fresh process snapshot.
    pub fn run(&self) -> SweepSummary {
        self.log.append("New session started");

        let before = read_memory_status();

        let trim = trim_all(Duration::from_millis(self.config.trim_delay_ms));
        info!(
            "cleared memory from {} processes, failed {}",
            trim.trimmed.len(),
            trim.failed.len()
        );
        for failure in &trim.failed {
            self.log.append(&format!("{}: {}", failure.name, failure.detail));
        }

        let cache = purge_system_caches(&PurgeOptions {
            standby: self.config.purge_standby,
        });
        self.report_cache_step("file cache", &cache.file_cache);
        self.report_cache_step("standby list", &cache.standby);

        let after = read_memory_status();

        let summary = SweepSummary {
            before,
            after,
            trim,
            cache,
        };
        self.log.append(&summary.detail_block());
        summary
    }

    fn report_cache_step(&self, step: &str, outcome: &StepOutcome) {
        match outcome {
            StepOutcome::Applied => info!("{} purged", step),
            StepOutcome::Skipped(reason) => info!("{} skipped: {}", step, reason),
            StepOutcome::Failed(detail) => {
                warn!("{} purge failed: {}", step, detail);
                self.log
                    .append(&format!("Failed to clear file system cache: {}", detail));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::windows::cache::StepOutcome;
    use crate::windows::workingset::TrimFailure;

    fn summary_with(trimmed: Vec<&str>, failed: Vec<(&str, &str)>) -> SweepSummary {
        let status = MemoryStatus {
            total_physical_mb: 8192.0,
            available_physical_mb: 2048.0,
            memory_load_percent: 75,
        };
        SweepSummary {
            before: status.clone(),
            after: status,
            trim: TrimReport {
                trimmed: trimmed.into_iter().map(String::from).collect(),
                failed: failed
                    .into_iter()
                    .map(|(name, detail)| TrimFailure {
                        name: name.into(),
                        detail: detail.into(),
                    })
                    .collect(),
            },
            cache: CachePurgeReport {
                file_cache: StepOutcome::Skipped("privilege not enabled".into()),
                standby: StepOutcome::Skipped("standby purge disabled".into()),
            },
        }
    }

    #[test]
    fn detail_block_lists_both_partitions_in_order() {
        let summary = summary_with(vec!["alpha", "beta"], vec![("gamma", "access denied")]);
        let block = summary.detail_block();

        assert!(block.contains("Memory freed from: 2"));
        assert!(block.contains("Failed: 1"));
        assert!(block.contains("gamma: access denied"));
        assert!(block.find("alpha").unwrap() < block.find("beta").unwrap());
    }

    #[test]
    fn detail_block_handles_an_empty_run() {
        let summary = summary_with(vec![], vec![]);
        let block = summary.detail_block();
        assert!(block.contains("Memory freed from: 0"));
        assert!(block.contains("Failed: 0"));
    }

    #[cfg(not(windows))]
    #[test]
    fn run_completes_without_privileges() {
        let config = SweepConfig {
            trim_delay_ms: 0,
            ..Default::default()
        };
        let sweeper = MemorySweeper::new(config);
        let summary = sweeper.run();

        // Every enumerated process ends in exactly one of the two lists;
        // off Windows the trim call itself is unsupported, so all fail.
        assert_eq!(summary.trim.visited(), summary.trim.failed.len());
        assert!(!summary.cache.any_failed());
        assert!(summary.after.total_physical_mb > 0.0);
    }
}
