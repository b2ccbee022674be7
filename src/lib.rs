//! Memsweep
//!
//! A one-shot memory reclaimer for Windows. It asks every running process to
//! release its working-set pages, then instructs the kernel to shrink the
//! file-system cache and purge the standby page list.
//!
//! ## Behavior
//!
//! - **Best effort, always finish, always report**: a process that cannot be
//!   trimmed is recorded and skipped, never fatal
//! - **Privilege-gated purges**: each kernel purge step runs only if its
//!   token privilege can be enabled, and the prior token state is restored
//!   afterwards
//! - **Session log**: optional timestamped append-only log beside the
//!   executable; log failures never affect the run
//!
//! The working-set trim needs no special rights; the cache and standby
//! purges require administrator privileges.

pub mod console;
pub mod core;
pub mod error;
pub mod logging;
pub mod security;
pub mod windows;

// Re-exports
pub use crate::core::config::SweepConfig;
pub use crate::core::sweep::{MemorySweeper, SweepSummary};
pub use error::{SweepError, SweepResult};
pub use logging::SessionLog;
pub use security::privileges::{enable_privilege, is_elevated, PrivilegeGuard};
pub use windows::cache::{CachePurgeReport, FileCacheInfo, PurgeOptions, StepOutcome, WordWidth};
pub use windows::memory::{read_memory_status, MemoryStatus};
pub use windows::process::{list_processes, ProcessEntry};
pub use windows::workingset::{empty_working_set, trim_all, TrimFailure, TrimReport};
