//! File-system cache and standby-list purge
//!
//! Both operations go through `NtSetSystemInformation`. No binding crate in
//! use exposes it, so it is linked from ntdll directly. Each step requires a
//! specific token privilege and is skipped, not failed, when that privilege
//! cannot be enabled.

use tracing::debug;

use crate::error::{SweepError, SweepResult};
use crate::security::privileges::{self, INCREASE_QUOTA, PROFILE_SINGLE_PROCESS};

/// Information class selecting the file-cache working-set bounds.
#[cfg(windows)]
const SYSTEM_FILE_CACHE_INFORMATION: i32 = 0x0015;

/// Information class selecting memory-list commands.
#[cfg(windows)]
const SYSTEM_MEMORY_LIST_INFORMATION: i32 = 0x0050;

/// Memory-list command purging the standby page list.
#[cfg(windows)]
const MEMORY_PURGE_STANDBY_LIST: i32 = 4;

#[cfg(windows)]
#[link(name = "ntdll")]
extern "system" {
    fn NtSetSystemInformation(
        system_information_class: i32,
        system_information: *mut std::ffi::c_void,
        system_information_length: u32,
    ) -> i32;
}

/// Native word width, detected once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordWidth {
    Bits32,
    Bits64,
}

impl WordWidth {
    pub fn detect() -> Self {
        if std::mem::size_of::<usize>() == 8 {
            WordWidth::Bits64
        } else {
            WordWidth::Bits32
        }
    }
}

/// File-cache working-set bounds, narrow (32-bit word) layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct FileCacheInfoNarrow {
    pub current_size: u32,
    pub peak_size: u32,
    pub page_fault_count: u32,
    pub minimum_working_set: u32,
    pub maximum_working_set: u32,
    reserved: [u32; 4],
}

/// File-cache working-set bounds, wide (64-bit word) layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct FileCacheInfoWide {
    pub current_size: u64,
    pub peak_size: u64,
    pub page_fault_count: u64,
    pub minimum_working_set: u64,
    pub maximum_working_set: u64,
    reserved: [u64; 4],
}

/// Cache-information value in the layout the running kernel expects.
#[derive(Debug, Clone, Copy)]
pub enum FileCacheInfo {
    Narrow(FileCacheInfoNarrow),
    Wide(FileCacheInfoWide),
}

impl FileCacheInfo {
    /// Bounds set to the all-ones sentinel: the kernel shrinks the cache to
    /// whatever it judges reclaimable.
    pub fn unbounded(width: WordWidth) -> Self {
        match width {
            WordWidth::Bits32 => FileCacheInfo::Narrow(FileCacheInfoNarrow {
                minimum_working_set: u32::MAX,
                maximum_working_set: u32::MAX,
                ..Default::default()
            }),
            WordWidth::Bits64 => FileCacheInfo::Wide(FileCacheInfoWide {
                minimum_working_set: u64::MAX,
                maximum_working_set: u64::MAX,
                ..Default::default()
            }),
        }
    }

    #[cfg(windows)]
    fn as_raw_parts(&mut self) -> (*mut std::ffi::c_void, u32) {
        match self {
            FileCacheInfo::Narrow(v) => (
                v as *mut FileCacheInfoNarrow as *mut _,
                std::mem::size_of::<FileCacheInfoNarrow>() as u32,
            ),
            FileCacheInfo::Wide(v) => (
                v as *mut FileCacheInfoWide as *mut _,
                std::mem::size_of::<FileCacheInfoWide>() as u32,
            ),
        }
    }
}

/// How one purge step resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Kernel call issued and returned zero status.
    Applied,
    /// Step not attempted: privilege unavailable or opted out.
    Skipped(String),
    /// Kernel call issued and failed.
    Failed(String),
}

impl StepOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, StepOutcome::Failed(_))
    }
}

/// Options for the purge pass.
#[derive(Debug, Clone)]
pub struct PurgeOptions {
    /// Also purge the standby page list (default true).
    pub standby: bool,
}

impl Default for PurgeOptions {
    fn default() -> Self {
        Self { standby: true }
    }
}

/// Outcome of both purge steps.
#[derive(Debug, Clone)]
pub struct CachePurgeReport {
    pub file_cache: StepOutcome,
    pub standby: StepOutcome,
}

impl CachePurgeReport {
    pub fn any_failed(&self) -> bool {
        self.file_cache.is_failed() || self.standby.is_failed()
    }
}

/// Bound the file-system cache's working set and optionally purge the
/// standby list.
///
/// The two steps are independent: a skipped or failed file-cache step never
/// prevents the standby attempt, and neither aborts the run.
pub fn purge_system_caches(options: &PurgeOptions) -> CachePurgeReport {
    let file_cache = gated(INCREASE_QUOTA, set_file_cache_unbounded);
    let standby = standby_step(options);
    CachePurgeReport { file_cache, standby }
}

fn standby_step(options: &PurgeOptions) -> StepOutcome {
    if !options.standby {
        return StepOutcome::Skipped("standby purge disabled".into());
    }
    gated(PROFILE_SINGLE_PROCESS, purge_standby_list)
}

// Privilege gate: the kernel call is never attempted unless the privilege
// was enabled. The guard restores the token state once the step finishes.
fn gated<F>(privilege: &str, step: F) -> StepOutcome
where
    F: FnOnce() -> SweepResult<()>,
{
    match privileges::enable_privilege(privilege) {
        Ok(_guard) => match step() {
            Ok(()) => StepOutcome::Applied,
            Err(e) => StepOutcome::Failed(e.to_string()),
        },
        Err(e) => {
            debug!("skipping step, {} not enabled: {}", privilege, e);
            StepOutcome::Skipped(format!("privilege not enabled: {}", e))
        }
    }
}

fn set_file_cache_unbounded() -> SweepResult<()> {
    #[cfg(windows)]
    {
        let mut info = FileCacheInfo::unbounded(WordWidth::detect());
        let (ptr, len) = info.as_raw_parts();
        let status = unsafe { NtSetSystemInformation(SYSTEM_FILE_CACHE_INFORMATION, ptr, len) };
        check_status("NtSetSystemInformation(SystemFileCacheInformation)", status)
    }
    #[cfg(not(windows))]
    {
        Err(SweepError::NotSupported(
            "file-cache tuning requires Windows".into(),
        ))
    }
}

fn purge_standby_list() -> SweepResult<()> {
    #[cfg(windows)]
    {
        let mut command = MEMORY_PURGE_STANDBY_LIST;
        let status = unsafe {
            NtSetSystemInformation(
                SYSTEM_MEMORY_LIST_INFORMATION,
                &mut command as *mut i32 as *mut _,
                std::mem::size_of::<i32>() as u32,
            )
        };
        check_status("NtSetSystemInformation(SystemMemoryListInformation)", status)
    }
    #[cfg(not(windows))]
    {
        Err(SweepError::NotSupported(
            "standby-list purge requires Windows".into(),
        ))
    }
}

#[cfg(windows)]
fn check_status(api: &'static str, status: i32) -> SweepResult<()> {
    if status == 0 {
        Ok(())
    } else {
        let os_error = unsafe { windows::Win32::Foundation::GetLastError() }.0;
        Err(SweepError::NtStatus {
            api,
            status,
            os_error,
        })
    }
}
