//! Error type shared by the sweep components.

use std::fmt;

/// Error produced by a privilege, process, or kernel operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepError {
    /// A Win32 call failed; carries the error the OS reported.
    Win32 {
        api: &'static str,
        code: i32,
        message: String,
    },
    /// An NT system-information call returned a non-zero status.
    NtStatus {
        api: &'static str,
        status: i32,
        os_error: u32,
    },
    /// The token does not hold the requested privilege.
    PermissionDenied(String),
    /// Operation has no meaning on this platform.
    NotSupported(String),
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepError::Win32 { api, code, message } => {
                write!(f, "{} failed ({:#010x}): {}", api, code, message)
            }
            SweepError::NtStatus {
                api,
                status,
                os_error,
            } => {
                write!(
                    f,
                    "{} returned status {:#010x} (os error {})",
                    api, status, os_error
                )
            }
            SweepError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
            SweepError::NotSupported(msg) => write!(f, "Not supported: {}", msg),
        }
    }
}

impl std::error::Error for SweepError {}

/// Result type alias for sweep operations.
pub type SweepResult<T> = Result<T, SweepError>;

#[cfg(windows)]
impl SweepError {
    /// Wrap a `windows` crate error from the named API.
    pub(crate) fn win32(api: &'static str, err: &windows::core::Error) -> Self {
        SweepError::Win32 {
            api,
            code: err.code().0,
            message: err.message(),
        }
    }
}
