//! Token privilege management
//!
//! The kernel calls that tune the file cache and standby list each require a
//! specific privilege to be enabled on the process token. [`enable_privilege`]
//! turns one on and hands back a guard that restores the token's previous
//! state when dropped, so a privilege stays enabled only for the duration of
//! the operation that needed it.

use crate::error::{SweepError, SweepResult};

/// Privilege required to set the file-cache working-set bounds.
pub const INCREASE_QUOTA: &str = "SeIncreaseQuotaPrivilege";

/// Privilege required to purge the standby page list.
pub const PROFILE_SINGLE_PROCESS: &str = "SeProfileSingleProcessPrivilege";

/// Holds a privilege enabled; re-applies the previous token state on drop.
#[cfg(windows)]
pub struct PrivilegeGuard {
    token: windows::Win32::Foundation::HANDLE,
    previous: windows::Win32::Security::TOKEN_PRIVILEGES,
    restore: bool,
}

#[cfg(not(windows))]
#[derive(Debug)]
pub struct PrivilegeGuard;

#[cfg(windows)]
impl Drop for PrivilegeGuard {
    fn drop(&mut self) {
        use windows::Win32::Foundation::CloseHandle;
        use windows::Win32::Security::AdjustTokenPrivileges;

        unsafe {
            if self.restore && self.previous.PrivilegeCount > 0 {
                let _ = AdjustTokenPrivileges(self.token, false, Some(&self.previous), 0, None, None);
            }
            let _ = CloseHandle(self.token);
        }
    }
}

/// Enable a named privilege on the current process token.
///
/// Resolves the name to its LUID, applies a count=1 enabled adjustment, and
/// captures the prior state for the returned guard. A token that does not
/// hold the privilege at all reports `ERROR_NOT_ALL_ASSIGNED`, which is
/// surfaced as [`SweepError::PermissionDenied`]. No partial state is rolled
/// back on failure: a failed LUID lookup means no adjustment was attempted,
/// and a failed adjustment leaves the token as the OS left it.
pub fn enable_privilege(name: &str) -> SweepResult<PrivilegeGuard> {
    #[cfg(windows)]
    {
        use std::mem::size_of;
        use windows::core::{HSTRING, PCWSTR};
        use windows::Win32::Foundation::{
            CloseHandle, GetLastError, SetLastError, ERROR_NOT_ALL_ASSIGNED, HANDLE, LUID,
            WIN32_ERROR,
        };
        use windows::Win32::Security::{
            AdjustTokenPrivileges, LookupPrivilegeValueW, LUID_AND_ATTRIBUTES,
            SE_PRIVILEGE_ENABLED, TOKEN_ADJUST_PRIVILEGES, TOKEN_PRIVILEGES, TOKEN_QUERY,
        };
        use windows::Win32::System::Threading::{GetCurrentProcess, OpenProcessToken};

        unsafe {
            let mut token = HANDLE::default();
            OpenProcessToken(
                GetCurrentProcess(),
                TOKEN_QUERY | TOKEN_ADJUST_PRIVILEGES,
                &mut token,
            )
            .map_err(|e| SweepError::win32("OpenProcessToken", &e))?;

            let mut luid = LUID::default();
            if let Err(e) = LookupPrivilegeValueW(PCWSTR::null(), &HSTRING::from(name), &mut luid)
            {
                let _ = CloseHandle(token);
                return Err(SweepError::win32("LookupPrivilegeValueW", &e));
            }

            let new_state = TOKEN_PRIVILEGES {
                PrivilegeCount: 1,
                Privileges: [LUID_AND_ATTRIBUTES {
                    Luid: luid,
                    Attributes: SE_PRIVILEGE_ENABLED,
                }],
            };
            let mut previous = TOKEN_PRIVILEGES::default();
            let mut previous_len = 0u32;

            SetLastError(WIN32_ERROR(0));
            if let Err(e) = AdjustTokenPrivileges(
                token,
                false,
                Some(&new_state),
                size_of::<TOKEN_PRIVILEGES>() as u32,
                Some(&mut previous),
                Some(&mut previous_len),
            ) {
                let _ = CloseHandle(token);
                return Err(SweepError::win32("AdjustTokenPrivileges", &e));
            }

            // TRUE with ERROR_NOT_ALL_ASSIGNED means the token never held it.
            if GetLastError() == ERROR_NOT_ALL_ASSIGNED {
                let _ = CloseHandle(token);
                return Err(SweepError::PermissionDenied(name.to_string()));
            }

            tracing::debug!("enabled {}", name);
            Ok(PrivilegeGuard {
                token,
                previous,
                restore: previous_len as usize <= size_of::<TOKEN_PRIVILEGES>(),
            })
        }
    }
    #[cfg(not(windows))]
    {
        Err(SweepError::NotSupported(format!(
            "privilege {} requires Windows",
            name
        )))
    }
}

/// Whether the process token is elevated (running as administrator).
pub fn is_elevated() -> bool {
    #[cfg(windows)]
    {
        use std::mem::size_of;
        use windows::Win32::Foundation::{CloseHandle, HANDLE};
        use windows::Win32::Security::{
            GetTokenInformation, TokenElevation, TOKEN_ELEVATION, TOKEN_QUERY,
        };
        use windows::Win32::System::Threading::{GetCurrentProcess, OpenProcessToken};

        unsafe {
            let mut token = HANDLE::default();
            if OpenProcessToken(GetCurrentProcess(), TOKEN_QUERY, &mut token).is_err() {
                return false;
            }

            let mut elevation = TOKEN_ELEVATION::default();
            let mut size = 0u32;
            let result = GetTokenInformation(
                token,
                TokenElevation,
                Some(&mut elevation as *mut _ as *mut _),
                size_of::<TOKEN_ELEVATION>() as u32,
                &mut size,
            );
            let _ = CloseHandle(token);
            result.is_ok() && elevation.TokenIsElevated != 0
        }
    }
    #[cfg(not(windows))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(windows))]
    #[test]
    fn enable_privilege_reports_unsupported_off_windows() {
        let err = enable_privilege(INCREASE_QUOTA).unwrap_err();
        assert!(matches!(err, SweepError::NotSupported(_)));
        assert!(err.to_string().contains(INCREASE_QUOTA));
    }

    #[cfg(not(windows))]
    #[test]
    fn elevation_is_false_off_windows() {
        assert!(!is_elevated());
    }
}
