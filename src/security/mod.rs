//! Token and privilege handling

pub mod privileges;

pub use privileges::{enable_privilege, is_elevated, PrivilegeGuard};
