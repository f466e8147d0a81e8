/// Check if the process is running as root
#[cfg(unix)]
pub fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

/// Root only has a meaning on POSIX systems
#[cfg(not(unix))]
pub fn is_root() -> bool {
    false
}
