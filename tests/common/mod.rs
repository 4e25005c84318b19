#![allow(dead_code)]

use monotimer::Handle;
use std::time::Duration;

/// Upper bound on how late an expiration may be observed.
pub const TOLERANCE: Duration = Duration::from_millis(50);

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("monotimer=trace")
        .with_test_writer()
        .try_init();
}

/// Waits up to `timeout` for the handle to report readable, without
/// draining it.
#[cfg(unix)]
pub fn wait_readable(handle: &Handle<'_>, timeout: Duration) -> bool {
    use std::os::fd::AsRawFd;

    let mut pfd = libc::pollfd {
        fd: handle.as_raw_fd(),
        events: libc::POLLIN,
        revents: 0,
    };

    let rc = unsafe { libc::poll(&mut pfd, 1, timeout.as_millis() as libc::c_int) };
    assert!(rc >= 0, "poll failed: {}", std::io::Error::last_os_error());

    rc > 0 && pfd.revents & libc::POLLIN != 0
}

/// Waits up to `timeout` for the handle to be signaled, without
/// draining it.
#[cfg(windows)]
pub fn wait_readable(handle: &Handle<'_>, timeout: Duration) -> bool {
    use std::os::windows::io::AsRawHandle;
    use windows_sys::Win32::Foundation::{HANDLE, WAIT_OBJECT_0};
    use windows_sys::Win32::System::Threading::WaitForSingleObject;

    let rc = unsafe {
        WaitForSingleObject(handle.as_raw_handle() as HANDLE, timeout.as_millis() as u32)
    };

    rc == WAIT_OBJECT_0
}
