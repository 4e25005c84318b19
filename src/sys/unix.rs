//! Unix syscall helpers shared by the `timerfd` and `kqueue` backends.

use libc::{
    CLOCK_MONOTONIC, F_GETFD, F_SETFD, FD_CLOEXEC, POLLIN, c_int, clock_gettime, fcntl, poll, pollfd,
    read, time_t, timespec,
};
use std::io;
use std::os::fd::RawFd;
use std::time::Duration;

/// Converts a `-1` syscall return into the current `errno`.
pub(crate) fn cvt(rc: c_int) -> io::Result<c_int> {
    if rc < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(rc)
    }
}

/// Reads from a file descriptor into the given buffer.
///
/// Returns the number of bytes read.
pub(crate) fn sys_read(fd: RawFd, buffer: &mut [u8]) -> io::Result<usize> {
    let n = unsafe { read(fd, buffer.as_mut_ptr() as *mut _, buffer.len()) };
    if n < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(n as usize)
    }
}

/// Returns `true` if the descriptor is readable right now.
///
/// Never blocks: polls with a zero timeout.
pub(crate) fn sys_poll_readable(fd: RawFd) -> io::Result<bool> {
    let mut pfd = pollfd {
        fd,
        events: POLLIN,
        revents: 0,
    };

    loop {
        let rc = unsafe { poll(&mut pfd, 1, 0) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }

        return Ok(rc > 0 && pfd.revents & POLLIN != 0);
    }
}

/// Marks a file descriptor close-on-exec.
#[cfg_attr(target_os = "linux", allow(dead_code))]
pub(crate) fn sys_set_cloexec(fd: RawFd) -> io::Result<()> {
    let flags = cvt(unsafe { fcntl(fd, F_GETFD) })?;
    cvt(unsafe { fcntl(fd, F_SETFD, flags | FD_CLOEXEC) })?;

    Ok(())
}

/// Reads `CLOCK_MONOTONIC`.
pub(crate) fn sys_monotonic_now() -> io::Result<Duration> {
    let mut ts = timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };

    cvt(unsafe { clock_gettime(CLOCK_MONOTONIC, &mut ts) })?;

    Ok(Duration::new(ts.tv_sec as u64, ts.tv_nsec as u32))
}

/// Converts a duration to a `timespec`, saturating at the largest
/// representable number of seconds.
pub(crate) fn duration_to_timespec(duration: Duration) -> timespec {
    let tv_sec = time_t::try_from(duration.as_secs()).unwrap_or(time_t::MAX);

    timespec {
        tv_sec,
        tv_nsec: duration.subsec_nanos() as _,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timespec_splits_seconds_and_nanos() {
        let ts = duration_to_timespec(Duration::new(3, 250_000_000));

        assert_eq!(ts.tv_sec, 3);
        assert_eq!(ts.tv_nsec, 250_000_000);
    }

    #[test]
    fn timespec_saturates_huge_durations() {
        let ts = duration_to_timespec(Duration::MAX);

        assert_eq!(ts.tv_sec, time_t::MAX);
    }

    #[test]
    fn monotonic_clock_is_readable() {
        let first = sys_monotonic_now().unwrap();
        let second = sys_monotonic_now().unwrap();

        assert!(second >= first);
    }
}
