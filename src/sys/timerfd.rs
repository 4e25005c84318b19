//! Linux `timerfd`-based timer backend.
//!
//! The timer is a `timerfd` created on `CLOCK_MONOTONIC`. The descriptor
//! itself is the pollable handle: it becomes readable when the timer
//! expires and a `read(2)` returns the 8-byte expiration counter.
//!
//! Deadlines are always relative (`timerfd_settime` without
//! `TFD_TIMER_ABSTIME`) and never periodic (`it_interval` is zero).

use super::unix::{cvt, duration_to_timespec, sys_monotonic_now, sys_poll_readable, sys_read};
use super::{COUNTER_LEN, Options, RawTimer};

use libc::{
    CLOCK_MONOTONIC, TFD_CLOEXEC, TFD_NONBLOCK, itimerspec, timerfd_create, timerfd_settime,
    timespec,
};
use std::io;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd, OwnedFd, RawFd};
use std::ptr;
use std::time::Duration;

/// Linux `timerfd` timer.
///
/// Owns the descriptor through an [`OwnedFd`], which closes it
/// exactly once when the timer is dropped.
#[derive(Debug)]
pub(crate) struct TimerFd {
    fd: OwnedFd,
}

impl TimerFd {
    fn settime(&self, value: timespec) -> io::Result<()> {
        let spec = itimerspec {
            it_interval: timespec {
                tv_sec: 0,
                tv_nsec: 0,
            },
            it_value: value,
        };

        cvt(unsafe { timerfd_settime(self.fd.as_raw_fd(), 0, &spec, ptr::null_mut()) })?;

        Ok(())
    }
}

impl RawTimer for TimerFd {
    fn create(options: Options) -> io::Result<Self> {
        let mut flags = 0;

        if options.nonblocking {
            flags |= TFD_NONBLOCK;
        }
        if options.close_on_exec {
            flags |= TFD_CLOEXEC;
        }

        let fd = cvt(unsafe { timerfd_create(CLOCK_MONOTONIC, flags) })?;

        Ok(Self {
            fd: unsafe { OwnedFd::from_raw_fd(fd) },
        })
    }

    fn arm(&self, delay: Duration) -> io::Result<()> {
        // An all-zero it_value disarms a timerfd.
        debug_assert!(!delay.is_zero());

        self.settime(duration_to_timespec(delay))
    }

    fn disarm(&self) -> io::Result<()> {
        self.settime(timespec {
            tv_sec: 0,
            tv_nsec: 0,
        })?;

        // Re-setting the timer already resets the pending counter,
        // this only flushes a read that raced with the call.
        let _ = self.drain()?;

        Ok(())
    }

    fn drain(&self) -> io::Result<Option<u64>> {
        // Not atomic: a racing reader on a blocking fd leaves this read blocked.
        if !sys_poll_readable(self.fd.as_raw_fd())? {
            return Ok(None);
        }

        let mut buf = [0u8; COUNTER_LEN];
        match sys_read(self.fd.as_raw_fd(), &mut buf) {
            Ok(COUNTER_LEN) => Ok(Some(u64::from_ne_bytes(buf))),
            Ok(n) => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("short timerfd read: {n} bytes"),
            )),
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        sys_read(self.fd.as_raw_fd(), buf)
    }

    fn now(&self) -> io::Result<Duration> {
        sys_monotonic_now()
    }
}

impl AsFd for TimerFd {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

impl AsRawFd for TimerFd {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }
}
