//! Platform-specific timer backends.
//!
//! This module provides a unified interface over the monotonic timer
//! facilities offered by each operating system:
//!
//! - `timerfd` on Linux,
//! - an `EVFILT_TIMER` registered in a private `kqueue` on macOS,
//! - a waitable timer on Windows.
//!
//! Every backend implements [`RawTimer`], the "pollable monotonic timer"
//! capability. The public [`Timer`](crate::Timer) only talks to this trait,
//! so deadline validation and conversion stay platform-independent.
//!
//! The concrete implementation is selected at compile time
//! depending on the target operating system.

use std::io;
use std::time::Duration;

#[cfg(unix)]
pub(crate) mod unix;

#[cfg(target_os = "linux")]
mod timerfd;

#[cfg(target_os = "macos")]
mod kqueue;

#[cfg(windows)]
mod waitable;

#[cfg(target_os = "linux")]
pub(crate) type Backend = timerfd::TimerFd;

#[cfg(target_os = "macos")]
pub(crate) type Backend = kqueue::KqueueTimer;

#[cfg(windows)]
pub(crate) type Backend = waitable::WaitableTimer;

#[cfg(not(any(target_os = "linux", target_os = "macos", windows)))]
compile_error!("monotimer supports Linux (timerfd), macOS (kqueue) and Windows (waitable timers)");

/// Size in bytes of one expiration counter read from a timer handle.
pub(crate) const COUNTER_LEN: usize = std::mem::size_of::<u64>();

/// Creation options forwarded from [`TimerBuilder`](crate::TimerBuilder).
#[derive(Clone, Copy, Debug)]
pub(crate) struct Options {
    /// Reads on the handle return `WouldBlock` instead of blocking.
    pub(crate) nonblocking: bool,

    /// The descriptor is not inherited by `exec`'d children.
    #[cfg_attr(windows, allow(dead_code))]
    pub(crate) close_on_exec: bool,
}

/// A pollable, single-shot timer counting on the OS monotonic clock.
///
/// Implementations own exactly one OS object and release it on drop.
/// All operations are relative to the monotonic clock returned by
/// [`RawTimer::now`].
pub(crate) trait RawTimer: Sized {
    /// Allocates a new, unarmed timer.
    fn create(options: Options) -> io::Result<Self>;

    /// Schedules a single expiration `delay` from now, replacing any
    /// pending deadline. `delay` is never zero.
    fn arm(&self, delay: Duration) -> io::Result<()>;

    /// Cancels the pending deadline and discards undrained expirations.
    fn disarm(&self) -> io::Result<()>;

    /// Returns the expirations since the last drain without blocking,
    /// or `None` if the timer has not fired.
    fn drain(&self) -> io::Result<Option<u64>>;

    /// Reads the native 8-byte expiration counter into `buf`.
    ///
    /// Honors the blocking mode the timer was created with.
    fn read(&self, buf: &mut [u8]) -> io::Result<usize>;

    /// Returns the current time of the clock the timer counts on.
    fn now(&self) -> io::Result<Duration>;
}

/// Writes `count` into `buf` using the native timer counter layout.
///
/// Used by backends whose OS object cannot be `read(2)` directly.
#[cfg_attr(target_os = "linux", allow(dead_code))]
pub(crate) fn write_counter(buf: &mut [u8], count: u64) -> io::Result<usize> {
    if buf.len() < COUNTER_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "buffer too small for the expiration counter",
        ));
    }

    buf[..COUNTER_LEN].copy_from_slice(&count.to_ne_bytes());
    Ok(COUNTER_LEN)
}
