//! Read-only view of a timer's expiration notification channel.

use crate::error::{Error, Result};
use crate::sys::{Backend, RawTimer};

use std::io;

#[cfg(unix)]
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, RawFd};

#[cfg(windows)]
use std::os::windows::io::{AsHandle, AsRawHandle, BorrowedHandle, RawHandle};

#[cfg(target_os = "linux")]
const DRAIN_OP: &str = "read";
#[cfg(target_os = "macos")]
const DRAIN_OP: &str = "kevent";
#[cfg(windows)]
const DRAIN_OP: &str = "WaitForSingleObject";

/// A pollable handle to a [`Timer`](crate::Timer)'s expirations.
///
/// The handle is readable whenever the timer has fired since the last
/// drain, which makes it suitable for `select`, `poll`, `epoll`, `kqueue`
/// or `WaitForMultipleObjects`. It borrows the timer, so it cannot
/// outlive the descriptor it refers to.
///
/// Reading follows the native timer-notification convention: every
/// successful [`Read::read`](io::Read::read) yields the expiration count
/// as an 8-byte native-endian integer. Buffers shorter than 8 bytes are
/// rejected with [`io::ErrorKind::InvalidInput`], and a non-blocking
/// handle with nothing to report returns [`io::ErrorKind::WouldBlock`].
///
/// On Linux the handle *is* the `timerfd`, so reactors can also read it
/// directly through the raw descriptor.
#[derive(Clone, Copy, Debug)]
pub struct Handle<'a> {
    inner: &'a Backend,
}

impl<'a> Handle<'a> {
    pub(crate) fn new(inner: &'a Backend) -> Self {
        Self { inner }
    }

    /// Consumes the pending expirations without blocking.
    ///
    /// Returns `None` if the timer has not fired since the last drain.
    ///
    /// Concurrent drains on a blocking timer must be serialized, see
    /// [`Timer::drain`](crate::Timer::drain).
    pub fn drain(&self) -> Result<Option<u64>> {
        let expirations = self.inner.drain().map_err(Error::os(DRAIN_OP))?;

        if let Some(count) = expirations {
            tracing::trace!(expirations = count, "timer drained");
        }

        Ok(expirations)
    }
}

impl io::Read for Handle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

#[cfg(unix)]
impl AsFd for Handle<'_> {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.inner.as_fd()
    }
}

#[cfg(unix)]
impl AsRawFd for Handle<'_> {
    fn as_raw_fd(&self) -> RawFd {
        self.inner.as_raw_fd()
    }
}

#[cfg(windows)]
impl AsHandle for Handle<'_> {
    fn as_handle(&self) -> BorrowedHandle<'_> {
        self.inner.as_handle()
    }
}

#[cfg(windows)]
impl AsRawHandle for Handle<'_> {
    fn as_raw_handle(&self) -> RawHandle {
        self.inner.as_raw_handle()
    }
}
