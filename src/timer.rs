//! The single-shot monotonic timer.

use crate::builder::TimerBuilder;
use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::sys::{Backend, RawTimer};

use std::time::Duration;

#[cfg(unix)]
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, RawFd};

#[cfg(windows)]
use std::os::windows::io::{AsHandle, AsRawHandle, BorrowedHandle, RawHandle};

/// Smallest delay the backends can schedule.
///
/// Zero means "disarm" to the OS facilities, so shorter delays are
/// rounded up to this.
const MIN_DELAY: Duration = Duration::from_nanos(1);

/// A single-shot timer on the OS monotonic clock, exposed as a pollable
/// handle.
///
/// The timer owns one OS descriptor for its whole lifetime and closes
/// it when dropped. At most one deadline is pending at any time:
/// arming replaces the previous deadline atomically, so a re-armed
/// timer fires once, for the latest deadline only.
///
/// Expiration is never reported through a method call on the timer
/// itself. A reactor watches [`Timer::handle`] for readability and
/// drains it once it becomes ready.
///
/// # Examples
///
/// ```rust,ignore
/// let timer = Timer::new()?;
/// timer.arm(0.25)?;
///
/// // register `timer.handle()` with the reactor, then once readable:
/// let expirations = timer.drain()?;
/// ```
#[derive(Debug)]
pub struct Timer {
    inner: Backend,
}

impl Timer {
    /// Creates a new, unarmed timer with default options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Resource`] if the OS cannot allocate the timer.
    pub fn new() -> Result<Self> {
        TimerBuilder::new().build()
    }

    /// Returns a [`TimerBuilder`] to configure the descriptor.
    pub fn builder() -> TimerBuilder {
        TimerBuilder::new()
    }

    pub(crate) fn from_backend(inner: Backend) -> Self {
        tracing::debug!(timer = ?inner, "timer created");

        Self { inner }
    }

    /// Returns the pollable handle of the timer.
    ///
    /// The handle becomes readable when the timer expires and stays
    /// readable until drained. It can only observe the timer, not arm it.
    pub fn handle(&self) -> Handle<'_> {
        Handle::new(&self.inner)
    }

    /// Arms the timer to fire `seconds` from now.
    ///
    /// The deadline is relative to the call. Any pending deadline is
    /// replaced, along with expirations that were not drained yet.
    /// `0.0` fires as soon as possible. Deadlines beyond what the OS can
    /// represent, including infinity, saturate to the farthest one.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidDeadline`] if `seconds` is negative or NaN.
    ///   The timer is left untouched.
    /// - [`Error::Os`] if the OS rejects the new deadline.
    pub fn arm(&self, seconds: f64) -> Result<()> {
        let delay = delay_from_secs(seconds)?;

        self.arm_after(delay)
    }

    /// Arms the timer to fire after `delay`.
    ///
    /// Same semantics as [`Timer::arm`]; a zero delay fires as soon as
    /// possible instead of disarming.
    pub fn arm_after(&self, delay: Duration) -> Result<()> {
        let delay = delay.max(MIN_DELAY);

        tracing::trace!(?delay, "arming timer");

        self.inner.arm(delay).map_err(Error::os(ARM_OP))
    }

    /// Cancels the pending deadline.
    ///
    /// Expirations that were not drained yet are discarded, so the handle
    /// is not readable afterwards. Disarming an unarmed timer does nothing.
    pub fn disarm(&self) -> Result<()> {
        tracing::trace!("disarming timer");

        self.inner.disarm().map_err(Error::os(ARM_OP))
    }

    /// Consumes the pending expirations without blocking.
    ///
    /// Returns the number of expirations since the last drain, or `None`
    /// if the timer has not fired.
    ///
    /// On a blocking timer, concurrent drains must be serialized by the
    /// caller: another reader may consume the expiration between the
    /// readiness check and the read, and the read then blocks.
    pub fn drain(&self) -> Result<Option<u64>> {
        self.handle().drain()
    }

    /// Returns the current monotonic time, in seconds.
    ///
    /// The epoch is unspecified but stable: only differences between
    /// calls are meaningful. This is the clock deadlines count on.
    pub fn now(&self) -> Result<f64> {
        Ok(self.now_duration()?.as_secs_f64())
    }

    /// Returns the current monotonic time as a [`Duration`] since the
    /// clock's epoch.
    pub fn now_duration(&self) -> Result<Duration> {
        self.inner.now().map_err(Error::os(CLOCK_OP))
    }
}

#[cfg(target_os = "linux")]
const ARM_OP: &str = "timerfd_settime";
#[cfg(target_os = "macos")]
const ARM_OP: &str = "kevent";
#[cfg(windows)]
const ARM_OP: &str = "SetWaitableTimer";

#[cfg(unix)]
const CLOCK_OP: &str = "clock_gettime";
#[cfg(windows)]
const CLOCK_OP: &str = "QueryPerformanceCounter";

/// Converts a deadline in seconds into a delay.
///
/// Rejects negative and NaN values. Values too large for a `Duration`
/// saturate; the backends clamp further to what the OS accepts. Zero is
/// kept as is; callers round it up to [`MIN_DELAY`].
fn delay_from_secs(seconds: f64) -> Result<Duration> {
    if seconds.is_nan() || seconds < 0.0 {
        return Err(Error::InvalidDeadline(seconds));
    }

    Ok(Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX))
}

#[cfg(unix)]
impl AsFd for Timer {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.inner.as_fd()
    }
}

#[cfg(unix)]
impl AsRawFd for Timer {
    fn as_raw_fd(&self) -> RawFd {
        self.inner.as_raw_fd()
    }
}

#[cfg(windows)]
impl AsHandle for Timer {
    fn as_handle(&self) -> BorrowedHandle<'_> {
        self.inner.as_handle()
    }
}

#[cfg(windows)]
impl AsRawHandle for Timer {
    fn as_raw_handle(&self) -> RawHandle {
        self.inner.as_raw_handle()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        // The backend closes the descriptor itself.
        tracing::debug!(timer = ?self.inner, "timer closed");
    }
}

#[cfg(all(unix, feature = "mio"))]
impl mio::event::Source for Timer {
    fn register(
        &mut self,
        registry: &mio::Registry,
        token: mio::Token,
        interests: mio::Interest,
    ) -> std::io::Result<()> {
        mio::unix::SourceFd(&self.as_raw_fd()).register(registry, token, interests)
    }

    fn reregister(
        &mut self,
        registry: &mio::Registry,
        token: mio::Token,
        interests: mio::Interest,
    ) -> std::io::Result<()> {
        mio::unix::SourceFd(&self.as_raw_fd()).reregister(registry, token, interests)
    }

    fn deregister(&mut self, registry: &mio::Registry) -> std::io::Result<()> {
        mio::unix::SourceFd(&self.as_raw_fd()).deregister(registry)
    }
}
