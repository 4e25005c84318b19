use crate::error::{Error, Result};
use crate::sys::{Backend, Options, RawTimer};
use crate::timer::Timer;

/// Builder for configuring and creating a timer.
///
/// `TimerBuilder` allows customizing how the underlying OS descriptor is
/// created before constructing the [`Timer`].
///
/// # Examples
///
/// ```rust,ignore
/// let timer = TimerBuilder::new()
///     .nonblocking(false)
///     .build()?;
/// ```
#[derive(Clone, Copy, Debug)]
pub struct TimerBuilder {
    /// Whether reads on the handle return `WouldBlock` instead of blocking.
    nonblocking: bool,

    /// Whether the descriptor is closed on `exec`.
    close_on_exec: bool,
}

impl TimerBuilder {
    /// Creates a new `TimerBuilder` with default configuration.
    ///
    /// By default the handle is non-blocking and close-on-exec, which is
    /// what a readiness-based reactor expects.
    pub fn new() -> Self {
        Self {
            nonblocking: true,
            close_on_exec: true,
        }
    }

    /// Sets whether reads on the timer handle are non-blocking.
    ///
    /// A blocking handle suspends the reading thread until the timer
    /// expires. [`Timer::drain`] never blocks either way.
    pub fn nonblocking(mut self, nonblocking: bool) -> Self {
        self.nonblocking = nonblocking;
        self
    }

    /// Sets whether the descriptor is closed in `exec`'d children.
    ///
    /// Has no effect on Windows, where timer handles are never inherited.
    pub fn close_on_exec(mut self, close_on_exec: bool) -> Self {
        self.close_on_exec = close_on_exec;
        self
    }

    /// Allocates the timer with the configured options.
    ///
    /// The timer starts unarmed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Resource`] if the OS refuses to allocate the
    /// descriptor, e.g. when the process is out of file descriptors.
    pub fn build(self) -> Result<Timer> {
        let options = Options {
            nonblocking: self.nonblocking,
            close_on_exec: self.close_on_exec,
        };

        let inner = Backend::create(options).map_err(Error::Resource)?;

        Ok(Timer::from_backend(inner))
    }
}

impl Default for TimerBuilder {
    /// Creates a default `TimerBuilder`.
    fn default() -> Self {
        Self::new()
    }
}
