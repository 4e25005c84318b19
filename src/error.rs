use std::io;

use thiserror::Error;

/// Errors returned by [`Timer`](crate::Timer) operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The deadline was negative, NaN, infinite or too large to schedule.
    ///
    /// Raised before any syscall; the timer state is unchanged.
    #[error("time must be positive or zero, got {0}")]
    InvalidDeadline(f64),

    /// The OS could not allocate the timer descriptor.
    #[error("failed to allocate timer: {0}")]
    Resource(#[source] io::Error),

    /// A clock query or timer syscall failed.
    #[error("{op}() failed: {source}")]
    Os {
        /// Name of the failing OS call.
        op: &'static str,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn os(op: &'static str) -> impl FnOnce(io::Error) -> Self {
        move |source| Error::Os { op, source }
    }

    /// Returns the native error code carried by OS failures.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Error::InvalidDeadline(_) => None,
            Error::Resource(err) | Error::Os { source: err, .. } => err.raw_os_error(),
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidDeadline(_) => io::Error::new(io::ErrorKind::InvalidInput, err),
            Error::Resource(source) | Error::Os { source, .. } => source,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_error_keeps_native_code() {
        let err = Error::os("timerfd_settime")(io::Error::from_raw_os_error(libc::EINVAL));

        assert_eq!(err.raw_os_error(), Some(libc::EINVAL));
        assert!(err.to_string().starts_with("timerfd_settime() failed:"));
    }

    #[test]
    fn invalid_deadline_maps_to_invalid_input() {
        let err: io::Error = Error::InvalidDeadline(-1.0).into();

        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert_eq!(err.to_string(), "time must be positive or zero, got -1");
    }
}
