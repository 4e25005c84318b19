//! Windows waitable-timer backend.
//!
//! The timer is a manual-reset waitable timer. Its handle is signaled when
//! the deadline passes and stays signaled until drained, like a readable
//! `timerfd`, so waiting on it with `WaitForSingleObject` or
//! `WaitForMultipleObjects` does not consume the expiration. A drain
//! reports one expiration and resets the signal.
//!
//! The clock is the performance counter, a monotonic clock unaffected by
//! wall-clock changes.

use super::{Options, RawTimer, write_counter};

use std::io;
use std::os::windows::io::{
    AsHandle, AsRawHandle, BorrowedHandle, FromRawHandle, OwnedHandle, RawHandle,
};
use std::ptr;
use std::time::Duration;

use windows_sys::Win32::Foundation::{HANDLE, WAIT_FAILED, WAIT_OBJECT_0, WAIT_TIMEOUT};
use windows_sys::Win32::System::Performance::{QueryPerformanceCounter, QueryPerformanceFrequency};
use windows_sys::Win32::System::Threading::{
    CREATE_WAITABLE_TIMER_MANUAL_RESET, CancelWaitableTimer, CreateWaitableTimerExW, INFINITE,
    SetWaitableTimer, TIMER_ALL_ACCESS, WaitForSingleObject,
};

/// Due times are expressed in 100-nanosecond intervals.
const NANOS_PER_TICK: u128 = 100;

/// Windows waitable timer.
///
/// Owns the timer through an [`OwnedHandle`], which calls
/// `CloseHandle` exactly once when dropped.
#[derive(Debug)]
pub(crate) struct WaitableTimer {
    handle: OwnedHandle,
    nonblocking: bool,
    frequency: u64,
}

impl WaitableTimer {
    fn raw(&self) -> HANDLE {
        self.handle.as_raw_handle() as HANDLE
    }

    fn set(&self, due: i64) -> io::Result<()> {
        let ok = unsafe { SetWaitableTimer(self.raw(), &due, 0, None, ptr::null(), 0) };
        if ok == 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(())
    }

    /// Clears the signaled state and leaves the timer inactive.
    ///
    /// Setting a timer resets its signal; cancelling right after keeps it
    /// from ever firing.
    fn reset(&self) -> io::Result<()> {
        self.set(-i64::MAX)?;

        if unsafe { CancelWaitableTimer(self.raw()) } == 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(())
    }

    /// Consumes the signaled state, waiting at most `millis`.
    fn wait(&self, millis: u32) -> io::Result<Option<u64>> {
        match unsafe { WaitForSingleObject(self.raw(), millis) } {
            WAIT_OBJECT_0 => {
                self.reset()?;
                Ok(Some(1))
            }
            WAIT_TIMEOUT => Ok(None),
            WAIT_FAILED => Err(io::Error::last_os_error()),
            other => Err(io::Error::other(format!("unexpected wait status {other:#x}"))),
        }
    }
}

impl RawTimer for WaitableTimer {
    fn create(options: Options) -> io::Result<Self> {
        let mut frequency = 0i64;
        if unsafe { QueryPerformanceFrequency(&mut frequency) } == 0 {
            return Err(io::Error::last_os_error());
        }

        // Handles are not inheritable unless asked for, so
        // `close_on_exec` needs no extra work here.
        let raw = unsafe {
            CreateWaitableTimerExW(
                ptr::null(),
                ptr::null(),
                CREATE_WAITABLE_TIMER_MANUAL_RESET,
                TIMER_ALL_ACCESS,
            )
        };
        if raw.is_null() {
            return Err(io::Error::last_os_error());
        }

        Ok(Self {
            handle: unsafe { OwnedHandle::from_raw_handle(raw as RawHandle) },
            nonblocking: options.nonblocking,
            frequency: frequency as u64,
        })
    }

    fn arm(&self, delay: Duration) -> io::Result<()> {
        debug_assert!(!delay.is_zero());

        // Negative due times are relative to the call.
        let ticks = delay.as_nanos().div_ceil(NANOS_PER_TICK).max(1);
        let due = -i64::try_from(ticks).unwrap_or(i64::MAX);

        self.set(due)
    }

    fn disarm(&self) -> io::Result<()> {
        // Cancelling alone does not reset a timer that already fired.
        self.reset()
    }

    fn drain(&self) -> io::Result<Option<u64>> {
        self.wait(0)
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        write_counter(buf, 0)?;

        let millis = if self.nonblocking { 0 } else { INFINITE };
        match self.wait(millis)? {
            Some(count) => write_counter(buf, count),
            None => Err(io::ErrorKind::WouldBlock.into()),
        }
    }

    fn now(&self) -> io::Result<Duration> {
        let mut counter = 0i64;
        if unsafe { QueryPerformanceCounter(&mut counter) } == 0 {
            return Err(io::Error::last_os_error());
        }

        let counter = counter as u64;
        let secs = counter / self.frequency;
        let nanos = (counter % self.frequency) * 1_000_000_000 / self.frequency;

        Ok(Duration::new(secs, nanos as u32))
    }
}

impl AsHandle for WaitableTimer {
    fn as_handle(&self) -> BorrowedHandle<'_> {
        self.handle.as_handle()
    }
}

impl AsRawHandle for WaitableTimer {
    fn as_raw_handle(&self) -> RawHandle {
        self.handle.as_raw_handle()
    }
}
