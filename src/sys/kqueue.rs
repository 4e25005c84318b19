//! macOS `kqueue`-based timer backend.
//!
//! macOS has no `timerfd`. Instead, each timer owns a private `kqueue`
//! holding a single one-shot `EVFILT_TIMER`. A kqueue descriptor is
//! itself pollable: it reports readable while it has pending events,
//! so it can be registered with `select`/`poll`/another `kqueue` exactly
//! like a `timerfd`.
//!
//! Reads are emulated: draining the pending timer event yields the same
//! 8-byte expiration counter a `timerfd` would return.

use super::unix::{cvt, sys_monotonic_now, sys_poll_readable, sys_set_cloexec};
use super::{Options, RawTimer, write_counter};

use libc::{
    EV_ADD, EV_DELETE, EV_ENABLE, EV_ERROR, EV_ONESHOT, EV_RECEIPT, EVFILT_TIMER, NOTE_NSECONDS,
    c_int, intptr_t, kevent, kqueue, timespec, uintptr_t,
};
use std::io;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd, OwnedFd, RawFd};
use std::ptr;
use std::time::Duration;

/// Identifier of the single timer registered in the private kqueue.
const TIMER_IDENT: uintptr_t = 1;

/// macOS `kqueue` timer.
///
/// Owns the kqueue descriptor through an [`OwnedFd`]; closing it also
/// destroys the registered `EVFILT_TIMER`.
#[derive(Debug)]
pub(crate) struct KqueueTimer {
    kq: OwnedFd,
    nonblocking: bool,
}

fn timer_event(flags: u16, nanos: intptr_t) -> kevent {
    kevent {
        ident: TIMER_IDENT,
        filter: EVFILT_TIMER,
        flags,
        fflags: NOTE_NSECONDS,
        data: nanos,
        udata: ptr::null_mut(),
    }
}

impl KqueueTimer {
    /// Applies `changes` with `EV_RECEIPT` so every change reports its
    /// own status. `ENOENT` on a delete is not an error.
    fn apply(&self, changes: &[kevent]) -> io::Result<()> {
        let mut receipts: Vec<kevent> = changes.to_vec();

        let n = cvt(unsafe {
            kevent(
                self.kq.as_raw_fd(),
                changes.as_ptr(),
                changes.len() as c_int,
                receipts.as_mut_ptr(),
                receipts.len() as c_int,
                ptr::null(),
            )
        })?;

        for receipt in &receipts[..n as usize] {
            if receipt.flags & EV_ERROR == 0 || receipt.data == 0 {
                continue;
            }

            let errno = receipt.data as i32;
            if errno == libc::ENOENT && receipt.flags & EV_DELETE != 0 {
                continue;
            }

            return Err(io::Error::from_raw_os_error(errno));
        }

        Ok(())
    }

    /// Dequeues the pending timer event, waiting only if `block` is set.
    fn take_event(&self, block: bool) -> io::Result<Option<u64>> {
        let zero = timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        let timeout: *const timespec = if block { ptr::null() } else { &zero };

        let mut event = timer_event(0, 0);

        loop {
            let rc = unsafe { kevent(self.kq.as_raw_fd(), ptr::null(), 0, &mut event, 1, timeout) };
            if rc < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(err);
            }

            if rc == 0 {
                return Ok(None);
            }

            // `data` holds the number of expirations; a one-shot timer
            // reports at least one.
            return Ok(Some((event.data as u64).max(1)));
        }
    }
}

impl RawTimer for KqueueTimer {
    fn create(options: Options) -> io::Result<Self> {
        let fd = cvt(unsafe { kqueue() })?;
        let kq = unsafe { OwnedFd::from_raw_fd(fd) };

        if options.close_on_exec {
            sys_set_cloexec(kq.as_raw_fd())?;
        }

        Ok(Self {
            kq,
            nonblocking: options.nonblocking,
        })
    }

    fn arm(&self, delay: Duration) -> io::Result<()> {
        debug_assert!(!delay.is_zero());

        let nanos = intptr_t::try_from(delay.as_nanos()).unwrap_or(intptr_t::MAX);

        // A single EV_ADD modifies an existing timer in place; there is no
        // delete that could succeed on its own. `nanos` is always in
        // 1..=intptr_t::MAX, the range the kernel accepts, so the change
        // cannot be refused for its value. Touching the timer also resets
        // its fired state: an expiration of the old deadline that was not
        // drained yet is not delivered afterwards.
        self.apply(&[timer_event(
            EV_ADD | EV_ENABLE | EV_ONESHOT | EV_RECEIPT,
            nanos,
        )])
    }

    fn disarm(&self) -> io::Result<()> {
        self.apply(&[timer_event(EV_DELETE | EV_RECEIPT, 0)])
    }

    fn drain(&self) -> io::Result<Option<u64>> {
        if !sys_poll_readable(self.kq.as_raw_fd())? {
            return Ok(None);
        }

        self.take_event(false)
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        // Validate the buffer before consuming the event.
        write_counter(buf, 0)?;

        match self.take_event(!self.nonblocking)? {
            Some(count) => write_counter(buf, count),
            None => Err(io::ErrorKind::WouldBlock.into()),
        }
    }

    fn now(&self) -> io::Result<Duration> {
        sys_monotonic_now()
    }
}

impl AsFd for KqueueTimer {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.kq.as_fd()
    }
}

impl AsRawFd for KqueueTimer {
    fn as_raw_fd(&self) -> RawFd {
        self.kq.as_raw_fd()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::thread;

    fn timer() -> KqueueTimer {
        KqueueTimer::create(Options {
            nonblocking: true,
            close_on_exec: true,
        })
        .unwrap()
    }

    #[test]
    fn rearm_replaces_deadline_in_place() {
        let timer = timer();

        timer.arm(Duration::from_secs(1)).unwrap();
        timer.arm(Duration::from_millis(10)).unwrap();
        thread::sleep(Duration::from_millis(60));

        assert_eq!(timer.drain().unwrap(), Some(1));
        assert_eq!(timer.drain().unwrap(), None);
    }

    #[test]
    fn rearm_drops_undrained_expiration() {
        let timer = timer();

        timer.arm(Duration::from_nanos(1)).unwrap();
        thread::sleep(Duration::from_millis(20));
        assert!(sys_poll_readable(timer.as_raw_fd()).unwrap());

        timer.arm(Duration::from_secs(5)).unwrap();
        assert_eq!(timer.drain().unwrap(), None);
    }

    #[test]
    fn saturated_rearm_is_accepted() {
        let timer = timer();

        timer.arm(Duration::from_millis(20)).unwrap();
        timer.arm(Duration::MAX).unwrap();
        thread::sleep(Duration::from_millis(70));

        assert_eq!(timer.drain().unwrap(), None);
    }
}
