mod common;

use common::{TOLERANCE, wait_readable};
use monotimer::Timer;
use std::io::{ErrorKind, Read};
use std::time::{Duration, Instant};

#[test]
fn test_read_yields_expiration_counter() {
    let timer = Timer::new().unwrap();

    timer.arm(0.0).unwrap();
    assert!(wait_readable(&timer.handle(), TOLERANCE));

    let mut buf = [0u8; 8];
    let n = timer.handle().read(&mut buf).unwrap();

    assert_eq!(n, 8);
    assert!(u64::from_ne_bytes(buf) >= 1);
    assert!(
        !wait_readable(&timer.handle(), Duration::ZERO),
        "Reading should drain the handle"
    );
}

#[test]
fn test_read_rejects_short_buffer() {
    let timer = Timer::new().unwrap();

    timer.arm(0.0).unwrap();
    assert!(wait_readable(&timer.handle(), TOLERANCE));

    let mut buf = [0u8; 4];
    let err = timer.handle().read(&mut buf).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(
        wait_readable(&timer.handle(), Duration::ZERO),
        "A rejected read must not consume the expiration"
    );
}

#[test]
fn test_nonblocking_read_would_block() {
    let timer = Timer::new().unwrap();

    let mut buf = [0u8; 8];
    let err = timer.handle().read(&mut buf).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::WouldBlock);
}

#[test]
fn test_blocking_read_waits_for_expiration() {
    let timer = Timer::builder().nonblocking(false).build().unwrap();
    let start = Instant::now();

    timer.arm(0.05).unwrap();

    let mut buf = [0u8; 8];
    let n = timer.handle().read(&mut buf).unwrap();

    assert_eq!(n, 8);
    assert_eq!(u64::from_ne_bytes(buf), 1);
    assert!(start.elapsed() >= Duration::from_millis(49));
}

#[test]
fn test_drain_never_blocks_on_blocking_handle() {
    let timer = Timer::builder().nonblocking(false).build().unwrap();
    let start = Instant::now();

    timer.arm(10.0).unwrap();

    assert!(timer.handle().drain().unwrap().is_none());
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[cfg(unix)]
#[test]
fn test_handle_exposes_timer_descriptor() {
    use std::os::fd::AsRawFd;

    let timer = Timer::new().unwrap();

    assert_eq!(timer.handle().as_raw_fd(), timer.as_raw_fd());
}

#[cfg(target_os = "linux")]
#[test]
fn test_raw_descriptor_follows_timerfd_convention() {
    use std::os::fd::AsRawFd;

    let timer = Timer::new().unwrap();

    timer.arm(0.0).unwrap();
    assert!(wait_readable(&timer.handle(), TOLERANCE));

    let mut count = 0u64;
    let n = unsafe {
        libc::read(
            timer.handle().as_raw_fd(),
            &mut count as *mut u64 as *mut _,
            std::mem::size_of::<u64>(),
        )
    };

    assert_eq!(n, 8);
    assert_eq!(count, 1);
}
