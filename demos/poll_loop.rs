//! A tiny reactor loop that waits on a timer and a stdin descriptor
//! with `poll(2)`, re-arming the timer after every tick.
//!
//! Run with `RUST_LOG=monotimer=trace` to see the timer events.

#[cfg(unix)]
fn main() -> Result<(), monotimer::Error> {
    use monotimer::Timer;
    use std::os::fd::AsRawFd;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let timer = Timer::new()?;
    let start = timer.now()?;
    let interval = 0.25;

    timer.arm(interval)?;

    let mut fds = [
        libc::pollfd {
            fd: timer.handle().as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        },
        libc::pollfd {
            fd: libc::STDIN_FILENO,
            events: libc::POLLIN,
            revents: 0,
        },
    ];

    let mut ticks = 0;
    while ticks < 8 {
        let rc = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, -1) };
        if rc < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                continue;
            }
            return Err(monotimer::Error::Os {
                op: "poll",
                source: err,
            });
        }

        if fds[1].revents != 0 {
            println!("stdin is ready, stopping early");
            break;
        }

        if fds[0].revents & libc::POLLIN != 0 {
            if let Some(expirations) = timer.drain()? {
                ticks += 1;
                println!(
                    "tick {ticks}: {expirations} expiration(s) at +{:.3}s",
                    timer.now()? - start
                );
            }

            timer.arm(interval)?;
        }
    }

    Ok(())
}

#[cfg(not(unix))]
fn main() {
    println!("This demo polls raw descriptors and runs on Unix only.");
}
