mod common;

use common::wait_readable;
use monotimer::Timer;
use std::thread;
use std::time::Duration;

#[test]
fn test_now_is_non_decreasing() {
    let timer = Timer::new().unwrap();
    let mut previous = timer.now().unwrap();

    for _ in 0..10_000 {
        let current = timer.now().unwrap();
        assert!(current >= previous, "now() went backwards: {previous} -> {current}");
        previous = current;
    }
}

#[test]
fn test_now_tracks_elapsed_time() {
    let timer = Timer::new().unwrap();

    let before = timer.now().unwrap();
    thread::sleep(Duration::from_millis(50));
    let after = timer.now().unwrap();

    let elapsed = after - before;
    assert!(elapsed >= 0.049, "Expected at least 50ms, measured {elapsed}s");
    assert!(elapsed < 1.0, "Expected well under a second, measured {elapsed}s");
}

#[test]
fn test_now_and_now_duration_share_a_clock() {
    let timer = Timer::new().unwrap();

    let seconds = timer.now().unwrap();
    let duration = timer.now_duration().unwrap();

    assert!(duration.as_secs_f64() >= seconds);
    assert!(duration.as_secs_f64() - seconds < 1.0);
}

#[test]
fn test_deadline_counts_on_timer_clock() {
    let timer = Timer::new().unwrap();
    let start = timer.now().unwrap();

    timer.arm(0.1).unwrap();
    assert!(wait_readable(&timer.handle(), Duration::from_secs(1)));

    let elapsed = timer.now().unwrap() - start;
    assert!(elapsed >= 0.099, "Fired after only {elapsed}s");
}
