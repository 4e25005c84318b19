#![cfg(all(unix, feature = "mio"))]

use mio::{Events, Interest, Poll, Token};
use monotimer::Timer;
use std::time::Duration;

const TIMER: Token = Token(7);

#[test]
fn test_timer_wakes_mio_poll() {
    let mut poll = Poll::new().unwrap();
    let mut events = Events::with_capacity(8);
    let mut timer = Timer::new().unwrap();

    poll.registry()
        .register(&mut timer, TIMER, Interest::READABLE)
        .unwrap();

    timer.arm(0.05).unwrap();
    poll.poll(&mut events, Some(Duration::from_secs(1))).unwrap();

    let fired = events
        .iter()
        .any(|event| event.token() == TIMER && event.is_readable());
    assert!(fired, "The timer should wake the poll as readable");
    assert_eq!(timer.drain().unwrap(), Some(1));

    poll.registry().deregister(&mut timer).unwrap();
}

#[test]
fn test_unarmed_timer_does_not_wake_mio_poll() {
    let mut poll = Poll::new().unwrap();
    let mut events = Events::with_capacity(8);
    let mut timer = Timer::new().unwrap();

    poll.registry()
        .register(&mut timer, TIMER, Interest::READABLE)
        .unwrap();

    poll.poll(&mut events, Some(Duration::from_millis(50))).unwrap();

    assert!(events.is_empty());
}
