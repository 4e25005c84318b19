//! # monotimer
//!
//! **monotimer** is a minimal, high-resolution single-shot timer backed by the
//! operating system's monotonic clock, designed to be embedded in the polling
//! reactor of an event loop.
//!
//! A [`Timer`] owns one OS timer object and offers four things:
//!
//! - **arm** a relative deadline in seconds, atomically replacing the previous one,
//! - a pollable **handle** that becomes readable when the deadline passes,
//! - the current **monotonic time**, immune to wall-clock adjustments,
//! - an explicit **disarm**, distinct from "fire immediately".
//!
//! It deliberately does nothing else: no timer wheel, no repeating timers,
//! no event loop. Waiting happens in the caller's reactor, which watches the
//! handle next to its sockets.
//!
//! Backends are selected at compile time:
//!
//! - Linux: `timerfd` on `CLOCK_MONOTONIC`,
//! - macOS: a private `kqueue` with an `EVFILT_TIMER`,
//! - Windows: a waitable timer and the performance counter.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use monotimer::Timer;
//!
//! let timer = Timer::new()?;
//! let start = timer.now()?;
//!
//! timer.arm(0.1)?;
//!
//! // Register `timer.handle()` for readability with the reactor.
//! // Once it reports ready:
//! if let Some(expirations) = timer.drain()? {
//!     println!("fired {expirations}x after {:.3}s", timer.now()? - start);
//! }
//! ```
//!
//! With the `mio` feature, [`Timer`] implements `mio::event::Source` on Unix.
//!
//! ## Logging
//!
//! The crate emits `tracing` events (`debug` for descriptor lifetime,
//! `trace` for arming and draining) and never installs a subscriber.

mod builder;
mod error;
mod handle;
mod sys;
mod timer;

pub use builder::TimerBuilder;
pub use error::{Error, Result};
pub use handle::Handle;
pub use timer::Timer;
