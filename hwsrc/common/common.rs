//! A common dependency for subcrates.
//!
//!                   common
//!                     ^
//!                     |
//!        hw_net   ---+---   hw_wallet
//!           ^                   |
//!           |                   |
//!           +-------------------+

#[macro_use] extern crate lazy_static;

pub mod custom_futures;
pub mod executor;
pub mod log;
pub mod wio;

use std::future::Future;
use std::time::{SystemTime, UNIX_EPOCH};

pub use futures;

/// Drives the future to completion on the current thread.
///
/// Background work spawned with [`executor::spawn`] keeps running on the shared reactor,
/// so this is safe to call from tests that wait for a spawned result.
pub fn block_on<F: Future>(f: F) -> F::Output { futures::executor::block_on(f) }

pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Helps to use `true` as a default value of a `serde` field.
pub fn true_f() -> bool { true }
