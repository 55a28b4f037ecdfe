use crate::wio::{drive03, CORE};
use futures::channel::oneshot;
use futures::task::{Context, Poll};
use futures::FutureExt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

pub fn spawn(future: impl Future<Output = ()> + Send + 'static) { CORE.0.spawn(future); }

/// A future that completes after the given period.
///
/// Unlike `tokio::time::sleep` it can be awaited outside of the Tokio context,
/// the countdown itself runs on the shared reactor.
pub struct Timer {
    rx: oneshot::Receiver<()>,
}

impl Timer {
    pub fn sleep(seconds: f64) -> Timer { Timer::sleep_duration(Duration::from_secs_f64(seconds)) }

    pub fn sleep_ms(ms: u64) -> Timer { Timer::sleep_duration(Duration::from_millis(ms)) }

    pub fn sleep_duration(duration: Duration) -> Timer {
        Timer {
            // `tokio::time::sleep` needs the runtime context, so it's created on the reactor.
            rx: drive03(async move { tokio::time::sleep(duration).await }),
        }
    }
}

impl Future for Timer {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // The reactor going away is treated as an elapsed timer.
        self.rx.poll_unpin(cx).map(|_| ())
    }
}
