/// Custom future combinators - the standard ones do not match our requirements.
use crate::executor::Timer;
use futures::task::{Context, Poll};
use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub struct TimeoutError {
    pub duration: Duration,
}

impl fmt::Display for TimeoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Future timed out in {:?}", self.duration) }
}

pub struct Timeout<F> {
    future: F,
    timer: Timer,
    duration: Duration,
}

impl<F> Future for Timeout<F>
where
    F: Future + Unpin,
{
    type Output = Result<F::Output, TimeoutError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Poll::Ready(output) = self.future.poll_unpin(cx) {
            return Poll::Ready(Ok(output));
        }
        match self.timer.poll_unpin(cx) {
            Poll::Ready(()) => Poll::Ready(Err(TimeoutError {
                duration: self.duration,
            })),
            Poll::Pending => Poll::Pending,
        }
    }
}

pub trait FutureTimerExt: Future + Unpin + Sized {
    /// Finishes with the [`TimeoutError`] if the underlying future isn't ready within the given timeframe.
    fn timeout(self, duration: Duration) -> Timeout<Self> {
        Timeout {
            future: self,
            timer: Timer::sleep_duration(duration),
            duration,
        }
    }

    fn timeout_secs(self, secs: f64) -> Timeout<Self> { self.timeout(Duration::from_secs_f64(secs)) }
}

impl<F: Future + Unpin> FutureTimerExt for F {}
