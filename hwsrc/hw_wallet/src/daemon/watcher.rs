use super::{DaemonChecker, DaemonRequest, DaemonTransport, AVAILABLE};
use common::executor::{spawn, Timer};
use common::log::{debug, info};
use futures::channel::mpsc;
use futures::stream::Stream;
use futures::task::{Context, Poll};
use futures::StreamExt;
use parking_lot::Mutex as PaMutex;
use serde_json::Value as Json;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct WatcherState {
    transport: Arc<dyn DaemonTransport>,
    /// `None` until the first check completes.
    connected: PaMutex<Option<bool>>,
    subscribers: PaMutex<Vec<mpsc::UnboundedSender<bool>>>,
    check_interval: Duration,
    polling: AtomicBool,
}

/// Owns the process-wide hardware wallet connection state.
///
/// Subscribers receive transitions only, never the same state twice in a row.
#[derive(Clone)]
pub struct HwDaemonWatcher(Arc<WatcherState>);

impl HwDaemonWatcher {
    pub fn new(transport: Arc<dyn DaemonTransport>, check_interval: Duration) -> HwDaemonWatcher {
        HwDaemonWatcher(Arc::new(WatcherState {
            transport,
            connected: PaMutex::new(None),
            subscribers: PaMutex::new(Vec::new()),
            check_interval,
            polling: AtomicBool::new(false),
        }))
    }

    pub fn is_connected(&self) -> Option<bool> { *self.0.connected.lock() }

    /// Asks the daemon whether a device is connected and publishes the answer.
    /// An unreachable daemon means there is no device.
    pub async fn check_hw(&self) -> bool {
        let connected = match self.0.transport.send(DaemonRequest::get(AVAILABLE)).await {
            Ok(response) => response.get("data").and_then(Json::as_bool).unwrap_or(false),
            Err(e) => {
                debug!("HW availability check failed: {}", e);
                false
            },
        };
        self.set_connected(connected);
        connected
    }

    pub fn set_connected(&self, connected: bool) {
        let previous = self.0.connected.lock().replace(connected);
        if previous == Some(connected) {
            return;
        }
        info!("Hardware wallet connection changed: connected={}", connected);
        self.0
            .subscribers
            .lock()
            .retain(|subscriber| subscriber.unbounded_send(connected).is_ok());
    }

    pub fn subscribe(&self) -> ConnectionSubscription {
        let (tx, rx) = mpsc::unbounded();
        self.0.subscribers.lock().push(tx);
        ConnectionSubscription { rx }
    }

    fn has_subscribers(&self) -> bool {
        let mut subscribers = self.0.subscribers.lock();
        subscribers.retain(|subscriber| !subscriber.is_closed());
        !subscribers.is_empty()
    }

    /// Re-checks the connection every `check_interval` while anybody is subscribed.
    /// Does nothing if the polling is running already.
    pub fn start_polling(&self) {
        if self.0.polling.swap(true, Ordering::SeqCst) {
            return;
        }
        let watcher = self.clone();
        spawn(async move {
            while watcher.has_subscribers() {
                watcher.check_hw().await;
                Timer::sleep_duration(watcher.0.check_interval).await;
            }
            watcher.0.polling.store(false, Ordering::SeqCst);
            debug!("HW connection polling stopped");
        });
    }
}

impl DaemonChecker for HwDaemonWatcher {
    fn schedule_check(&self) {
        let watcher = self.clone();
        spawn(async move {
            watcher.check_hw().await;
        });
    }
}

/// A stream of connection transitions. Dropping it unsubscribes.
pub struct ConnectionSubscription {
    rx: mpsc::UnboundedReceiver<bool>,
}

impl Stream for ConnectionSubscription {
    type Item = bool;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<bool>> { self.rx.poll_next_unpin(cx) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::for_tests::MockDaemonTransport;
    use common::block_on;
    use common::custom_futures::FutureTimerExt;
    use serde_json::json;

    #[test]
    fn test_publishes_transitions_only() {
        let transport = MockDaemonTransport::new();
        transport.respond_data(AVAILABLE, json!(true));
        transport.respond_data(AVAILABLE, json!(true));
        transport.respond_data(AVAILABLE, json!(false));

        let watcher = HwDaemonWatcher::new(transport.clone(), Duration::from_secs(1));
        let mut subscription = watcher.subscribe();

        assert!(block_on(watcher.check_hw()));
        assert!(block_on(watcher.check_hw()));
        assert!(!block_on(watcher.check_hw()));
        // The script is exhausted, an unreachable daemon means disconnected.
        assert!(!block_on(watcher.check_hw()));

        assert_eq!(block_on(subscription.next()), Some(true));
        assert_eq!(block_on(subscription.next()), Some(false));
        assert!(subscription.rx.try_next().is_err());
        assert_eq!(watcher.is_connected(), Some(false));
        assert_eq!(transport.paths().len(), 4);
    }

    #[test]
    fn test_dropped_subscription() {
        let transport = MockDaemonTransport::new();
        let watcher = HwDaemonWatcher::new(transport, Duration::from_secs(1));
        let subscription = watcher.subscribe();
        assert!(watcher.has_subscribers());
        drop(subscription);
        assert!(!watcher.has_subscribers());
        watcher.set_connected(true);
    }

    #[test]
    fn test_schedule_check() {
        let transport = MockDaemonTransport::new();
        transport.respond_data(AVAILABLE, json!(true));
        let watcher = HwDaemonWatcher::new(transport.clone(), Duration::from_secs(1));
        let mut subscription = watcher.subscribe();

        watcher.schedule_check();
        let actual = block_on(subscription.next().timeout_secs(5.));
        assert_eq!(actual, Ok(Some(true)));
        assert_eq!(transport.paths(), vec![AVAILABLE.to_owned()]);
    }

    #[test]
    fn test_polling_stops_without_subscribers() {
        let transport = MockDaemonTransport::new();
        transport.respond_data(AVAILABLE, json!(true));
        let watcher = HwDaemonWatcher::new(transport, Duration::from_millis(10));
        let mut subscription = watcher.subscribe();

        watcher.start_polling();
        let actual = block_on(subscription.next().timeout_secs(5.));
        assert_eq!(actual, Ok(Some(true)));
        drop(subscription);

        block_on(Timer::sleep_ms(200));
        assert!(!watcher.0.polling.load(Ordering::SeqCst));
    }
}
