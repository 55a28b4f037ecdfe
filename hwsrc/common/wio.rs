//! The shared reactor and the HTTP client bound to it.

use futures::channel::oneshot;
use hyper::client::HttpConnector;
use hyper::Client;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use tokio::runtime::Runtime;

fn start_core_thread() -> HwRuntime { HwRuntime(Runtime::new().expect("!Runtime::new")) }

pub struct HwRuntime(pub Runtime);

lazy_static! {
    /// Shared asynchronous reactor.
    pub static ref CORE: HwRuntime = start_core_thread();
    /// Shared HTTP(S) client. The daemon is usually reached over plain HTTP,
    /// the firmware files are downloaded over HTTPS.
    pub static ref HYPER: Client<HttpsConnector<HttpConnector>> = {
        let https = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();
        Client::builder().executor(&*CORE).build(https)
    };
}

impl<Fut: std::future::Future<Output = ()> + Send + 'static> hyper::rt::Executor<Fut> for &HwRuntime {
    fn execute(&self, fut: Fut) { self.0.spawn(fut); }
}

/// With the shared reactor drives the future `f` to completion.
///
/// Allows to await Tokio-bound futures (hyper, tokio timers) from any executor.
pub fn drive03<F, O>(f: F) -> oneshot::Receiver<O>
where
    F: std::future::Future<Output = O> + Send + 'static,
    O: Send + 'static,
{
    let (sx, rx) = oneshot::channel();
    CORE.0.spawn(async move {
        let res = f.await;
        if sx.send(res).is_err() {
            crate::log::debug!("drive03 receiver is dropped");
        };
    });
    rx
}
