use crate::config::HwWalletConfig;
use crate::daemon::watcher::HwDaemonWatcher;
use crate::daemon::{DaemonTransport, HttpDaemonClient};
use crate::firmware::{FirmwareSource, HttpFirmwareSource};
use crate::interaction::HwInteractionBus;
use crate::pin_state::HwPinCoordinator;
use crate::service::HwWalletService;
use crate::wallet_api::{AddressVerifier, HttpWalletApi};
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone)]
pub struct HwWalletArc(Arc<HwWalletCtx>);

impl Deref for HwWalletArc {
    type Target = HwWalletCtx;

    fn deref(&self) -> &Self::Target { &self.0 }
}

impl HwWalletArc {
    pub fn new(ctx: HwWalletCtx) -> HwWalletArc { HwWalletArc(Arc::new(ctx)) }
}

/// Everything the hardware wallet workflows share. Built once and handed to every dialog.
pub struct HwWalletCtx {
    pub conf: HwWalletConfig,
    pub service: HwWalletService,
    pub pin_state: HwPinCoordinator,
    pub watcher: HwDaemonWatcher,
    pub interactions: Arc<HwInteractionBus>,
    /// Set when a workflow wants the hardware wallet options to be reopened after the UI settles.
    show_options_when_possible: AtomicBool,
}

impl HwWalletCtx {
    pub fn from_config(conf: HwWalletConfig) -> HwWalletArc {
        let transport = Arc::new(HttpDaemonClient::new(&conf.daemon_url));
        let verifier = Arc::new(HttpWalletApi::new(&conf.wallet_api_url));
        let firmware = Arc::new(HttpFirmwareSource::new(
            &conf.firmware_version_url,
            &conf.firmware_download_url_prefix,
        ));
        HwWalletCtx::with_parts(conf, transport, verifier, firmware)
    }

    pub fn with_parts(
        conf: HwWalletConfig,
        transport: Arc<dyn DaemonTransport>,
        verifier: Arc<dyn AddressVerifier>,
        firmware: Arc<dyn FirmwareSource>,
    ) -> HwWalletArc {
        let watcher = HwDaemonWatcher::new(transport.clone(), conf.daemon_check_interval());
        let pin_state = HwPinCoordinator::new();
        let interactions = Arc::new(HwInteractionBus::new(conf.pin_request_timeout()));
        let service = HwWalletService::new(
            transport,
            Arc::new(watcher.clone()),
            pin_state.clone(),
            interactions.clone(),
            verifier,
            firmware,
        );
        HwWalletArc::new(HwWalletCtx {
            conf,
            service,
            pin_state,
            watcher,
            interactions,
            show_options_when_possible: AtomicBool::new(false),
        })
    }

    pub fn request_options_when_possible(&self) { self.show_options_when_possible.store(true, Ordering::SeqCst); }

    /// Returns the flag and clears it, so only one reader acts on a request.
    pub fn take_show_options_when_possible(&self) -> bool {
        self.show_options_when_possible.swap(false, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::for_tests::MockHw;
    use crate::pin_state::ChangePinState;

    #[test]
    fn test_show_options_handoff() {
        let ctx = MockHw::new().ctx();
        assert!(!ctx.take_show_options_when_possible());
        ctx.request_options_when_possible();
        assert!(ctx.take_show_options_when_possible());
        assert!(!ctx.take_show_options_when_possible());
    }

    #[test]
    fn test_shared_pin_state() {
        let ctx = MockHw::new().ctx();
        ctx.pin_state.start_changing_pin(true);
        assert_eq!(ctx.service.pin_state().request_context(), ctx.pin_state.request_context());
        assert_eq!(
            ctx.pin_state.request_context().change_pin_state,
            Some(ChangePinState::RequestingCurrentPin)
        );
    }
}
