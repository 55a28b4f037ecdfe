//! Hardware wallet operations orchestrated over the local hardware wallet daemon.
//!
//! The daemon bridges HTTP requests to the USB/HID device. This crate turns its free-text answers
//! into the [`OperationResultKind`] taxonomy, runs every device operation under the cancel-then-execute
//! discipline and exposes the dialog state machines the UI layer renders.

#[macro_use] extern crate serde_derive;

pub mod classifier;
pub mod config;
pub mod context;
pub mod daemon;
pub mod dialogs;
pub mod features;
pub mod firmware;
pub mod interaction;
pub mod pin_state;
pub mod result;
pub mod service;
pub mod tx;
pub mod wallet_api;


pub use classifier::{classify_response, HwErrorClassifier};
pub use config::{HwConfigError, HwWalletConfig};
pub use context::{HwWalletArc, HwWalletCtx};
pub use daemon::watcher::{ConnectionSubscription, HwDaemonWatcher};
pub use daemon::{DaemonChecker, DaemonRequest, DaemonTransport, DaemonTransportError};
pub use features::HwFeatures;
pub use interaction::{HwInteractionBus, HwInteractionRequest, HwRequestProcessor, HwUserAction};
pub use pin_state::{ChangePinState, HwPinCoordinator, PinRequestContext};
pub use result::{HwResult, HwWalletError, OperationResult, OperationResultKind};
pub use service::HwWalletService;
pub use tx::{HwInput, HwOutput, TxConfirmation, TxData};
