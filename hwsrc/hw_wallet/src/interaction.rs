//! User input the device asks for in the middle of an operation.

use crate::pin_state::PinRequestContext;
use async_trait::async_trait;
use common::custom_futures::FutureTimerExt;
use common::log::debug;
use derive_more::Display;
use futures::channel::{mpsc, oneshot};
use parking_lot::Mutex as PaMutex;
use std::time::Duration;

#[derive(Clone, Debug, Display, PartialEq)]
pub enum HwInteractionError {
    #[display(fmt = "User action was not received in {:?}", _0)]
    Timeout(Duration),
    #[display(fmt = "User action was canceled")]
    Canceled,
    #[display(fmt = "Expected {} user action, found {:?}", expected, actual)]
    UnexpectedAction { expected: &'static str, actual: HwUserAction },
    #[display(fmt = "No user action is awaited")]
    NoActionAwaited,
}

#[derive(Clone, Debug, PartialEq)]
pub enum HwInteractionRequest {
    Pin(PinRequestContext),
    Word,
    Passphrase,
}

#[derive(Clone, Debug, PartialEq)]
pub enum HwUserAction {
    /// Positions on the device's scrambled PIN matrix, digits `1..=9`.
    Pin(String),
    Word(String),
    Passphrase(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum HwInteractionStatus {
    Idle,
    FollowHwDeviceInstructions,
    UserActionRequired(HwInteractionRequest),
    Ready,
}

#[async_trait]
pub trait HwRequestProcessor: Send + Sync {
    async fn on_button_request(&self) -> Result<(), HwInteractionError>;

    async fn on_pin_request(&self, ctx: PinRequestContext) -> Result<String, HwInteractionError>;

    async fn on_word_request(&self) -> Result<String, HwInteractionError>;

    async fn on_passphrase_request(&self) -> Result<String, HwInteractionError>;

    async fn on_ready(&self) -> Result<(), HwInteractionError>;
}

struct BusState {
    status: HwInteractionStatus,
    action_tx: Option<oneshot::Sender<HwUserAction>>,
    subscribers: Vec<mpsc::UnboundedSender<HwInteractionStatus>>,
}

/// Hands the device requests over to the UI and waits for the user's answer.
pub struct HwInteractionBus {
    state: PaMutex<BusState>,
    timeout: Duration,
}

impl HwInteractionBus {
    pub fn new(timeout: Duration) -> HwInteractionBus {
        HwInteractionBus {
            state: PaMutex::new(BusState {
                status: HwInteractionStatus::Idle,
                action_tx: None,
                subscribers: Vec::new(),
            }),
            timeout,
        }
    }

    pub fn status(&self) -> HwInteractionStatus { self.state.lock().status.clone() }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<HwInteractionStatus> {
        let (tx, rx) = mpsc::unbounded();
        self.state.lock().subscribers.push(tx);
        rx
    }

    pub fn on_user_action(&self, action: HwUserAction) -> Result<(), HwInteractionError> {
        let action_tx = self
            .state
            .lock()
            .action_tx
            .take()
            .ok_or(HwInteractionError::NoActionAwaited)?;
        // The waiting side may have timed out in the meantime.
        action_tx.send(action).map_err(|_| HwInteractionError::NoActionAwaited)
    }

    pub fn cancel_user_action(&self) {
        if self.state.lock().action_tx.take().is_some() {
            debug!("Awaited user action has been canceled");
        }
    }

    pub async fn wait_for_user_action(
        &self,
        request: HwInteractionRequest,
    ) -> Result<HwUserAction, HwInteractionError> {
        let (tx, rx) = oneshot::channel();
        self.state.lock().action_tx = Some(tx);
        self.set_status(HwInteractionStatus::UserActionRequired(request));

        let result = match rx.timeout(self.timeout).await {
            Ok(Ok(action)) => Ok(action),
            Ok(Err(_canceled)) => Err(HwInteractionError::Canceled),
            Err(_timeout) => {
                self.state.lock().action_tx = None;
                Err(HwInteractionError::Timeout(self.timeout))
            },
        };
        if result.is_err() {
            self.set_status(HwInteractionStatus::Idle);
        }
        result
    }

    fn set_status(&self, status: HwInteractionStatus) {
        let mut state = self.state.lock();
        state.status = status.clone();
        state
            .subscribers
            .retain(|subscriber| subscriber.unbounded_send(status.clone()).is_ok());
    }
}

#[async_trait]
impl HwRequestProcessor for HwInteractionBus {
    async fn on_button_request(&self) -> Result<(), HwInteractionError> {
        self.set_status(HwInteractionStatus::FollowHwDeviceInstructions);
        Ok(())
    }

    async fn on_pin_request(&self, ctx: PinRequestContext) -> Result<String, HwInteractionError> {
        match self.wait_for_user_action(HwInteractionRequest::Pin(ctx)).await? {
            HwUserAction::Pin(pin) => Ok(pin),
            actual => Err(HwInteractionError::UnexpectedAction { expected: "PIN", actual }),
        }
    }

    async fn on_word_request(&self) -> Result<String, HwInteractionError> {
        match self.wait_for_user_action(HwInteractionRequest::Word).await? {
            HwUserAction::Word(word) => Ok(word),
            actual => Err(HwInteractionError::UnexpectedAction { expected: "word", actual }),
        }
    }

    async fn on_passphrase_request(&self) -> Result<String, HwInteractionError> {
        match self.wait_for_user_action(HwInteractionRequest::Passphrase).await? {
            HwUserAction::Passphrase(passphrase) => Ok(passphrase),
            actual => Err(HwInteractionError::UnexpectedAction {
                expected: "passphrase",
                actual,
            }),
        }
    }

    async fn on_ready(&self) -> Result<(), HwInteractionError> {
        self.set_status(HwInteractionStatus::Ready);
        Ok(())
    }
}
