use super::messages::{self, DAEMON_DOWNLOAD_LINK, FORCE_WIPE_LINK, INVALID_ADDRESS_GENERATED};
use crate::context::HwWalletArc;
use crate::daemon::watcher::ConnectionSubscription;
use crate::result::{HwResult, HwWalletError, OperationResultKind};
use async_trait::async_trait;
use common::executor::spawn;
use common::log::debug;
use futures::channel::oneshot;
use futures::future::{select, Either};
use futures::StreamExt;
use std::future::Future;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HwDialogState {
    Connecting,
    Initial,
    Processing,
    ShowingResult,
    Finished,
    /// Dialog specific, e.g. there is nothing to back up.
    Other,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResultIcon {
    Success,
    Info,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResultLink {
    pub text: String,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResultMessage {
    /// `None` for the errors that are not a part of the device taxonomy.
    pub kind: Option<OperationResultKind>,
    pub text: String,
    pub icon: ResultIcon,
    pub link: Option<ResultLink>,
}

impl ResultMessage {
    pub fn success(text: &str) -> ResultMessage {
        ResultMessage {
            kind: Some(OperationResultKind::Success),
            text: text.to_owned(),
            icon: ResultIcon::Success,
            link: None,
        }
    }

    pub fn info(kind: OperationResultKind, text: &str) -> ResultMessage {
        ResultMessage {
            kind: Some(kind),
            text: text.to_owned(),
            icon: ResultIcon::Info,
            link: None,
        }
    }

    pub fn from_error(error: &HwWalletError) -> ResultMessage {
        let text = match error.kind() {
            Some(kind) => messages::kind_message(kind),
            None => INVALID_ADDRESS_GENERATED,
        };
        ResultMessage {
            kind: error.kind(),
            text: text.to_owned(),
            icon: ResultIcon::Error,
            link: None,
        }
    }
}

#[derive(Debug)]
pub enum DialogEvent<T> {
    HwConnectionChanged(bool),
    OperationFinished(HwResult<T>),
}

enum Incoming<T> {
    Connection(Option<bool>),
    Operation(Result<HwResult<T>, oneshot::Canceled>),
}

/// The part every dialog shares: the state, the connection subscription
/// and the subscription to the only operation the dialog runs at a time.
pub struct HwDialogBase<T> {
    ctx: HwWalletArc,
    state: HwDialogState,
    result: Option<ResultMessage>,
    close_if_hw_disconnected: bool,
    closed: bool,
    connection: Option<ConnectionSubscription>,
    operation: Option<oneshot::Receiver<HwResult<T>>>,
}

impl<T: Send + 'static> HwDialogBase<T> {
    pub fn new(ctx: HwWalletArc, state: HwDialogState) -> HwDialogBase<T> {
        let connection = ctx.watcher.subscribe();
        if ctx.conf.poll_hw_connection {
            ctx.watcher.start_polling();
        }
        HwDialogBase {
            close_if_hw_disconnected: ctx.conf.close_dialogs_if_hw_disconnected,
            ctx,
            state,
            result: None,
            closed: false,
            connection: Some(connection),
            operation: None,
        }
    }

    pub fn ctx(&self) -> &HwWalletArc { &self.ctx }

    pub fn state(&self) -> HwDialogState { self.state }

    pub fn set_state(&mut self, state: HwDialogState) { self.state = state; }

    pub fn result(&self) -> Option<&ResultMessage> { self.result.as_ref() }

    pub fn is_closed(&self) -> bool { self.closed }

    pub fn close_if_hw_disconnected(&self) -> bool { self.close_if_hw_disconnected }

    pub fn set_close_if_hw_disconnected(&mut self, close: bool) { self.close_if_hw_disconnected = close; }

    pub fn has_pending_operation(&self) -> bool { self.operation.is_some() }

    /// Runs the operation in background, replacing the subscription to the previous one.
    ///
    /// Dropping the subscription doesn't stop the request already sent to the daemon,
    /// it's aborted by the next operation's cancellation.
    pub fn start_operation<F>(&mut self, operation: F)
    where
        F: Future<Output = HwResult<T>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        spawn(async move {
            tx.send(operation.await).ok();
        });
        self.operation = Some(rx);
    }

    /// Waits for either a connection change or the operation result.
    /// Returns `None` once the dialog is closed or there is nothing to wait for.
    pub async fn next_event(&mut self) -> Option<DialogEvent<T>> {
        loop {
            if self.closed {
                return None;
            }
            let incoming = match (self.connection.as_mut(), self.operation.as_mut()) {
                (None, None) => return None,
                (Some(connection), None) => Incoming::Connection(connection.next().await),
                (None, Some(operation)) => Incoming::Operation(operation.await),
                (Some(connection), Some(operation)) => match select(connection.next(), operation).await {
                    Either::Left((connected, _)) => Incoming::Connection(connected),
                    Either::Right((result, _)) => Incoming::Operation(result),
                },
            };
            match incoming {
                Incoming::Connection(Some(connected)) => return Some(DialogEvent::HwConnectionChanged(connected)),
                Incoming::Connection(None) => self.connection = None,
                Incoming::Operation(Ok(result)) => {
                    self.operation = None;
                    return Some(DialogEvent::OperationFinished(result));
                },
                Incoming::Operation(Err(_canceled)) => self.operation = None,
            }
        }
    }

    pub fn on_hw_connection_changed(&mut self, connected: bool) {
        if !connected && self.close_if_hw_disconnected {
            debug!("Hardware wallet disconnected, closing the dialog");
            self.close();
        }
    }

    /// Shows the message, linking the daemon download page to a daemon error
    /// and the force-wipe instructions to a timeout.
    pub fn show_result(&mut self, mut message: ResultMessage) {
        message.link = match message.kind {
            Some(OperationResultKind::DaemonError) => Some(ResultLink {
                text: DAEMON_DOWNLOAD_LINK.to_owned(),
                url: self.ctx.conf.daemon_download_url.clone(),
            }),
            Some(OperationResultKind::Timeout) => Some(ResultLink {
                text: FORCE_WIPE_LINK.to_owned(),
                url: self.ctx.conf.force_wipe_help_url.clone(),
            }),
            _ => message.link,
        };
        self.state = HwDialogState::ShowingResult;
        self.result = Some(message);
    }

    /// Keeps the current state, the message is shown inline.
    pub fn show_inline_message(&mut self, message: ResultMessage) { self.result = Some(message); }

    pub fn process_hw_operation_error(&mut self, error: &HwWalletError) {
        if error.is_kind(OperationResultKind::Disconnected) && self.close_if_hw_disconnected {
            self.close();
            return;
        }
        self.show_result(ResultMessage::from_error(error));
    }

    /// Disposes both subscriptions. Can be called more than once.
    pub fn close(&mut self) {
        self.closed = true;
        self.connection = None;
        self.operation = None;
    }
}

#[async_trait]
pub trait HwDialog: Send {
    type Output: Send + 'static;

    fn base(&self) -> &HwDialogBase<Self::Output>;

    fn base_mut(&mut self) -> &mut HwDialogBase<Self::Output>;

    fn on_operation_finished(&mut self, result: HwResult<Self::Output>);

    /// Called once when the dialog gets closed.
    fn on_closed(&mut self) {}

    fn state(&self) -> HwDialogState { self.base().state() }

    fn result(&self) -> Option<&ResultMessage> { self.base().result() }

    fn is_closed(&self) -> bool { self.base().is_closed() }

    fn close(&mut self) {
        if !self.is_closed() {
            self.base_mut().close();
            self.on_closed();
        }
    }

    fn on_hw_connection_changed(&mut self, connected: bool) {
        let was_closed = self.is_closed();
        self.base_mut().on_hw_connection_changed(connected);
        if !was_closed && self.is_closed() {
            self.on_closed();
        }
    }

    fn process_hw_operation_error(&mut self, error: &HwWalletError) {
        let was_closed = self.is_closed();
        self.base_mut().process_hw_operation_error(error);
        if !was_closed && self.is_closed() {
            self.on_closed();
        }
    }

    fn handle_event(&mut self, event: DialogEvent<Self::Output>) {
        match event {
            DialogEvent::HwConnectionChanged(connected) => self.on_hw_connection_changed(connected),
            DialogEvent::OperationFinished(result) => self.on_operation_finished(result),
        }
    }

    /// Returns `false` if there is nothing left to wait for.
    async fn process_next_event(&mut self) -> bool {
        match self.base_mut().next_event().await {
            Some(event) => {
                self.handle_event(event);
                true
            },
            None => false,
        }
    }
}
