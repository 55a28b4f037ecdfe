use super::base::{HwDialog, HwDialogBase, HwDialogState};
use crate::context::HwWalletArc;
use crate::interaction::{HwInteractionError, HwUserAction};
use crate::pin_state::{ChangePinState, PinRequestContext};
use crate::result::HwResult;
use derive_more::Display;

/// The longest PIN the device accepts.
const MAX_PIN_LEN: usize = 9;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PinHeading {
    Unlock,
    SignTransaction,
    CurrentPin,
    NewPin,
}

#[derive(Clone, Debug, Display, PartialEq)]
pub enum PinDialogError {
    #[display(fmt = "PIN must not be empty")]
    EmptyPin,
    #[display(fmt = "PIN must not be longer than {} digits", MAX_PIN_LEN)]
    TooLong,
    #[display(fmt = "PIN must consist of the matrix positions 1-9")]
    InvalidCharacter,
    #[display(fmt = "{}", _0)]
    Interaction(HwInteractionError),
}

/// Asks the user for the positions on the device's scrambled PIN matrix.
///
/// The device request is answered through the interaction bus,
/// closing the dialog in any other way refuses the request.
pub struct PinDialog {
    base: HwDialogBase<()>,
    request: PinRequestContext,
}

impl PinDialog {
    pub fn new(ctx: HwWalletArc, request: PinRequestContext) -> PinDialog {
        PinDialog {
            base: HwDialogBase::new(ctx, HwDialogState::Initial),
            request,
        }
    }

    pub fn heading(&self) -> PinHeading {
        if self.request.signing_tx {
            return PinHeading::SignTransaction;
        }
        match self.request.change_pin_state {
            Some(ChangePinState::RequestingCurrentPin) => PinHeading::CurrentPin,
            Some(ChangePinState::RequestingNewPin) => PinHeading::NewPin,
            None => PinHeading::Unlock,
        }
    }

    pub fn submit(&mut self, pin: &str) -> Result<(), PinDialogError> {
        validate_pin(pin)?;
        self.base
            .ctx()
            .interactions
            .on_user_action(HwUserAction::Pin(pin.to_owned()))
            .map_err(PinDialogError::Interaction)?;
        self.base.set_state(HwDialogState::Finished);
        self.base.close();
        Ok(())
    }

    pub fn cancel(&mut self) { self.close(); }
}

fn validate_pin(pin: &str) -> Result<(), PinDialogError> {
    if pin.is_empty() {
        return Err(PinDialogError::EmptyPin);
    }
    if pin.len() > MAX_PIN_LEN {
        return Err(PinDialogError::TooLong);
    }
    if !pin.chars().all(|c| ('1'..='9').contains(&c)) {
        return Err(PinDialogError::InvalidCharacter);
    }
    Ok(())
}

impl HwDialog for PinDialog {
    type Output = ();

    fn base(&self) -> &HwDialogBase<()> { &self.base }

    fn base_mut(&mut self) -> &mut HwDialogBase<()> { &mut self.base }

    fn on_operation_finished(&mut self, _result: HwResult<()>) {}

    fn on_closed(&mut self) { self.base.ctx().interactions.cancel_user_action(); }
}

impl Drop for PinDialog {
    fn drop(&mut self) { self.close(); }
}
