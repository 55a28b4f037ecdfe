use parking_lot::Mutex as PaMutex;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ChangePinState {
    RequestingCurrentPin,
    RequestingNewPin,
}

/// What the PIN entry prompt should ask for.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PinRequestContext {
    pub change_pin_state: Option<ChangePinState>,
    pub signing_tx: bool,
}

#[derive(Default)]
struct PinFlags {
    change_pin_state: Option<ChangePinState>,
    signing_tx: bool,
}

/// Coordination flags shared by the orchestrator and the PIN entry dialog.
/// Reset at the start of every operation.
#[derive(Clone, Default)]
pub struct HwPinCoordinator(Arc<PaMutex<PinFlags>>);

impl HwPinCoordinator {
    pub fn new() -> HwPinCoordinator { HwPinCoordinator::default() }

    pub fn reset(&self) { *self.0.lock() = PinFlags::default(); }

    pub fn start_changing_pin(&self, changing_current_pin: bool) {
        let state = if changing_current_pin {
            ChangePinState::RequestingCurrentPin
        } else {
            ChangePinState::RequestingNewPin
        };
        self.0.lock().change_pin_state = Some(state);
    }

    /// The device asks for the current PIN once, every next request is for the new one.
    pub fn on_pin_entered(&self) {
        let mut flags = self.0.lock();
        if flags.change_pin_state == Some(ChangePinState::RequestingCurrentPin) {
            flags.change_pin_state = Some(ChangePinState::RequestingNewPin);
        }
    }

    pub fn set_signing_tx(&self, signing_tx: bool) { self.0.lock().signing_tx = signing_tx; }

    pub fn request_context(&self) -> PinRequestContext {
        let flags = self.0.lock();
        PinRequestContext {
            change_pin_state: flags.change_pin_state,
            signing_tx: flags.signing_tx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_pin_sequence() {
        let coordinator = HwPinCoordinator::new();
        coordinator.start_changing_pin(true);
        assert_eq!(coordinator.request_context().change_pin_state, Some(ChangePinState::RequestingCurrentPin));

        coordinator.on_pin_entered();
        assert_eq!(coordinator.request_context().change_pin_state, Some(ChangePinState::RequestingNewPin));
        coordinator.on_pin_entered();
        assert_eq!(coordinator.request_context().change_pin_state, Some(ChangePinState::RequestingNewPin));

        coordinator.set_signing_tx(true);
        coordinator.reset();
        assert_eq!(coordinator.request_context(), PinRequestContext::default());
    }

    #[test]
    fn test_setting_new_pin() {
        let coordinator = HwPinCoordinator::new();
        coordinator.on_pin_entered();
        assert_eq!(coordinator.request_context().change_pin_state, None);

        coordinator.start_changing_pin(false);
        assert_eq!(coordinator.request_context(), PinRequestContext {
            change_pin_state: Some(ChangePinState::RequestingNewPin),
            signing_tx: false,
        });
    }
}
