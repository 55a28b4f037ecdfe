use super::base::{HwDialog, HwDialogBase, HwDialogState, ResultMessage};
use super::messages;
use crate::context::HwWalletArc;
use crate::result::{HwResult, OperationResult};

pub struct RemovePinDialog {
    base: HwDialogBase<OperationResult>,
}

impl RemovePinDialog {
    pub fn new(ctx: HwWalletArc) -> RemovePinDialog {
        RemovePinDialog {
            base: HwDialogBase::new(ctx, HwDialogState::Initial),
        }
    }

    /// Does nothing unless the dialog waits for the confirmation.
    pub fn confirm(&mut self) {
        if self.base.state() != HwDialogState::Initial {
            return;
        }
        let service = self.base.ctx().service.clone();
        self.base.set_state(HwDialogState::Processing);
        self.base.start_operation(async move { service.remove_pin().await });
    }
}

impl HwDialog for RemovePinDialog {
    type Output = OperationResult;

    fn base(&self) -> &HwDialogBase<OperationResult> { &self.base }

    fn base_mut(&mut self) -> &mut HwDialogBase<OperationResult> { &mut self.base }

    fn on_operation_finished(&mut self, result: HwResult<OperationResult>) {
        match result {
            Ok(_) => self.base.show_result(ResultMessage::success(messages::PIN_REMOVED)),
            Err(e) => self.process_hw_operation_error(&e),
        }
    }
}
