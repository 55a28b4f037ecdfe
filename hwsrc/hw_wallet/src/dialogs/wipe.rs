use super::base::{HwDialog, HwDialogBase, HwDialogState, ResultMessage};
use super::messages;
use crate::context::HwWalletArc;
use crate::result::{HwResult, OperationResult};

pub struct WipeDialog {
    base: HwDialogBase<OperationResult>,
}

impl WipeDialog {
    pub fn new(ctx: HwWalletArc) -> WipeDialog {
        WipeDialog {
            base: HwDialogBase::new(ctx, HwDialogState::Initial),
        }
    }

    pub fn confirm(&mut self) {
        if self.base.state() != HwDialogState::Initial {
            return;
        }
        let service = self.base.ctx().service.clone();
        self.base.set_state(HwDialogState::Processing);
        self.base.start_operation(async move { service.wipe().await });
    }
}

impl HwDialog for WipeDialog {
    type Output = OperationResult;

    fn base(&self) -> &HwDialogBase<OperationResult> { &self.base }

    fn base_mut(&mut self) -> &mut HwDialogBase<OperationResult> { &mut self.base }

    fn on_operation_finished(&mut self, result: HwResult<OperationResult>) {
        match result {
            Ok(_) => {
                // The wallet list has changed, the options are reopened once the UI refreshes it.
                self.base.ctx().request_options_when_possible();
                self.base.show_result(ResultMessage::success(messages::DEVICE_WIPED));
            },
            Err(e) => self.process_hw_operation_error(&e),
        }
    }
}
