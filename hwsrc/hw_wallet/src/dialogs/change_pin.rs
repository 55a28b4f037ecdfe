use super::base::{HwDialog, HwDialogBase, HwDialogState, ResultMessage};
use super::messages;
use crate::context::HwWalletArc;
use crate::result::{HwResult, OperationResult};

/// Sets a new PIN or changes the current one. The operation starts right away,
/// the PIN entries are requested through [`super::PinDialog`].
pub struct ChangePinDialog {
    base: HwDialogBase<OperationResult>,
    changing_current_pin: bool,
}

impl ChangePinDialog {
    pub fn new(ctx: HwWalletArc, changing_current_pin: bool) -> ChangePinDialog {
        let service = ctx.service.clone();
        let mut base = HwDialogBase::new(ctx, HwDialogState::Processing);
        base.start_operation(async move { service.change_pin(changing_current_pin).await });
        ChangePinDialog {
            base,
            changing_current_pin,
        }
    }
}

impl HwDialog for ChangePinDialog {
    type Output = OperationResult;

    fn base(&self) -> &HwDialogBase<OperationResult> { &self.base }

    fn base_mut(&mut self) -> &mut HwDialogBase<OperationResult> { &mut self.base }

    fn on_operation_finished(&mut self, result: HwResult<OperationResult>) {
        match result {
            Ok(_) if self.changing_current_pin => self.base.show_result(ResultMessage::success(messages::PIN_CHANGED)),
            Ok(_) => self.base.show_result(ResultMessage::success(messages::PIN_CONFIGURED)),
            Err(e) => self.process_hw_operation_error(&e),
        }
    }
}
