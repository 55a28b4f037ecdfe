use super::base::{HwDialog, HwDialogBase, HwDialogState, ResultMessage};
use super::messages;
use crate::context::HwWalletArc;
use crate::result::HwResult;

/// Shows the address on the device screen so the user can compare it with the one on the screen.
pub struct ConfirmAddressDialog {
    base: HwDialogBase<String>,
    index: u32,
    address: Option<String>,
}

impl ConfirmAddressDialog {
    pub fn new(ctx: HwWalletArc, index: u32) -> ConfirmAddressDialog {
        let service = ctx.service.clone();
        let mut base = HwDialogBase::new(ctx, HwDialogState::Processing);
        base.start_operation(async move { service.confirm_address(index).await });
        ConfirmAddressDialog {
            base,
            index,
            address: None,
        }
    }

    pub fn index(&self) -> u32 { self.index }

    pub fn address(&self) -> Option<&str> { self.address.as_deref() }
}

impl HwDialog for ConfirmAddressDialog {
    type Output = String;

    fn base(&self) -> &HwDialogBase<String> { &self.base }

    fn base_mut(&mut self) -> &mut HwDialogBase<String> { &mut self.base }

    fn on_operation_finished(&mut self, result: HwResult<String>) {
        match result {
            Ok(address) => {
                self.address = Some(address);
                self.base.show_result(ResultMessage::success(messages::ADDRESS_CONFIRMED));
            },
            Err(e) => self.process_hw_operation_error(&e),
        }
    }
}
