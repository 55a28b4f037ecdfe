use super::base::{HwDialog, HwDialogBase, HwDialogState};
use crate::context::HwWalletArc;
use crate::result::HwResult;
use crate::tx::{HwInput, HwOutput, TxConfirmation, TxData};
use parking_lot::Mutex as PaMutex;
use std::sync::Arc;

/// Holds the preview while the confirmation is open.
#[derive(Default)]
struct TxPreview(PaMutex<Option<Vec<TxData>>>);

impl TxConfirmation for TxPreview {
    fn open(&self, preview: Vec<TxData>) { *self.0.lock() = Some(preview); }

    fn close(&self) { *self.0.lock() = None; }
}

/// Signs the transaction, showing the outputs the user confirms on the device meanwhile.
pub struct ConfirmTxDialog {
    base: HwDialogBase<Vec<String>>,
    preview: Arc<TxPreview>,
    signatures: Option<Vec<String>>,
}

impl ConfirmTxDialog {
    pub fn new(ctx: HwWalletArc, inputs: Vec<HwInput>, outputs: Vec<HwOutput>) -> ConfirmTxDialog {
        let service = ctx.service.clone();
        let preview = Arc::new(TxPreview::default());
        let confirmation = preview.clone();

        let mut base = HwDialogBase::new(ctx, HwDialogState::Processing);
        base.start_operation(async move { service.sign_transaction(inputs, outputs, &*confirmation).await });
        ConfirmTxDialog {
            base,
            preview,
            signatures: None,
        }
    }

    /// The outputs to confirm, `None` until the signing starts and after it ends.
    pub fn preview(&self) -> Option<Vec<TxData>> { self.preview.0.lock().clone() }

    pub fn signatures(&self) -> Option<&[String]> { self.signatures.as_deref() }
}

impl HwDialog for ConfirmTxDialog {
    type Output = Vec<String>;

    fn base(&self) -> &HwDialogBase<Vec<String>> { &self.base }

    fn base_mut(&mut self) -> &mut HwDialogBase<Vec<String>> { &mut self.base }

    fn on_operation_finished(&mut self, result: HwResult<Vec<String>>) {
        match result {
            Ok(signatures) => {
                self.signatures = Some(signatures);
                self.base.set_state(HwDialogState::Finished);
            },
            Err(e) => self.process_hw_operation_error(&e),
        }
    }
}
