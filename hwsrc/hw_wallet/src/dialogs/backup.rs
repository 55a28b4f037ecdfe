use super::base::{HwDialog, HwDialogBase, HwDialogState, ResultMessage};
use super::messages;
use crate::context::HwWalletArc;
use crate::features::HwFeatures;
use crate::result::{HwResult, OperationResult};

#[derive(Debug)]
pub enum BackupStep {
    Features(HwFeatures),
    BackedUp(OperationResult),
}

/// Checks whether the seed needs a backup first.
/// The dialog goes to [`HwDialogState::Other`] if the backup is done already.
pub struct BackupDialog {
    base: HwDialogBase<BackupStep>,
}

impl BackupDialog {
    pub fn new(ctx: HwWalletArc) -> BackupDialog {
        let service = ctx.service.clone();
        let mut base = HwDialogBase::new(ctx, HwDialogState::Connecting);
        base.start_operation(async move { service.get_features(true).await.map(BackupStep::Features) });
        BackupDialog { base }
    }

    pub fn confirm(&mut self) {
        if self.base.state() != HwDialogState::Initial {
            return;
        }
        let service = self.base.ctx().service.clone();
        self.base.set_state(HwDialogState::Processing);
        self.base
            .start_operation(async move { service.backup().await.map(BackupStep::BackedUp) });
    }
}

impl HwDialog for BackupDialog {
    type Output = BackupStep;

    fn base(&self) -> &HwDialogBase<BackupStep> { &self.base }

    fn base_mut(&mut self) -> &mut HwDialogBase<BackupStep> { &mut self.base }

    fn on_operation_finished(&mut self, result: HwResult<BackupStep>) {
        match result {
            Ok(BackupStep::Features(features)) if features.needs_backup => self.base.set_state(HwDialogState::Initial),
            Ok(BackupStep::Features(_)) => self.base.set_state(HwDialogState::Other),
            Ok(BackupStep::BackedUp(_)) => self.base.show_result(ResultMessage::success(messages::DEVICE_BACKED_UP)),
            Err(e) => self.process_hw_operation_error(&e),
        }
    }
}
