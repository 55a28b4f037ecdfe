use super::base::{HwDialog, HwDialogBase, HwDialogState, ResultMessage};
use super::messages;
use crate::context::HwWalletArc;
use crate::result::{HwResult, OperationResult, OperationResultKind};
use derive_more::Display;

#[derive(Clone, Debug, Display, PartialEq)]
pub enum SeedDialogError {
    #[display(fmt = "Unsupported number of words: {}, expected 12 or 24", _0)]
    InvalidWordCount(u32),
    #[display(fmt = "The dialog is not waiting for the user")]
    NotReady,
}

fn validate_word_count(word_count: u32) -> Result<(), SeedDialogError> {
    match word_count {
        12 | 24 => Ok(()),
        other => Err(SeedDialogError::InvalidWordCount(other)),
    }
}

/// Makes the device generate a new seed.
pub struct GenerateSeedDialog {
    base: HwDialogBase<OperationResult>,
}

impl GenerateSeedDialog {
    pub fn new(ctx: HwWalletArc) -> GenerateSeedDialog {
        GenerateSeedDialog {
            base: HwDialogBase::new(ctx, HwDialogState::Initial),
        }
    }

    pub fn start(&mut self, word_count: u32) -> Result<(), SeedDialogError> {
        if self.base.state() != HwDialogState::Initial {
            return Err(SeedDialogError::NotReady);
        }
        validate_word_count(word_count)?;
        let service = self.base.ctx().service.clone();
        self.base.set_state(HwDialogState::Processing);
        self.base
            .start_operation(async move { service.generate_mnemonic(word_count).await });
        Ok(())
    }
}

impl HwDialog for GenerateSeedDialog {
    type Output = OperationResult;

    fn base(&self) -> &HwDialogBase<OperationResult> { &self.base }

    fn base_mut(&mut self) -> &mut HwDialogBase<OperationResult> { &mut self.base }

    fn on_operation_finished(&mut self, result: HwResult<OperationResult>) {
        match result {
            Ok(_) => self.base.show_result(ResultMessage::success(messages::SEED_GENERATED)),
            Err(e) => self.process_hw_operation_error(&e),
        }
    }
}

/// Restores the device from a seed entered word by word on request,
/// or only checks the seed against the device's one if `dry_run` is set.
pub struct RestoreSeedDialog {
    base: HwDialogBase<OperationResult>,
    dry_run: bool,
}

impl RestoreSeedDialog {
    pub fn new(ctx: HwWalletArc, dry_run: bool) -> RestoreSeedDialog {
        RestoreSeedDialog {
            base: HwDialogBase::new(ctx, HwDialogState::Initial),
            dry_run,
        }
    }

    pub fn dry_run(&self) -> bool { self.dry_run }

    pub fn start(&mut self, word_count: u32) -> Result<(), SeedDialogError> {
        if self.base.state() != HwDialogState::Initial {
            return Err(SeedDialogError::NotReady);
        }
        validate_word_count(word_count)?;
        let service = self.base.ctx().service.clone();
        let dry_run = self.dry_run;
        self.base.set_state(HwDialogState::Processing);
        self.base
            .start_operation(async move { service.recover_mnemonic(word_count, dry_run).await });
        Ok(())
    }
}

impl HwDialog for RestoreSeedDialog {
    type Output = OperationResult;

    fn base(&self) -> &HwDialogBase<OperationResult> { &self.base }

    fn base_mut(&mut self) -> &mut HwDialogBase<OperationResult> { &mut self.base }

    fn on_operation_finished(&mut self, result: HwResult<OperationResult>) {
        let result = match result {
            Ok(result) => result,
            Err(e) => return self.process_hw_operation_error(&e),
        };
        let message = if result.kind == OperationResultKind::WrongSeed {
            // A dry run with another seed, not a failure.
            ResultMessage::info(result.kind, messages::kind_message(result.kind))
        } else if self.dry_run {
            ResultMessage::success(messages::SEED_MATCHES)
        } else {
            self.base.ctx().request_options_when_possible();
            ResultMessage::success(messages::DEVICE_RECOVERED)
        };
        self.base.show_result(message);
    }
}
