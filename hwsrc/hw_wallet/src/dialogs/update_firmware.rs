use super::base::{HwDialog, HwDialogBase, HwDialogState, ResultMessage};
use super::messages;
use crate::context::HwWalletArc;
use crate::features::HwFeatures;
use crate::result::{HwResult, OperationResult, OperationResultKind};
use common::executor::Timer;
use common::log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug)]
pub enum FirmwareStep {
    Features(HwFeatures),
    Updated(OperationResult),
}

/// Polls the device until the user confirms the update, then installs the latest firmware.
///
/// The device restarts in bootloader mode during the workflow, so a disconnection doesn't close the dialog.
pub struct UpdateFirmwareDialog {
    base: HwDialogBase<FirmwareStep>,
    device_in_bootloader_mode: bool,
    firmware_downloaded: Arc<AtomicBool>,
    updating: bool,
}

impl UpdateFirmwareDialog {
    pub fn new(ctx: HwWalletArc) -> UpdateFirmwareDialog {
        let mut base = HwDialogBase::new(ctx, HwDialogState::Connecting);
        base.set_close_if_hw_disconnected(false);
        let mut dialog = UpdateFirmwareDialog {
            base,
            device_in_bootloader_mode: false,
            firmware_downloaded: Arc::new(AtomicBool::new(false)),
            updating: false,
        };
        dialog.poll_features(None);
        dialog
    }

    pub fn device_in_bootloader_mode(&self) -> bool { self.device_in_bootloader_mode }

    /// Whether the firmware has been downloaded and is being uploaded to the device.
    pub fn firmware_downloaded(&self) -> bool { self.firmware_downloaded.load(Ordering::SeqCst) }

    pub fn confirm_update(&mut self) {
        if self.base.state() != HwDialogState::Initial {
            return;
        }
        let service = self.base.ctx().service.clone();
        let firmware_downloaded = self.firmware_downloaded.clone();
        firmware_downloaded.store(false, Ordering::SeqCst);

        self.updating = true;
        self.base.set_state(HwDialogState::Processing);
        self.base.start_operation(async move {
            service
                .update_firmware(move || firmware_downloaded.store(true, Ordering::SeqCst))
                .await
                .map(FirmwareStep::Updated)
        });
    }

    /// The features are requested without cancelling the pending action,
    /// the user may be confirming something on the device right now.
    fn poll_features(&mut self, delay: Option<Duration>) {
        let service = self.base.ctx().service.clone();
        self.base.start_operation(async move {
            if let Some(delay) = delay {
                Timer::sleep_duration(delay).await;
            }
            service.get_features(false).await.map(FirmwareStep::Features)
        });
    }

    fn poll_interval(&self) -> Duration { self.base.ctx().conf.daemon_check_interval() }

    fn on_features_polled(&mut self, result: HwResult<FirmwareStep>) {
        self.device_in_bootloader_mode = match result {
            Ok(FirmwareStep::Features(features)) => features.bootloader_mode,
            Ok(FirmwareStep::Updated(_)) => false,
            Err(e) => {
                debug!("Error polling the device features: {}", e);
                false
            },
        };
        if self.base.state() == HwDialogState::Connecting {
            self.base.set_state(HwDialogState::Initial);
        }
        self.poll_features(Some(self.poll_interval()));
    }
}

impl HwDialog for UpdateFirmwareDialog {
    type Output = FirmwareStep;

    fn base(&self) -> &HwDialogBase<FirmwareStep> { &self.base }

    fn base_mut(&mut self) -> &mut HwDialogBase<FirmwareStep> { &mut self.base }

    fn on_operation_finished(&mut self, result: HwResult<FirmwareStep>) {
        if !self.updating {
            return self.on_features_polled(result);
        }
        self.updating = false;
        match result {
            Ok(_) => {
                self.base.show_result(ResultMessage::success(messages::FIRMWARE_UPDATED));
                self.base.set_state(HwDialogState::Finished);
            },
            Err(e) if e.is_kind(OperationResultKind::Timeout) => self.base.show_result(ResultMessage::from_error(&e)),
            Err(e) => {
                // Let the user retry.
                self.base.set_state(HwDialogState::Initial);
                self.base.show_inline_message(ResultMessage::from_error(&e));
                self.poll_features(Some(self.poll_interval()));
            },
        }
    }
}
