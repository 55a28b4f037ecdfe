//! Every device operation runs as `prepare -> cancel the pending action -> request -> resolve
//! intermediate user input -> classify`, and stops at the first failed step.
//!
//! Cancelling the previous action first is what keeps at most one operation running on the device.

use crate::classifier::HwErrorClassifier;
use crate::daemon::{self, DaemonChecker, DaemonRequest, DaemonTransport};
use crate::features::HwFeatures;
use crate::firmware::FirmwareSource;
use crate::interaction::{HwInteractionError, HwRequestProcessor};
use crate::pin_state::HwPinCoordinator;
use crate::result::{HwResult, HwWalletError, OperationResult, OperationResultKind};
use crate::tx::{HwInput, HwOutput, OpenTxConfirmation, TxConfirmation};
use crate::wallet_api::AddressVerifier;
use common::log::{debug, info, warn, LogOnError};
use serde::de::DeserializeOwned;
use serde_json::{json, Value as Json};
use std::sync::Arc;

#[cfg(test)] mod service_tests;

const PIN_CHANGED: &str = "PIN changed";
const PIN_REMOVED: &str = "PIN removed";
const MNEMONIC_CONFIGURED: &str = "Mnemonic successfully configured";
const DEVICE_RECOVERED: &str = "Device recovered";
const SEED_MATCHES: &str = "The seed is valid and matches the one in the device";
const DEVICE_BACKED_UP: &str = "Device backed up!";
const DEVICE_WIPED: &str = "Device wiped";
const SETTINGS_APPLIED: &str = "Settings applied";

const FIRMWARE_FORM_FIELD: &str = "file";

/// The daemon asks for user input by answering with one of these instead of a final result.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum IntermediateRequest {
    PinMatrix,
    Word,
    Passphrase,
    Button,
}

impl IntermediateRequest {
    fn from_response(response: &Json) -> Option<IntermediateRequest> {
        let text = response.get("data").unwrap_or(response).as_str()?;
        match text {
            "PinMatrixRequest" => Some(IntermediateRequest::PinMatrix),
            "WordRequest" => Some(IntermediateRequest::Word),
            "PassphraseRequest" => Some(IntermediateRequest::Passphrase),
            "ButtonRequest" => Some(IntermediateRequest::Button),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct GeneratedAddresses {
    addresses: Vec<String>,
}

#[derive(Clone)]
pub struct HwWalletService {
    transport: Arc<dyn DaemonTransport>,
    classifier: HwErrorClassifier,
    pin_state: HwPinCoordinator,
    processor: Arc<dyn HwRequestProcessor>,
    verifier: Arc<dyn AddressVerifier>,
    firmware: Arc<dyn FirmwareSource>,
}

impl HwWalletService {
    pub fn new(
        transport: Arc<dyn DaemonTransport>,
        checker: Arc<dyn DaemonChecker>,
        pin_state: HwPinCoordinator,
        processor: Arc<dyn HwRequestProcessor>,
        verifier: Arc<dyn AddressVerifier>,
        firmware: Arc<dyn FirmwareSource>,
    ) -> HwWalletService {
        HwWalletService {
            transport,
            classifier: HwErrorClassifier::new(checker),
            pin_state,
            processor,
            verifier,
            firmware,
        }
    }

    pub fn pin_state(&self) -> &HwPinCoordinator { &self.pin_state }

    /// Asks the daemon to abort whatever the device is doing. Never fails.
    pub async fn cancel_last_action(&self) -> OperationResult {
        let response = self.send(DaemonRequest::put(daemon::CANCEL)).await;
        self.classifier.classify(response, &[])
    }

    /// Derives `count` addresses starting from `start_index` and verifies each of them in order.
    pub async fn get_addresses(&self, count: u32, start_index: u32) -> HwResult<Vec<String>> {
        self.begin(true).await;
        let params = json!({
            "address_n": count,
            "start_index": start_index,
            "confirm_address": false,
        });
        let result = self
            .call(DaemonRequest::post(daemon::GENERATE_ADDRESSES, params), &[])
            .await?;
        let addresses = parse_data::<GeneratedAddresses>(&result)?.addresses;
        if addresses.len() != count as usize {
            warn!("Expected {} addresses, the device returned {}", count, addresses.len());
            return Err(HwWalletError::from_kind(
                OperationResultKind::UndefinedError,
                result.raw_response,
            ));
        }

        for (index, address) in (start_index..).zip(addresses.iter()) {
            if let Err(e) = self.verifier.verify_address(address).await {
                warn!("Address {} '{}' generated by the device is invalid: {}", index, address, e);
                return Err(HwWalletError::InvalidAddressGenerated {
                    index,
                    address: address.clone(),
                });
            }
        }
        Ok(addresses)
    }

    /// Shows the address on the device screen for the user to compare.
    pub async fn confirm_address(&self, index: u32) -> HwResult<String> {
        self.begin(true).await;
        let params = json!({
            "address_n": 1,
            "start_index": index,
            "confirm_address": true,
        });
        let result = self
            .call(DaemonRequest::post(daemon::GENERATE_ADDRESSES, params), &[])
            .await?;
        let addresses = parse_data::<GeneratedAddresses>(&result)?.addresses;
        match addresses.into_iter().next() {
            Some(address) => Ok(address),
            None => Err(HwWalletError::from_kind(
                OperationResultKind::UndefinedError,
                result.raw_response,
            )),
        }
    }

    /// `cancel_previous_operation = false` is for polling the device,
    /// where the cancellation could abort a confirmation the user is working on.
    pub async fn get_features(&self, cancel_previous_operation: bool) -> HwResult<HwFeatures> {
        self.begin(cancel_previous_operation).await;
        let result = self.call(DaemonRequest::get(daemon::FEATURES), &[]).await?;
        parse_data(&result)
    }

    /// Installs the latest firmware on a device in bootloader mode.
    /// `on_download_complete` is called once the binary is downloaded, right before the upload.
    pub async fn update_firmware<F>(&self, on_download_complete: F) -> HwResult<OperationResult>
    where
        F: FnOnce() + Send,
    {
        let features = self.get_features(false).await?;
        if !features.bootloader_mode {
            return Err(HwWalletError::from_kind(
                OperationResultKind::NotInBootloaderMode,
                json!(features),
            ));
        }

        let version = self.firmware.latest_version().await.map_err(firmware_error)?;
        let firmware = self.firmware.download(&version).await.map_err(firmware_error)?;
        on_download_complete();

        info!("Uploading firmware v{} to the device", version);
        self.prepare();
        let file_name = format!("firmware-v{}.bin", version);
        let request = DaemonRequest::put_file(daemon::FIRMWARE_UPDATE, FIRMWARE_FORM_FIELD, &file_name, firmware);
        self.call(request, &[]).await
    }

    /// Sets a new PIN, or replaces the current one if `changing_current_pin` is true.
    pub async fn change_pin(&self, changing_current_pin: bool) -> HwResult<OperationResult> {
        self.begin(true).await;
        self.pin_state.start_changing_pin(changing_current_pin);
        let params = json!({ "remove_pin": false });
        self.call(DaemonRequest::post(daemon::CONFIGURE_PIN_CODE, params), &[PIN_CHANGED])
            .await
    }

    pub async fn remove_pin(&self) -> HwResult<OperationResult> {
        self.begin(true).await;
        let params = json!({ "remove_pin": true });
        self.call(DaemonRequest::post(daemon::CONFIGURE_PIN_CODE, params), &[PIN_REMOVED])
            .await
    }

    pub async fn generate_mnemonic(&self, word_count: u32) -> HwResult<OperationResult> {
        self.begin(true).await;
        let params = json!({
            "word_count": word_count,
            "use_passphrase": false,
        });
        self.call(DaemonRequest::post(daemon::GENERATE_MNEMONIC, params), &[
            MNEMONIC_CONFIGURED,
        ])
        .await
    }

    /// Restores the seed, or only checks it against the device's one if `dry_run` is true.
    /// A seed mismatch is an expected outcome of a dry run, so it's returned as `Ok(WrongSeed)`.
    pub async fn recover_mnemonic(&self, word_count: u32, dry_run: bool) -> HwResult<OperationResult> {
        self.begin(true).await;
        let params = json!({
            "word_count": word_count,
            "use_passphrase": false,
            "dry_run": dry_run,
        });
        let request = DaemonRequest::post(daemon::RECOVERY, params);
        match self.call(request, &[DEVICE_RECOVERED, SEED_MATCHES]).await {
            Err(HwWalletError::Operation(result)) if dry_run && result.kind == OperationResultKind::WrongSeed => {
                Ok(result)
            },
            other => other,
        }
    }

    pub async fn backup(&self) -> HwResult<OperationResult> {
        self.begin(true).await;
        self.call(DaemonRequest::post_empty(daemon::BACKUP), &[DEVICE_BACKED_UP])
            .await
    }

    pub async fn wipe(&self) -> HwResult<OperationResult> {
        self.begin(true).await;
        self.call(DaemonRequest::delete(daemon::WIPE), &[DEVICE_WIPED]).await
    }

    pub async fn change_label(&self, label: &str) -> HwResult<OperationResult> {
        self.begin(true).await;
        let params = json!({ "label": label });
        self.call(DaemonRequest::post(daemon::APPLY_SETTINGS, params), &[SETTINGS_APPLIED])
            .await
    }

    pub async fn set_passphrase(&self, enabled: bool) -> HwResult<OperationResult> {
        self.begin(true).await;
        let params = json!({ "use_passphrase": enabled });
        self.call(DaemonRequest::post(daemon::APPLY_SETTINGS, params), &[SETTINGS_APPLIED])
            .await
    }

    /// Returns one signature per input.
    ///
    /// `confirmation` shows every non-change output while the device waits for the user,
    /// it's closed once the daemon answers, whatever the answer is.
    pub async fn sign_transaction(
        &self,
        inputs: Vec<HwInput>,
        outputs: Vec<HwOutput>,
        confirmation: &dyn TxConfirmation,
    ) -> HwResult<Vec<String>> {
        self.begin(true).await;
        let opened = OpenTxConfirmation::open(confirmation, &outputs);
        self.pin_state.set_signing_tx(true);

        let params = json!({
            "transaction_inputs": inputs,
            "transaction_outputs": outputs,
        });
        let result = self
            .call(DaemonRequest::post(daemon::TRANSACTION_SIGN, params), &[])
            .await;
        drop(opened);
        parse_data(&result?)
    }

    /// Checks that the connected device derives `expected_first_address` as its first address.
    pub async fn check_if_correct_hw_connected(&self, expected_first_address: &str) -> HwResult<()> {
        match self.get_addresses(1, 0).await {
            Ok(addresses) if addresses.first().map(String::as_str) == Some(expected_first_address) => Ok(()),
            Ok(addresses) => {
                warn!(
                    "Wrong hardware wallet is connected: expected '{}', found {:?}",
                    expected_first_address, addresses
                );
                Err(HwWalletError::from_kind(
                    OperationResultKind::IncorrectHardwareWallet,
                    json!(addresses),
                ))
            },
            Err(HwWalletError::Operation(result)) if result.kind == OperationResultKind::WithoutSeed => Err(
                HwWalletError::from_kind(OperationResultKind::IncorrectHardwareWallet, result.raw_response),
            ),
            Err(e) => Err(e),
        }
    }

    fn prepare(&self) { self.pin_state.reset(); }

    async fn begin(&self, cancel_previous_operation: bool) {
        self.prepare();
        if !cancel_previous_operation {
            return;
        }
        let result = self.cancel_last_action().await;
        if !result.is_success() {
            debug!("Cancelling the previous HW action: {}", result);
        }
    }

    async fn send(&self, request: DaemonRequest) -> Json {
        debug!("HW request: {} {}", request.method, request.path);
        match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                debug!("HW request failed: {}", e);
                e.into_raw_response()
            },
        }
    }

    async fn call(&self, request: DaemonRequest, success_phrases: &[&str]) -> HwResult<OperationResult> {
        let path = request.path.clone();
        let response = self.send_resolving_interactions(request).await?;
        let result = self.classifier.classify(response, success_phrases);
        if result.is_success() {
            return Ok(result);
        }
        warn!("HW request {} failed: {}", path, result.kind);
        Err(HwWalletError::Operation(result))
    }

    /// Keeps answering the daemon's requests for user input until it returns the final response.
    async fn send_resolving_interactions(&self, request: DaemonRequest) -> HwResult<Json> {
        let mut response = self.send(request).await;
        while let Some(intermediate) = IntermediateRequest::from_response(&response) {
            let next_request = match self.answer_intermediate(intermediate).await {
                Ok(next_request) => next_request,
                Err(e) => {
                    warn!("HW {:?} hasn't been answered: {}", intermediate, e);
                    self.cancel_last_action().await;
                    return Err(HwWalletError::from_kind(
                        OperationResultKind::FailedOrRefused,
                        Json::String(e.to_string()),
                    ));
                },
            };
            response = self.send(next_request).await;
        }
        Ok(response)
    }

    async fn answer_intermediate(&self, intermediate: IntermediateRequest) -> Result<DaemonRequest, HwInteractionError> {
        let request = match intermediate {
            IntermediateRequest::PinMatrix => {
                let pin = self.processor.on_pin_request(self.pin_state.request_context()).await?;
                self.pin_state.on_pin_entered();
                DaemonRequest::post(daemon::INTERMEDIATE_PIN_MATRIX, json!({ "pin": pin }))
            },
            IntermediateRequest::Word => {
                let word = self.processor.on_word_request().await?;
                DaemonRequest::post(daemon::INTERMEDIATE_WORD, json!({ "word": word }))
            },
            IntermediateRequest::Passphrase => {
                let passphrase = self.processor.on_passphrase_request().await?;
                DaemonRequest::post(daemon::INTERMEDIATE_PASSPHRASE, json!({ "passphrase": passphrase }))
            },
            IntermediateRequest::Button => {
                self.processor.on_button_request().await?;
                DaemonRequest::post_empty(daemon::INTERMEDIATE_BUTTON)
            },
        };
        self.processor.on_ready().await.warn_log_with_msg("Error notifying the user");
        Ok(request)
    }
}

fn parse_data<T: DeserializeOwned>(result: &OperationResult) -> HwResult<T> {
    serde_json::from_value(result.data().clone()).map_err(|e| {
        warn!("Unexpected HW response {}: {}", result.raw_response, e);
        HwWalletError::from_kind(OperationResultKind::UndefinedError, result.raw_response.clone())
    })
}

fn firmware_error(e: crate::firmware::FirmwareDownloadError) -> HwWalletError {
    warn!("Firmware download failed: {}", e);
    HwWalletError::from_kind(OperationResultKind::UndefinedError, Json::String(e.to_string()))
}
