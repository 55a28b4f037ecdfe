use super::*;
use crate::daemon::{DaemonBody, DaemonMethod, DaemonTransportError};
use crate::for_tests::{MockHw, ProcessorCall, RecordingTxConfirmation, TxConfirmationEvent};
use crate::pin_state::{ChangePinState, PinRequestContext};
use crate::tx::TxData;
use bigdecimal::BigDecimal;
use common::block_on;
use common::custom_futures::FutureTimerExt;
use common::executor::spawn;
use futures::channel::oneshot;
use parking_lot::Mutex as PaMutex;
use std::future::Future;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

fn addresses(addresses: &[&str]) -> Json { json!({ "addresses": addresses }) }

fn expect_kind<T: std::fmt::Debug>(actual: HwResult<T>, expected: OperationResultKind) {
    match actual {
        Err(e) => assert_eq!(e.kind(), Some(expected), "{}", e),
        Ok(t) => panic!("Expected {} error, found {:?}", expected, t),
    }
}

fn check_cancel_first<F, Fut, T>(path: &str, data: Json, operation: F)
where
    F: FnOnce(HwWalletService) -> Fut,
    Fut: Future<Output = HwResult<T>>,
    T: std::fmt::Debug,
{
    let hw = MockHw::new();
    hw.transport.respond_data(path, data);
    block_on(operation(hw.service())).unwrap();
    assert_eq!(hw.transport.paths(), vec![daemon::CANCEL.to_owned(), path.to_owned()]);
}

#[test]
fn test_every_operation_cancels_first() {
    check_cancel_first(daemon::GENERATE_ADDRESSES, addresses(&["2Abc"]), |s| async move {
        s.get_addresses(1, 0).await
    });
    check_cancel_first(daemon::GENERATE_ADDRESSES, addresses(&["2Abc"]), |s| async move {
        s.confirm_address(0).await
    });
    check_cancel_first(daemon::FEATURES, json!({}), |s| async move { s.get_features(true).await });
    check_cancel_first(daemon::CONFIGURE_PIN_CODE, json!("PIN changed"), |s| async move {
        s.change_pin(false).await
    });
    check_cancel_first(daemon::CONFIGURE_PIN_CODE, json!("PIN removed"), |s| async move {
        s.remove_pin().await
    });
    check_cancel_first(
        daemon::GENERATE_MNEMONIC,
        json!("Mnemonic successfully configured"),
        |s| async move { s.generate_mnemonic(12).await },
    );
    check_cancel_first(daemon::RECOVERY, json!("Device recovered"), |s| async move {
        s.recover_mnemonic(24, false).await
    });
    check_cancel_first(daemon::BACKUP, json!("Device backed up!"), |s| async move {
        s.backup().await
    });
    check_cancel_first(daemon::WIPE, json!("Device wiped"), |s| async move { s.wipe().await });
    check_cancel_first(daemon::APPLY_SETTINGS, json!("Settings applied"), |s| async move {
        s.change_label("Savings").await
    });
    check_cancel_first(daemon::APPLY_SETTINGS, json!("Settings applied"), |s| async move {
        s.set_passphrase(true).await
    });
    check_cancel_first(daemon::TRANSACTION_SIGN, json!(["sig"]), |s| async move {
        let confirmation = RecordingTxConfirmation::default();
        s.sign_transaction(Vec::new(), Vec::new(), &confirmation).await
    });
}

#[test]
fn test_cancel_reaches_daemon_before_next_request() {
    let hw = MockHw::new();
    let release_wipe = hw.transport.respond_deferred(daemon::WIPE);
    hw.transport.respond_data(daemon::BACKUP, json!("Device backed up!"));

    let (tx, rx) = oneshot::channel();
    let service = hw.service();
    spawn(async move {
        tx.send(service.wipe().await).ok();
    });
    hw.transport.wait_for_request(daemon::WIPE);

    block_on(hw.service().backup()).unwrap();
    let expected: Vec<_> = vec![daemon::CANCEL, daemon::WIPE, daemon::CANCEL, daemon::BACKUP]
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(hw.transport.paths(), expected);

    release_wipe
        .send(Ok(json!({"error": "Action cancelled by user"})))
        .unwrap();
    expect_kind(block_on(rx).unwrap(), OperationResultKind::FailedOrRefused);
}

#[test]
fn test_cancel_last_action_never_fails() {
    let hw = MockHw::new();
    hw.transport.respond(daemon::CANCEL, Err(DaemonTransportError::Unreachable("refused".to_owned())));
    let result = block_on(hw.service().cancel_last_action());
    assert_eq!(result.kind, OperationResultKind::DaemonError);
    assert_eq!(hw.transport.requests()[0].method, DaemonMethod::Put);
}

#[test]
fn test_get_addresses_verified_in_order() {
    let hw = MockHw::new();
    hw.transport
        .respond_data(daemon::GENERATE_ADDRESSES, addresses(&["2Abc", "2Def", "2Ghi"]));

    let actual = block_on(hw.service().get_addresses(3, 5)).unwrap();
    assert_eq!(actual, vec!["2Abc", "2Def", "2Ghi"]);
    assert_eq!(hw.verifier.verified(), vec!["2Abc", "2Def", "2Ghi"]);

    let request = &hw.transport.requests()[1];
    let expected = DaemonBody::Json(json!({"address_n": 3, "start_index": 5, "confirm_address": false}));
    assert_eq!(request.body, expected);
}

#[test]
fn test_get_addresses_stops_at_invalid_address() {
    let hw = MockHw::new();
    hw.transport
        .respond_data(daemon::GENERATE_ADDRESSES, addresses(&["2Abc", "2Def", "2Ghi"]));
    hw.verifier.reject("2Def");

    let actual = block_on(hw.service().get_addresses(3, 5));
    assert_eq!(actual, Err(HwWalletError::InvalidAddressGenerated {
        index: 6,
        address: "2Def".to_owned(),
    }));
    assert_eq!(hw.verifier.verified(), vec!["2Abc", "2Def"]);
}

#[test]
fn test_get_addresses_count_mismatch() {
    let hw = MockHw::new();
    hw.transport
        .respond_data(daemon::GENERATE_ADDRESSES, addresses(&["2Abc"]));

    expect_kind(block_on(hw.service().get_addresses(2, 0)), OperationResultKind::UndefinedError);
    assert!(hw.verifier.verified().is_empty());
}

#[test]
fn test_confirm_address() {
    let hw = MockHw::new();
    hw.transport.respond_data(daemon::GENERATE_ADDRESSES, json!("ButtonRequest"));
    hw.transport
        .respond_data(daemon::INTERMEDIATE_BUTTON, addresses(&["2Xyz"]));

    let actual = block_on(hw.service().confirm_address(7)).unwrap();
    assert_eq!(actual, "2Xyz");
    assert!(hw.verifier.verified().is_empty());
    assert_eq!(hw.processor.calls(), vec![ProcessorCall::Button]);

    let expected = DaemonBody::Json(json!({"address_n": 1, "start_index": 7, "confirm_address": true}));
    assert_eq!(hw.transport.requests()[1].body, expected);
}

#[test]
fn test_get_features_without_cancel() {
    let hw = MockHw::new();
    hw.transport
        .respond_data(daemon::FEATURES, json!({"bootloader_mode": false, "pin_protection": true}));

    let features = block_on(hw.service().get_features(false)).unwrap();
    assert!(!features.bootloader_mode);
    assert!(features.pin_protection);
    assert_eq!(hw.transport.paths(), vec![daemon::FEATURES.to_owned()]);
}

#[test]
fn test_change_pin_interactions() {
    let hw = MockHw::new();
    hw.transport
        .respond_data(daemon::CONFIGURE_PIN_CODE, json!("PinMatrixRequest"));
    hw.transport
        .respond_data(daemon::INTERMEDIATE_PIN_MATRIX, json!("PinMatrixRequest"));
    hw.transport
        .respond_data(daemon::INTERMEDIATE_PIN_MATRIX, json!("PinMatrixRequest"));
    hw.transport
        .respond_data(daemon::INTERMEDIATE_PIN_MATRIX, json!("PIN changed"));
    hw.processor.answer("1234");
    hw.processor.answer("5678");
    hw.processor.answer("5678");

    let result = block_on(hw.service().change_pin(true)).unwrap();
    assert_eq!(result.kind, OperationResultKind::Success);

    let current = PinRequestContext {
        change_pin_state: Some(ChangePinState::RequestingCurrentPin),
        signing_tx: false,
    };
    let new = PinRequestContext {
        change_pin_state: Some(ChangePinState::RequestingNewPin),
        signing_tx: false,
    };
    assert_eq!(hw.processor.calls(), vec![
        ProcessorCall::Pin(current),
        ProcessorCall::Pin(new),
        ProcessorCall::Pin(new)
    ]);

    let requests = hw.transport.requests();
    assert_eq!(requests[1].body, DaemonBody::Json(json!({"remove_pin": false})));
    assert_eq!(requests[2].body, DaemonBody::Json(json!({"pin": "1234"})));
    assert_eq!(requests[4].body, DaemonBody::Json(json!({"pin": "5678"})));
}

#[test]
fn test_refused_interaction_cancels() {
    let hw = MockHw::new();
    hw.transport.respond_data(daemon::RECOVERY, json!("WordRequest"));

    let actual = block_on(hw.service().recover_mnemonic(12, false));
    expect_kind(actual, OperationResultKind::FailedOrRefused);
    assert_eq!(hw.processor.calls(), vec![ProcessorCall::Word]);
    assert_eq!(hw.transport.paths(), vec![
        daemon::CANCEL.to_owned(),
        daemon::RECOVERY.to_owned(),
        daemon::CANCEL.to_owned()
    ]);
}

#[test]
fn test_passphrase_interaction() {
    let hw = MockHw::new();
    hw.transport.respond_data(daemon::TRANSACTION_SIGN, json!("PassphraseRequest"));
    hw.transport
        .respond_data(daemon::INTERMEDIATE_PASSPHRASE, json!(["sig"]));
    hw.processor.answer("secret");

    let confirmation = RecordingTxConfirmation::default();
    let signatures = block_on(hw.service().sign_transaction(Vec::new(), Vec::new(), &confirmation)).unwrap();
    assert_eq!(signatures, vec!["sig"]);
    assert_eq!(
        hw.transport.requests()[2].body,
        DaemonBody::Json(json!({"passphrase": "secret"}))
    );
}

#[test]
fn test_success_phrase_required() {
    let hw = MockHw::new();
    hw.transport
        .respond_data(daemon::CONFIGURE_PIN_CODE, json!("Operation aborted"));
    expect_kind(block_on(hw.service().change_pin(false)), OperationResultKind::FailedOrRefused);

    hw.transport.respond_error(daemon::CONFIGURE_PIN_CODE, "PIN mismatch");
    expect_kind(block_on(hw.service().change_pin(false)), OperationResultKind::PinMismatch);
}

#[test]
fn test_recover_dry_run_mismatch() {
    let message = "The seed is valid but does not match the one in the device";

    let hw = MockHw::new();
    hw.transport.respond_error(daemon::RECOVERY, message);
    let result = block_on(hw.service().recover_mnemonic(12, true)).unwrap();
    assert_eq!(result.kind, OperationResultKind::WrongSeed);

    hw.transport.respond_error(daemon::RECOVERY, message);
    expect_kind(block_on(hw.service().recover_mnemonic(12, false)), OperationResultKind::WrongSeed);

    hw.transport.respond_data(
        daemon::RECOVERY,
        json!("The seed is valid and matches the one in the device"),
    );
    let result = block_on(hw.service().recover_mnemonic(12, true)).unwrap();
    assert!(result.is_success());
}

#[test]
fn test_wipe_is_delete() {
    let hw = MockHw::new();
    hw.transport.respond_data(daemon::WIPE, json!("Device wiped"));
    block_on(hw.service().wipe()).unwrap();
    assert_eq!(hw.transport.requests()[1].method, DaemonMethod::Delete);
}

#[test]
fn test_update_firmware_not_in_bootloader() {
    let hw = MockHw::new();
    hw.transport
        .respond_data(daemon::FEATURES, json!({"bootloader_mode": false}));
    let callbacks = AtomicUsize::new(0);

    let actual = block_on(hw.service().update_firmware(|| {
        callbacks.fetch_add(1, Ordering::SeqCst);
    }));
    expect_kind(actual, OperationResultKind::NotInBootloaderMode);
    assert_eq!(callbacks.load(Ordering::SeqCst), 0);
    assert_eq!(hw.firmware.requests(), 0);
    assert_eq!(hw.transport.paths(), vec![daemon::FEATURES.to_owned()]);
}

#[test]
fn test_update_firmware() {
    let hw = MockHw::new();
    hw.transport
        .respond_data(daemon::FEATURES, json!({"bootloader_mode": true}));
    hw.transport
        .respond_data(daemon::FIRMWARE_UPDATE, json!("Firmware updated"));
    let callbacks = AtomicUsize::new(0);
    let paths_on_download = PaMutex::new(Vec::new());

    let result = block_on(hw.service().update_firmware(|| {
        callbacks.fetch_add(1, Ordering::SeqCst);
        *paths_on_download.lock() = hw.transport.paths();
    }))
    .unwrap();
    assert!(result.is_success());
    assert_eq!(callbacks.load(Ordering::SeqCst), 1);
    assert_eq!(*paths_on_download.lock(), vec![daemon::FEATURES.to_owned()]);
    assert_eq!(hw.firmware.requests(), 2);

    let upload = &hw.transport.requests()[1];
    assert_eq!(upload.method, DaemonMethod::Put);
    assert_eq!(upload.path, daemon::FIRMWARE_UPDATE);
    assert_eq!(upload.body, DaemonBody::File {
        field: "file".to_owned(),
        file_name: "firmware-v1.8.2.bin".to_owned(),
        content: hw.firmware.firmware.clone(),
    });
}

#[test]
fn test_update_firmware_timeout() {
    let hw = MockHw::new();
    hw.transport
        .respond_data(daemon::FEATURES, json!({"bootloader_mode": true}));
    hw.transport.respond(
        daemon::FIRMWARE_UPDATE,
        Err(DaemonTransportError::Timeout("408".to_owned())),
    );
    expect_kind(block_on(hw.service().update_firmware(|| ())), OperationResultKind::Timeout);
}

fn output(address: &str, coins: &str, address_index: Option<u32>) -> HwOutput {
    HwOutput {
        address: address.to_owned(),
        coins: BigDecimal::from_str(coins).unwrap(),
        hours: BigDecimal::from(2),
        address_index,
    }
}

#[test]
fn test_sign_transaction() {
    let hw = MockHw::new();
    hw.transport.respond_data(daemon::TRANSACTION_SIGN, json!("ButtonRequest"));
    hw.transport
        .respond_data(daemon::INTERMEDIATE_BUTTON, json!(["sig1", "sig2"]));
    let confirmation = RecordingTxConfirmation::default();
    let inputs = vec![
        HwInput {
            hash: "a1b2".to_owned(),
            index: 0,
        },
        HwInput {
            hash: "c3d4".to_owned(),
            index: 1,
        },
    ];
    let outputs = vec![output("2Abc", "1.5", None), output("2Change", "0.5", Some(0))];

    let signatures = block_on(hw.service().sign_transaction(inputs, outputs, &confirmation)).unwrap();
    assert_eq!(signatures, vec!["sig1", "sig2"]);
    assert!(hw.pin_state.request_context().signing_tx);
    assert_eq!(confirmation.events(), vec![
        TxConfirmationEvent::Opened(vec![TxData {
            address: "2Abc".to_owned(),
            coins: BigDecimal::from_str("1.5").unwrap(),
            hours: BigDecimal::from(2),
        }]),
        TxConfirmationEvent::Closed,
    ]);

    let expected = json!({
        "transaction_inputs": [{"hash": "a1b2", "index": 0}, {"hash": "c3d4", "index": 1}],
        "transaction_outputs": [
            {"address": "2Abc", "coins": "1.5", "hours": "2"},
            {"address": "2Change", "coins": "0.5", "hours": "2", "address_index": 0},
        ],
    });
    assert_eq!(hw.transport.requests()[1].body, DaemonBody::Json(expected));
}

#[test]
fn test_sign_transaction_refused() {
    let hw = MockHw::new();
    hw.transport
        .respond_error(daemon::TRANSACTION_SIGN, "Signing failed or refused");
    let confirmation = RecordingTxConfirmation::default();

    let actual = block_on(hw.service().sign_transaction(Vec::new(), vec![output("2Abc", "1", None)], &confirmation));
    expect_kind(actual, OperationResultKind::FailedOrRefused);
    assert_eq!(confirmation.events().last(), Some(&TxConfirmationEvent::Closed));
}

#[test]
fn test_sign_transaction_dropped() {
    let hw = MockHw::new();
    let _release_sign = hw.transport.respond_deferred(daemon::TRANSACTION_SIGN);
    let confirmation = RecordingTxConfirmation::default();

    let service = hw.service();
    let signing = Box::pin(service.sign_transaction(Vec::new(), vec![output("2Abc", "1", None)], &confirmation));
    assert!(block_on(signing.timeout_secs(0.2)).is_err());

    assert_eq!(confirmation.events(), vec![
        TxConfirmationEvent::Opened(vec![TxData {
            address: "2Abc".to_owned(),
            coins: BigDecimal::from(1),
            hours: BigDecimal::from(2),
        }]),
        TxConfirmationEvent::Closed,
    ]);
}

#[test]
fn test_check_if_correct_hw_connected() {
    let hw = MockHw::new();
    hw.transport
        .respond_data(daemon::GENERATE_ADDRESSES, addresses(&["2Xyz"]));
    expect_kind(
        block_on(hw.service().check_if_correct_hw_connected("2Abc")),
        OperationResultKind::IncorrectHardwareWallet,
    );

    hw.transport
        .respond_error(daemon::GENERATE_ADDRESSES, "Mnemonic not set");
    expect_kind(
        block_on(hw.service().check_if_correct_hw_connected("2Abc")),
        OperationResultKind::IncorrectHardwareWallet,
    );

    hw.transport
        .respond_data(daemon::GENERATE_ADDRESSES, addresses(&["2Abc"]));
    block_on(hw.service().check_if_correct_hw_connected("2Abc")).unwrap();
}

#[test]
fn test_transport_failures() {
    let hw = MockHw::new();
    expect_kind(block_on(hw.service().backup()), OperationResultKind::DaemonError);

    hw.transport
        .respond_error(daemon::BACKUP, "hidapi: failed to open device");
    expect_kind(block_on(hw.service().backup()), OperationResultKind::Disconnected);
    assert_eq!(hw.checker.checks(), 1);
}
