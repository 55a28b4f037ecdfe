use crate::result::OperationResultKind;

pub fn kind_message(kind: OperationResultKind) -> &'static str {
    match kind {
        OperationResultKind::Success => "The operation was completed successfully.",
        OperationResultKind::FailedOrRefused => "The operation failed or was cancelled.",
        OperationResultKind::PinMismatch => "The operation was not completed because the PINs didn't match.",
        OperationResultKind::WithoutSeed => "The hardware wallet doesn't have a seed.",
        OperationResultKind::WrongPin => "Wrong PIN.",
        OperationResultKind::IncorrectHardwareWallet => "The connected hardware wallet is not the expected one.",
        OperationResultKind::WrongWord => "Wrong word.",
        OperationResultKind::InvalidSeed => "Invalid seed. Make sure the words are entered in the correct order.",
        OperationResultKind::WrongSeed => "The seed is valid but doesn't match the one in the device.",
        OperationResultKind::UndefinedError => "The operation was not completed due to an unknown error.",
        OperationResultKind::Disconnected => "The hardware wallet has been disconnected.",
        OperationResultKind::DaemonError => {
            "Unable to connect to the hardware wallet daemon. Make sure it is installed and running."
        },
        OperationResultKind::InvalidAddress => "Invalid address.",
        OperationResultKind::Timeout => "The operation was cancelled due to inactivity.",
        OperationResultKind::NotInBootloaderMode => "The hardware wallet is not in bootloader mode.",
    }
}

pub const INVALID_ADDRESS_GENERATED: &str =
    "The hardware wallet generated an invalid address. Please disconnect it and try again.";
pub const DAEMON_DOWNLOAD_LINK: &str = "Download the hardware wallet daemon";
pub const FORCE_WIPE_LINK: &str = "How to wipe a blocked hardware wallet";

pub const PIN_CHANGED: &str = "The PIN has been changed.";
pub const PIN_CONFIGURED: &str = "The PIN has been configured.";
pub const PIN_REMOVED: &str = "The PIN has been removed.";
pub const DEVICE_WIPED: &str = "The hardware wallet has been wiped.";
pub const SEED_GENERATED: &str = "The seed has been generated.";
pub const DEVICE_RECOVERED: &str = "The hardware wallet has been restored.";
pub const SEED_MATCHES: &str = "The seed is valid and matches the one in the device.";
pub const DEVICE_BACKED_UP: &str = "The backup has been completed.";
pub const FIRMWARE_UPDATED: &str = "The firmware has been updated. Disconnect the device to restart it.";
pub const ADDRESS_CONFIRMED: &str = "The address has been confirmed.";
