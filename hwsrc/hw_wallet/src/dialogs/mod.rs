//! UI-independent state machines of the hardware wallet dialogs.
//!
//! A dialog is driven by the host: it forwards user actions to the dialog methods
//! and feeds [`HwDialog::process_next_event`] until it returns `false`.

mod backup;
mod base;
mod change_pin;
mod confirm_address;
mod confirm_tx;
pub mod messages;
mod pin;
mod remove_pin;
mod seed;
mod update_firmware;
mod wipe;


pub use backup::{BackupDialog, BackupStep};
pub use base::{DialogEvent, HwDialog, HwDialogBase, HwDialogState, ResultIcon, ResultLink, ResultMessage};
pub use change_pin::ChangePinDialog;
pub use confirm_address::ConfirmAddressDialog;
pub use confirm_tx::ConfirmTxDialog;
pub use pin::{PinDialog, PinDialogError, PinHeading};
pub use remove_pin::RemovePinDialog;
pub use seed::{GenerateSeedDialog, RestoreSeedDialog, SeedDialogError};
pub use update_firmware::{FirmwareStep, UpdateFirmwareDialog};
pub use wipe::WipeDialog;
