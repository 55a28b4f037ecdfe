use derive_more::Display;
use serde_json::Value as Json;

pub type HwResult<T> = Result<T, HwWalletError>;

/// The closed set of outcomes of a hardware wallet operation.
#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
pub enum OperationResultKind {
    Success,
    FailedOrRefused,
    PinMismatch,
    WithoutSeed,
    WrongPin,
    IncorrectHardwareWallet,
    WrongWord,
    InvalidSeed,
    WrongSeed,
    UndefinedError,
    Disconnected,
    DaemonError,
    InvalidAddress,
    Timeout,
    NotInBootloaderMode,
}

impl OperationResultKind {
    pub fn is_success(self) -> bool { self == OperationResultKind::Success }
}

/// A classified daemon response.
///
/// `raw_response` keeps the classifier input for display and logging only, it's never re-parsed downstream.
#[derive(Clone, Debug, Display, PartialEq, Serialize)]
#[display(fmt = "{} ({})", kind, raw_response)]
pub struct OperationResult {
    pub kind: OperationResultKind,
    pub raw_response: Json,
}

impl OperationResult {
    pub fn new(kind: OperationResultKind, raw_response: Json) -> OperationResult { OperationResult { kind, raw_response } }

    pub fn success(raw_response: Json) -> OperationResult {
        OperationResult::new(OperationResultKind::Success, raw_response)
    }

    pub fn is_success(&self) -> bool { self.kind.is_success() }

    /// The payload of a successful daemon response: the `data` field if any, otherwise the whole response.
    pub fn data(&self) -> &Json {
        match self.raw_response.get("data") {
            Some(data) => data,
            None => &self.raw_response,
        }
    }
}

#[derive(Clone, Debug, Display, PartialEq)]
pub enum HwWalletError {
    #[display(fmt = "Hardware wallet operation failed: {}", _0)]
    Operation(OperationResult),
    /// The device derived an address the wallet API doesn't consider valid.
    #[display(fmt = "Invalid address generated at index {}: '{}'", index, address)]
    InvalidAddressGenerated { index: u32, address: String },
}

impl HwWalletError {
    pub fn from_kind(kind: OperationResultKind, raw_response: Json) -> HwWalletError {
        HwWalletError::Operation(OperationResult::new(kind, raw_response))
    }

    /// Returns `None` if the error is not a part of the device taxonomy.
    pub fn kind(&self) -> Option<OperationResultKind> {
        match self {
            HwWalletError::Operation(result) => Some(result.kind),
            HwWalletError::InvalidAddressGenerated { .. } => None,
        }
    }

    pub fn is_kind(&self, kind: OperationResultKind) -> bool { self.kind() == Some(kind) }
}

impl From<OperationResult> for HwWalletError {
    fn from(result: OperationResult) -> Self { HwWalletError::Operation(result) }
}

impl std::error::Error for HwWalletError {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_result_data() {
        let result = OperationResult::success(json!({"data": ["2Abc"]}));
        assert_eq!(result.data(), &json!(["2Abc"]));

        let result = OperationResult::success(json!("Device wiped"));
        assert_eq!(result.data(), &json!("Device wiped"));
    }

    #[test]
    fn test_error_kind() {
        let error = HwWalletError::from_kind(OperationResultKind::WrongPin, json!("PIN invalid"));
        assert!(error.is_kind(OperationResultKind::WrongPin));
        assert!(!error.is_kind(OperationResultKind::Success));

        let error = HwWalletError::InvalidAddressGenerated {
            index: 3,
            address: "2Abc".to_owned(),
        };
        assert_eq!(error.kind(), None);
        assert_eq!(error.to_string(), "Invalid address generated at index 3: '2Abc'");
    }
}
