//! The HTTP surface of the local hardware wallet daemon.

use crate::classifier::{DAEMON_TIMEOUT_ERROR, DAEMON_UNREACHABLE_ERROR};
use async_trait::async_trait;
use derive_more::Display;
use serde_json::Value as Json;

pub mod http_client;
pub mod watcher;

pub use http_client::HttpDaemonClient;

pub const AVAILABLE: &str = "/available";
pub const FEATURES: &str = "/features";
pub const GENERATE_ADDRESSES: &str = "/generate_addresses";
pub const CONFIGURE_PIN_CODE: &str = "/configure_pin_code";
pub const GENERATE_MNEMONIC: &str = "/generate_mnemonic";
pub const RECOVERY: &str = "/recovery";
pub const BACKUP: &str = "/backup";
pub const WIPE: &str = "/wipe";
pub const APPLY_SETTINGS: &str = "/apply_settings";
pub const TRANSACTION_SIGN: &str = "/transaction_sign";
pub const FIRMWARE_UPDATE: &str = "/firmware_update";
pub const CANCEL: &str = "/cancel";
pub const INTERMEDIATE_PIN_MATRIX: &str = "/intermediate/pin_matrix";
pub const INTERMEDIATE_WORD: &str = "/intermediate/word";
pub const INTERMEDIATE_PASSPHRASE: &str = "/intermediate/passphrase";
pub const INTERMEDIATE_BUTTON: &str = "/intermediate/button";

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum DaemonMethod {
    #[display(fmt = "GET")]
    Get,
    #[display(fmt = "POST")]
    Post,
    #[display(fmt = "PUT")]
    Put,
    #[display(fmt = "DELETE")]
    Delete,
}

impl DaemonMethod {
    pub fn to_http(self) -> http::Method {
        match self {
            DaemonMethod::Get => http::Method::GET,
            DaemonMethod::Post => http::Method::POST,
            DaemonMethod::Put => http::Method::PUT,
            DaemonMethod::Delete => http::Method::DELETE,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DaemonBody {
    Empty,
    Json(Json),
    /// A single file sent as `multipart/form-data`.
    File {
        field: String,
        file_name: String,
        content: Vec<u8>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct DaemonRequest {
    pub method: DaemonMethod,
    pub path: String,
    pub body: DaemonBody,
}

impl DaemonRequest {
    fn new(method: DaemonMethod, path: &str, body: DaemonBody) -> DaemonRequest {
        DaemonRequest {
            method,
            path: path.to_owned(),
            body,
        }
    }

    pub fn get(path: &str) -> DaemonRequest { DaemonRequest::new(DaemonMethod::Get, path, DaemonBody::Empty) }

    pub fn post(path: &str, params: Json) -> DaemonRequest {
        DaemonRequest::new(DaemonMethod::Post, path, DaemonBody::Json(params))
    }

    pub fn post_empty(path: &str) -> DaemonRequest { DaemonRequest::new(DaemonMethod::Post, path, DaemonBody::Empty) }

    pub fn put(path: &str) -> DaemonRequest { DaemonRequest::new(DaemonMethod::Put, path, DaemonBody::Empty) }

    pub fn delete(path: &str) -> DaemonRequest { DaemonRequest::new(DaemonMethod::Delete, path, DaemonBody::Empty) }

    pub fn put_file(path: &str, field: &str, file_name: &str, content: Vec<u8>) -> DaemonRequest {
        let body = DaemonBody::File {
            field: field.to_owned(),
            file_name: file_name.to_owned(),
            content,
        };
        DaemonRequest::new(DaemonMethod::Put, path, body)
    }
}

#[derive(Clone, Debug, Display, PartialEq)]
pub enum DaemonTransportError {
    #[display(fmt = "Hardware wallet daemon is unreachable: {}", _0)]
    Unreachable(String),
    #[display(fmt = "Hardware wallet daemon request timed out: {}", _0)]
    Timeout(String),
    #[display(fmt = "Hardware wallet daemon responded with {} status: {}", status, body)]
    Rejected { status: u16, body: Json },
}

impl std::error::Error for DaemonTransportError {}

impl DaemonTransportError {
    /// Converts the error into the raw response the classifier understands.
    pub fn into_raw_response(self) -> Json {
        match self {
            DaemonTransportError::Unreachable(_) => Json::String(DAEMON_UNREACHABLE_ERROR.to_owned()),
            DaemonTransportError::Timeout(_) => Json::String(DAEMON_TIMEOUT_ERROR.to_owned()),
            DaemonTransportError::Rejected { body, .. } => body,
        }
    }
}

#[async_trait]
pub trait DaemonTransport: Send + Sync {
    /// Returns the decoded response body of a successful (2xx) request.
    async fn send(&self, request: DaemonRequest) -> Result<Json, DaemonTransportError>;
}

/// Re-checks the daemon availability in background.
pub trait DaemonChecker: Send + Sync {
    fn schedule_check(&self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify_response;
    use crate::result::OperationResultKind;
    use serde_json::json;

    #[test]
    fn test_transport_error_classification() {
        let raw = DaemonTransportError::Unreachable("connection refused".to_owned()).into_raw_response();
        assert_eq!(classify_response(raw, &[]).kind, OperationResultKind::DaemonError);

        let raw = DaemonTransportError::Timeout("408".to_owned()).into_raw_response();
        assert_eq!(classify_response(raw, &[]).kind, OperationResultKind::Timeout);

        let rejected = DaemonTransportError::Rejected {
            status: 409,
            body: json!({"error": {"message": "Mnemonic not set", "code": 409}}),
        };
        let raw = rejected.into_raw_response();
        assert_eq!(classify_response(raw, &[]).kind, OperationResultKind::WithoutSeed);
    }
}
