use derive_more::Display;
use http::{HeaderMap, StatusCode};

pub use crate::multipart::MultipartForm;
pub use crate::native_http::{slurp_json_req, slurp_multipart, slurp_post_json, slurp_req, slurp_url};

pub type SlurpResult = Result<(StatusCode, HeaderMap, Vec<u8>), SlurpError>;

#[derive(Clone, Debug, Deserialize, Display, PartialEq, Serialize)]
pub enum SlurpError {
    #[display(fmt = "Error deserializing '{}' response: {}", uri, error)]
    ErrorDeserializing { uri: String, error: String },
    #[display(fmt = "Invalid request: {}", _0)]
    InvalidRequest(String),
    #[display(fmt = "Request '{}' timeout: {}", uri, error)]
    Timeout { uri: String, error: String },
    #[display(fmt = "Transport '{}' error: {}", uri, error)]
    Transport { uri: String, error: String },
    #[display(fmt = "Internal error: {}", _0)]
    Internal(String),
}

impl std::error::Error for SlurpError {}
