use async_trait::async_trait;
use common::log::debug;
use derive_more::Display;
use hw_net::transport::{slurp_post_json, SlurpError};

#[derive(Clone, Debug, Display, PartialEq)]
pub enum AddressVerificationError {
    #[display(fmt = "Wallet API is unavailable: {}", _0)]
    Transport(SlurpError),
    #[display(fmt = "Address '{}' rejected with {} status: {}", address, status, body)]
    Rejected { address: String, status: u16, body: String },
}

/// Cross-checks addresses derived by the device.
#[async_trait]
pub trait AddressVerifier: Send + Sync {
    async fn verify_address(&self, address: &str) -> Result<(), AddressVerificationError>;
}

/// The general wallet API's `address/verify` endpoint.
pub struct HttpWalletApi {
    base_url: String,
}

impl HttpWalletApi {
    pub fn new(base_url: &str) -> HttpWalletApi {
        HttpWalletApi {
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }
}

#[async_trait]
impl AddressVerifier for HttpWalletApi {
    async fn verify_address(&self, address: &str) -> Result<(), AddressVerificationError> {
        let url = format!("{}/address/verify", self.base_url);
        let body = serde_json::json!({ "address": address }).to_string();
        debug!("Verifying address '{}' at {}", address, url);

        let (status, _headers, body) = slurp_post_json(&url, body)
            .await
            .map_err(AddressVerificationError::Transport)?;
        if status.is_success() {
            return Ok(());
        }
        Err(AddressVerificationError::Rejected {
            address: address.to_owned(),
            status: status.as_u16(),
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}
