use async_trait::async_trait;
use common::log::{debug, info};
use derive_more::Display;
use hw_net::transport::{slurp_url, SlurpError};

#[derive(Clone, Debug, Display, PartialEq)]
pub enum FirmwareDownloadError {
    #[display(fmt = "Firmware server is unavailable: {}", _0)]
    Transport(SlurpError),
    #[display(fmt = "'{}' responded with {} status", url, status)]
    UnexpectedStatus { url: String, status: u16 },
    #[display(fmt = "Invalid firmware version: '{}'", _0)]
    InvalidVersion(String),
}

impl From<SlurpError> for FirmwareDownloadError {
    fn from(e: SlurpError) -> Self { FirmwareDownloadError::Transport(e) }
}

#[async_trait]
pub trait FirmwareSource: Send + Sync {
    /// The latest published firmware version, without the leading `v`.
    async fn latest_version(&self) -> Result<String, FirmwareDownloadError>;

    async fn download(&self, version: &str) -> Result<Vec<u8>, FirmwareDownloadError>;
}

pub fn normalize_version(version: &str) -> String {
    let version = version.trim();
    version.strip_prefix('v').unwrap_or(version).to_owned()
}

pub fn firmware_url(download_url_prefix: &str, version: &str) -> String {
    format!("{}{}.bin", download_url_prefix, version)
}

pub struct HttpFirmwareSource {
    version_url: String,
    download_url_prefix: String,
}

impl HttpFirmwareSource {
    pub fn new(version_url: &str, download_url_prefix: &str) -> HttpFirmwareSource {
        HttpFirmwareSource {
            version_url: version_url.to_owned(),
            download_url_prefix: download_url_prefix.to_owned(),
        }
    }

    async fn fetch(url: &str) -> Result<Vec<u8>, FirmwareDownloadError> {
        debug!("Fetching '{}'", url);
        let (status, _headers, body) = slurp_url(url).await?;
        if !status.is_success() {
            return Err(FirmwareDownloadError::UnexpectedStatus {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl FirmwareSource for HttpFirmwareSource {
    async fn latest_version(&self) -> Result<String, FirmwareDownloadError> {
        let body = HttpFirmwareSource::fetch(&self.version_url).await?;
        let text = String::from_utf8_lossy(&body);
        let version = normalize_version(&text);
        if version.is_empty() {
            return Err(FirmwareDownloadError::InvalidVersion(text.into_owned()));
        }
        Ok(version)
    }

    async fn download(&self, version: &str) -> Result<Vec<u8>, FirmwareDownloadError> {
        let url = firmware_url(&self.download_url_prefix, version);
        let firmware = HttpFirmwareSource::fetch(&url).await?;
        info!("Downloaded firmware v{}: {} bytes", version, firmware.len());
        Ok(firmware)
    }
}
