use derive_more::Display;
use serde_json::Value as Json;
use std::path::Path;
use std::time::Duration;

const DEFAULT_DAEMON_URL: &str = "http://127.0.0.1:9510/api/v1";
const DEFAULT_WALLET_API_URL: &str = "http://127.0.0.1:6420/api/v2";
const DEFAULT_FIRMWARE_VERSION_URL: &str = "https://version.skycoin.com/skywallet/version.txt";
const DEFAULT_FIRMWARE_DOWNLOAD_URL_PREFIX: &str =
    "https://downloads.skycoin.com/skywallet/skywallet-firmware-v";
const DEFAULT_DAEMON_DOWNLOAD_URL: &str = "https://www.skycoin.com/downloads/";
const DEFAULT_FORCE_WIPE_HELP_URL: &str = "https://www.skycoin.com/skywallet/";

#[derive(Debug, Display)]
pub enum HwConfigError {
    #[display(fmt = "Error reading '{}': {}", path, error)]
    ErrorReading { path: String, error: String },
    #[display(fmt = "Error deserializing config: {}", _0)]
    ErrorDeserializing(String),
}

impl std::error::Error for HwConfigError {}

fn default_daemon_url() -> String { DEFAULT_DAEMON_URL.to_owned() }

fn default_wallet_api_url() -> String { DEFAULT_WALLET_API_URL.to_owned() }

fn default_firmware_version_url() -> String { DEFAULT_FIRMWARE_VERSION_URL.to_owned() }

fn default_firmware_download_url_prefix() -> String { DEFAULT_FIRMWARE_DOWNLOAD_URL_PREFIX.to_owned() }

fn default_daemon_download_url() -> String { DEFAULT_DAEMON_DOWNLOAD_URL.to_owned() }

fn default_force_wipe_help_url() -> String { DEFAULT_FORCE_WIPE_HELP_URL.to_owned() }

fn default_daemon_check_interval_ms() -> u64 { 2000 }

fn default_pin_request_timeout_secs() -> u64 { 300 }

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct HwWalletConfig {
    #[serde(default = "default_daemon_url")]
    pub daemon_url: String,
    /// The general wallet API used to verify the derived addresses.
    #[serde(default = "default_wallet_api_url")]
    pub wallet_api_url: String,
    #[serde(default = "default_firmware_version_url")]
    pub firmware_version_url: String,
    /// The firmware binary is downloaded from `{prefix}{version}.bin`.
    #[serde(default = "default_firmware_download_url_prefix")]
    pub firmware_download_url_prefix: String,
    #[serde(default = "default_daemon_check_interval_ms")]
    pub daemon_check_interval_ms: u64,
    #[serde(default = "default_pin_request_timeout_secs")]
    pub pin_request_timeout_secs: u64,
    /// Dialogs poll `/available` while they're open.
    #[serde(default = "common::true_f")]
    pub poll_hw_connection: bool,
    #[serde(default = "common::true_f")]
    pub close_dialogs_if_hw_disconnected: bool,
    #[serde(default = "default_daemon_download_url")]
    pub daemon_download_url: String,
    #[serde(default = "default_force_wipe_help_url")]
    pub force_wipe_help_url: String,
}

impl Default for HwWalletConfig {
    fn default() -> Self {
        HwWalletConfig {
            daemon_url: default_daemon_url(),
            wallet_api_url: default_wallet_api_url(),
            firmware_version_url: default_firmware_version_url(),
            firmware_download_url_prefix: default_firmware_download_url_prefix(),
            daemon_check_interval_ms: default_daemon_check_interval_ms(),
            pin_request_timeout_secs: default_pin_request_timeout_secs(),
            poll_hw_connection: true,
            close_dialogs_if_hw_disconnected: true,
            daemon_download_url: default_daemon_download_url(),
            force_wipe_help_url: default_force_wipe_help_url(),
        }
    }
}

impl HwWalletConfig {
    pub fn from_json(conf: Json) -> Result<HwWalletConfig, HwConfigError> {
        serde_json::from_value(conf).map_err(|e| HwConfigError::ErrorDeserializing(e.to_string()))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<HwWalletConfig, HwConfigError> {
        let path = path.as_ref();
        let content = std::fs::read(path).map_err(|e| HwConfigError::ErrorReading {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        serde_json::from_slice(&content).map_err(|e| HwConfigError::ErrorDeserializing(e.to_string()))
    }

    pub fn daemon_check_interval(&self) -> Duration { Duration::from_millis(self.daemon_check_interval_ms) }

    pub fn pin_request_timeout(&self) -> Duration { Duration::from_secs(self.pin_request_timeout_secs) }
}
