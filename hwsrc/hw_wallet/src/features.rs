/// Device metadata returned by `GET /features`.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct HwFeatures {
    pub vendor: Option<String>,
    pub device_id: Option<String>,
    pub label: Option<String>,
    pub bootloader_mode: bool,
    pub pin_protection: bool,
    pub passphrase_protection: bool,
    pub needs_backup: bool,
    pub initialized: bool,
    pub firmware_major_version: u32,
    pub firmware_minor_version: u32,
    pub firmware_patch_version: u32,
}

impl HwFeatures {
    pub fn firmware_version(&self) -> String {
        format!(
            "{}.{}.{}",
            self.firmware_major_version, self.firmware_minor_version, self.firmware_patch_version
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partial_features() {
        let features: HwFeatures = serde_json::from_value(json!({
            "vendor": "Skycoin Foundation",
            "bootloader_mode": true,
            "firmware_major_version": 1,
            "firmware_minor_version": 8,
            "firmware_patch_version": 2,
            "unknown_field": 42,
        }))
        .unwrap();
        assert!(features.bootloader_mode);
        assert!(!features.pin_protection);
        assert_eq!(features.label, None);
        assert_eq!(features.firmware_version(), "1.8.2");
    }
}
