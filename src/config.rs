use std::path::PathBuf;

use crate::machine::boot::DEFAULT_FIRMWARE;

/// Where the bridge finds its files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Directory backing the virtual disk controller, also holding the firmware image
    pub root: PathBuf,
    /// Firmware image name inside `root`
    pub firmware: String,
}

impl BridgeConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn with_firmware(mut self, firmware: impl Into<String>) -> Self {
        self.firmware = firmware.into();
        self
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            firmware: DEFAULT_FIRMWARE.to_owned(),
        }
    }
}
