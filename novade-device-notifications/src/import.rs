//! Import eligibility: decides whether a freshly mounted volume should be
//! offered to the media import UI.

use std::collections::HashSet;

use crate::config::ImportConfig;
use crate::types::VolumeType;

pub trait ImportEligibility: Send + Sync {
    /// Whether volumes of this kind can carry importable media.
    fn is_importable(&self, volume_type: VolumeType) -> bool;

    /// Whether cloud import is switched off altogether.
    fn cloud_import_disabled(&self) -> bool;
}

/// Eligibility driven by the `[import]` configuration section.
#[derive(Debug, Clone)]
pub struct ConfiguredImportEligibility {
    importable: HashSet<VolumeType>,
    cloud_import_disabled: bool,
}

impl ConfiguredImportEligibility {
    pub fn new(importable: impl IntoIterator<Item = VolumeType>, cloud_import_disabled: bool) -> Self {
        Self {
            importable: importable.into_iter().collect(),
            cloud_import_disabled,
        }
    }
}

impl From<&ImportConfig> for ConfiguredImportEligibility {
    fn from(config: &ImportConfig) -> Self {
        Self::new(config.importable_volume_types.iter().copied(), config.cloud_import_disabled)
    }
}

impl Default for ConfiguredImportEligibility {
    fn default() -> Self {
        Self::from(&ImportConfig::default())
    }
}

impl ImportEligibility for ConfiguredImportEligibility {
    fn is_importable(&self, volume_type: VolumeType) -> bool {
        self.importable.contains(&volume_type)
    }

    fn cloud_import_disabled(&self) -> bool {
        self.cloud_import_disabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_allow_removable_and_mtp() {
        let eligibility = ConfiguredImportEligibility::default();
        assert!(eligibility.is_importable(VolumeType::Removable));
        assert!(eligibility.is_importable(VolumeType::Mtp));
        assert!(!eligibility.cloud_import_disabled());
    }

    #[test]
    fn restricts_to_configured_types() {
        let eligibility = ConfiguredImportEligibility::new([VolumeType::Mtp], true);
        assert!(!eligibility.is_importable(VolumeType::Removable));
        assert!(eligibility.cloud_import_disabled());
    }
}
