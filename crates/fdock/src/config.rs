//! Facade configuration.
//!
//! Every field has a default, so a partial JSON document is enough:
//!
//! ```
//! use fdock::ControlConfig;
//!
//! let config = ControlConfig::from_json(r#"{ "divider_size": 6 }"#).unwrap();
//! assert_eq!(config.divider_size, 6);
//! assert_eq!(config.border_side_snap, 25);
//! ```

use fdock_core::Insets;
use fdock_layout::{CodecLimits, DEFAULT_MAX_PAYLOAD_LEN};
use serde::{Deserialize, Serialize};

use crate::error::ControlError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Root stations use the secure factories.
    pub restricted_environment: bool,
    /// Border around the content of each split root.
    pub root_insets: Insets,
    /// Width in pixels of the band around a divider that grabs the pointer.
    pub divider_size: i32,
    /// Width in pixels of the bands along a split root's border that turn a
    /// drop into an edge drop.
    pub border_side_snap: i32,
    /// Largest binary payload read or skipped.
    pub max_payload_len: u32,
    /// Reject stored layouts of any other format version.
    pub strict_versions: bool,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            restricted_environment: false,
            root_insets: Insets::all(2),
            divider_size: 4,
            border_side_snap: 25,
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
            strict_versions: true,
        }
    }
}

impl ControlConfig {
    /// Parse a JSON document. Negative insets and pixel bands are raised to
    /// zero.
    pub fn from_json(text: &str) -> Result<Self, ControlError> {
        let config: Self = serde_json::from_str(text)?;
        Ok(config.normalized())
    }

    /// This configuration with every pixel quantity non-negative.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            root_insets: self.root_insets.non_negative(),
            divider_size: self.divider_size.max(0),
            border_side_snap: self.border_side_snap.max(0),
            ..self
        }
    }

    pub fn to_json(&self) -> Result<String, ControlError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reader bounds derived from this configuration.
    #[must_use]
    pub fn limits(&self) -> CodecLimits {
        CodecLimits {
            max_payload_len: self.max_payload_len,
            strict_versions: self.strict_versions,
            ..CodecLimits::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_stock_root() {
        let config = ControlConfig::default();
        assert_eq!(config.root_insets, Insets::all(2));
        assert!(!config.restricted_environment);
        assert_eq!(config.limits(), CodecLimits::default());
    }

    #[test]
    fn json_round_trip() {
        let config = ControlConfig {
            restricted_environment: true,
            max_payload_len: 1024,
            ..ControlConfig::default()
        };
        let text = config.to_json().unwrap();
        assert_eq!(ControlConfig::from_json(&text).unwrap(), config);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = ControlConfig::from_json("{ \"divider_size\": \"wide\" }").unwrap_err();
        assert!(matches!(err, ControlError::Config(_)));
    }

    #[test]
    fn negative_pixel_values_are_raised_to_zero() {
        let config = ControlConfig::from_json(
            r#"{
                "root_insets": { "top": 1, "right": -1, "bottom": 0, "left": -2147483648 },
                "divider_size": -3
            }"#,
        )
        .unwrap();
        assert_eq!(config.root_insets, Insets::new(1, 0, 0, 0));
        assert_eq!(config.divider_size, 0);
        assert_eq!(config.border_side_snap, 25);
    }

    #[test]
    fn limits_follow_the_version_policy() {
        let config = ControlConfig {
            strict_versions: false,
            ..ControlConfig::default()
        };
        assert!(!config.limits().strict_versions);
    }
}
