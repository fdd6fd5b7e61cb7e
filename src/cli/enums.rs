//! CLI enum types.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Where camera frames come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Generated test pattern, no hardware needed
    #[default]
    Synthetic,
    /// Real devices through the platform camera API
    Native,
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Synthetic => "synthetic",
            Backend::Native => "native",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_default_is_synthetic() {
        assert_eq!(Backend::default(), Backend::Synthetic);
    }

    #[test]
    fn test_backend_value_enum_names() {
        assert_eq!(
            Backend::from_str("native", true).unwrap(),
            Backend::Native
        );
        assert_eq!(Backend::Native.name(), "native");
        assert!(Backend::from_str("usb", true).is_err());
    }
}
