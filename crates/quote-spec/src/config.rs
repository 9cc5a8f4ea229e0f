use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_AUTO_ADVANCE_MS: u64 = 300;

/// Session behaviour knobs supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardConfig {
    /// Delay before a single-choice answer moves to the next step.
    #[serde(default = "default_auto_advance_ms")]
    pub auto_advance_delay_ms: u64,
    /// Refuse to leave a step while its required inputs are missing.
    #[serde(default = "default_enforce_required")]
    pub enforce_required: bool,
}

fn default_auto_advance_ms() -> u64 {
    DEFAULT_AUTO_ADVANCE_MS
}

fn default_enforce_required() -> bool {
    true
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            auto_advance_delay_ms: DEFAULT_AUTO_ADVANCE_MS,
            enforce_required: true,
        }
    }
}

impl WizardConfig {
    pub fn auto_advance_delay(&self) -> Duration {
        Duration::from_millis(self.auto_advance_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: WizardConfig = serde_json::from_str("{}").expect("config");
        assert_eq!(config, WizardConfig::default());
        assert_eq!(config.auto_advance_delay(), Duration::from_millis(300));
        assert!(config.enforce_required);
    }

    #[test]
    fn partial_config_keeps_remaining_defaults() {
        let config: WizardConfig =
            serde_json::from_str(r#"{"enforce_required": false}"#).expect("config");
        assert!(!config.enforce_required);
        assert_eq!(config.auto_advance_delay_ms, DEFAULT_AUTO_ADVANCE_MS);

        let config: WizardConfig =
            serde_json::from_str(r#"{"auto_advance_delay_ms": 0}"#).expect("config");
        assert_eq!(config.auto_advance_delay(), Duration::ZERO);
        assert!(config.enforce_required);
    }
}
