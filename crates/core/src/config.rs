use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub hedge: HedgeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/hedgebot".to_string(),
            max_connections: 10,
        }
    }
}

/// How the hedge instrument is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HedgeMode {
    /// Offset the exposed symbol directly.
    #[default]
    Hedging,
    /// Offset through a negatively correlated substitute when one qualifies.
    Netting,
}

/// Thresholds that drive trigger evaluation, sizing, and close hysteresis.
///
/// Serialized in camelCase for request payloads; snake_case aliases let the
/// same struct load from TOML and `HEDGEBOT_HEDGE__*` environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HedgeConfig {
    /// Open an ATR hedge when `atr/price` exceeds this multiple of the median ratio.
    #[serde(alias = "volatility_spike_multiplier")]
    pub volatility_spike_multiplier: f64,
    /// Close an ATR hedge once `atr/price` is back at or below this multiple.
    #[serde(alias = "volatility_recovery_buffer")]
    pub volatility_recovery_buffer: f64,
    /// News events further out than this are ignored.
    #[serde(alias = "news_lead_minutes")]
    pub news_lead_minutes: f64,
    /// Drawdown (in R) at which a drawdown hedge opens.
    #[serde(alias = "drawdown_trigger_r")]
    pub drawdown_trigger_r: f64,
    /// Hedge quantity cap as a multiple of the base exposure.
    #[serde(alias = "max_basket_risk_multiple")]
    pub max_basket_risk_multiple: f64,
}

impl Default for HedgeConfig {
    fn default() -> Self {
        Self {
            volatility_spike_multiplier: 1.3,
            volatility_recovery_buffer: 1.05,
            news_lead_minutes: 60.0,
            drawdown_trigger_r: 2.0,
            max_basket_risk_multiple: 1.5,
        }
    }
}

impl HedgeConfig {
    /// Returns a copy with every field present in `overrides` replaced.
    #[must_use]
    pub fn merged(&self, overrides: &HedgeConfigOverride) -> Self {
        Self {
            volatility_spike_multiplier: overrides
                .volatility_spike_multiplier
                .unwrap_or(self.volatility_spike_multiplier),
            volatility_recovery_buffer: overrides
                .volatility_recovery_buffer
                .unwrap_or(self.volatility_recovery_buffer),
            news_lead_minutes: overrides.news_lead_minutes.unwrap_or(self.news_lead_minutes),
            drawdown_trigger_r: overrides
                .drawdown_trigger_r
                .unwrap_or(self.drawdown_trigger_r),
            max_basket_risk_multiple: overrides
                .max_basket_risk_multiple
                .unwrap_or(self.max_basket_risk_multiple),
        }
    }

    /// Checks that every threshold is finite and positive and that the
    /// recovery buffer sits below the spike multiplier.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        let fields = [
            ("volatilitySpikeMultiplier", self.volatility_spike_multiplier),
            ("volatilityRecoveryBuffer", self.volatility_recovery_buffer),
            ("newsLeadMinutes", self.news_lead_minutes),
            ("drawdownTriggerR", self.drawdown_trigger_r),
            ("maxBasketRiskMultiple", self.max_basket_risk_multiple),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(CoreError::invalid_config(
                    field,
                    format!("must be a positive number, got {value}"),
                ));
            }
        }

        if self.volatility_recovery_buffer >= self.volatility_spike_multiplier {
            return Err(CoreError::invalid_config(
                "volatilityRecoveryBuffer",
                format!(
                    "must be below volatilitySpikeMultiplier ({} >= {})",
                    self.volatility_recovery_buffer, self.volatility_spike_multiplier
                ),
            ));
        }

        Ok(())
    }
}

/// Per-request overrides; absent fields keep the service defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HedgeConfigOverride {
    #[serde(default)]
    pub volatility_spike_multiplier: Option<f64>,
    #[serde(default)]
    pub volatility_recovery_buffer: Option<f64>,
    #[serde(default)]
    pub news_lead_minutes: Option<f64>,
    #[serde(default)]
    pub drawdown_trigger_r: Option<f64>,
    #[serde(default)]
    pub max_basket_risk_multiple: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(HedgeConfig::default().validate().is_ok());
    }

    #[test]
    fn test_merge_only_replaces_present_fields() {
        let overrides = HedgeConfigOverride {
            news_lead_minutes: Some(30.0),
            ..Default::default()
        };
        let merged = HedgeConfig::default().merged(&overrides);
        assert!((merged.news_lead_minutes - 30.0).abs() < f64::EPSILON);
        assert!((merged.volatility_spike_multiplier - 1.3).abs() < f64::EPSILON);
        assert!((merged.max_basket_risk_multiple - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_recovery_buffer_must_be_below_spike() {
        let config = HedgeConfig {
            volatility_recovery_buffer: 1.3,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("volatilityRecoveryBuffer"));
    }

    #[test]
    fn test_non_positive_threshold_rejected() {
        let config = HedgeConfig {
            drawdown_trigger_r: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CoreError::InvalidConfig {
                field: "drawdownTriggerR",
                ..
            })
        ));

        let config = HedgeConfig {
            news_lead_minutes: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_override_parses_camel_case_partial_json() {
        let overrides: HedgeConfigOverride =
            serde_json::from_str(r#"{"volatilitySpikeMultiplier":1.5}"#).unwrap();
        assert_eq!(overrides.volatility_spike_multiplier, Some(1.5));
        assert!(overrides.drawdown_trigger_r.is_none());
    }

    #[test]
    fn test_mode_defaults_to_hedging() {
        assert_eq!(HedgeMode::default(), HedgeMode::Hedging);
        let mode: HedgeMode = serde_json::from_str("\"netting\"").unwrap();
        assert_eq!(mode, HedgeMode::Netting);
    }
}
