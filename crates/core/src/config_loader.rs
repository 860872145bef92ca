use crate::config::AppConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Json, Toml},
    Figment,
};

pub struct ConfigLoader;

impl ConfigLoader {
    fn base() -> Figment {
        Figment::new().merge(Toml::file("config/Config.toml"))
    }

    fn finish(figment: Figment) -> Result<AppConfig> {
        let config: AppConfig = figment
            .merge(Env::prefixed("HEDGEBOT_").split("__"))
            .join(Json::file("config/Config.json"))
            .extract()?;

        config.hedge.validate()?;
        tracing::debug!(
            server = %config.server.addr(),
            spike = config.hedge.volatility_spike_multiplier,
            recovery = config.hedge.volatility_recovery_buffer,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Loads application configuration by merging defaults, TOML, environment variables, and JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be parsed or the hedge
    /// thresholds are invalid.
    pub fn load() -> Result<AppConfig> {
        Self::finish(Self::base())
    }

    /// Loads application configuration with a specific profile.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be parsed or the hedge
    /// thresholds are invalid.
    pub fn load_with_profile(profile: &str) -> Result<AppConfig> {
        Self::finish(Self::base().merge(Toml::file(format!("config/Config.{profile}.toml"))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_load_without_files_uses_defaults() {
        Jail::expect_with(|_jail| {
            let config = ConfigLoader::load().map_err(|e| e.to_string())?;
            assert_eq!(config.server.port, 8080);
            assert!((config.hedge.drawdown_trigger_r - 2.0).abs() < f64::EPSILON);
            Ok(())
        });
    }

    #[test]
    fn test_toml_and_env_layering() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file(
                "config/Config.toml",
                r#"
                [server]
                host = "127.0.0.1"
                port = 9000

                [hedge]
                news_lead_minutes = 45.0
                "#,
            )?;
            jail.set_env("HEDGEBOT_HEDGE__MAX_BASKET_RISK_MULTIPLE", "2.0");

            let config = ConfigLoader::load().map_err(|e| e.to_string())?;
            assert_eq!(config.server.addr(), "127.0.0.1:9000");
            assert!((config.hedge.news_lead_minutes - 45.0).abs() < f64::EPSILON);
            assert!((config.hedge.max_basket_risk_multiple - 2.0).abs() < f64::EPSILON);
            Ok(())
        });
    }

    #[test]
    fn test_profile_overrides_base_file() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file("config/Config.toml", "[hedge]\ndrawdown_trigger_r = 3.0\n")?;
            jail.create_file("config/Config.paper.toml", "[hedge]\ndrawdown_trigger_r = 1.5\n")?;

            let config = ConfigLoader::load_with_profile("paper").map_err(|e| e.to_string())?;
            assert!((config.hedge.drawdown_trigger_r - 1.5).abs() < f64::EPSILON);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file(
                "config/Config.toml",
                "[hedge]\nvolatility_spike_multiplier = 1.0\nvolatility_recovery_buffer = 1.2\n",
            )?;
            assert!(ConfigLoader::load().is_err());
            Ok(())
        });
    }
}
