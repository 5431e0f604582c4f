//! Configuration validation utilities.

use courier_core::BotIdentity;

use super::error::{ConfigError, ConfigResult};
use super::schema::{BotConfig, CourierConfig, LogFormat, LogOutput, LoggingConfig};

/// Telegram usernames are 5 to 32 characters long.
const USERNAME_LEN: std::ops::RangeInclusive<usize> = 5..=32;

/// Validates the entire configuration.
pub fn validate_config(config: &CourierConfig) -> ConfigResult<()> {
    validate_bot_config(&config.bot)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

/// Validates the bot identity.
fn validate_bot_config(bot: &BotConfig) -> ConfigResult<()> {
    let Some(raw) = bot.username.as_deref() else {
        return Ok(());
    };
    let username = BotIdentity::normalize_username(raw);

    if username.is_empty() {
        return Err(ConfigError::missing_field("bot.username"));
    }

    if let Some(c) = username
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
    {
        return Err(ConfigError::invalid_username(
            raw,
            format!("'{c}' is not a letter, digit or underscore"),
        ));
    }

    if !USERNAME_LEN.contains(&username.len()) {
        return Err(ConfigError::invalid_username(
            raw,
            format!(
                "must be {} to {} characters long",
                USERNAME_LEN.start(),
                USERNAME_LEN.end()
            ),
        ));
    }

    Ok(())
}

/// Validates logging settings.
fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    if logging.format == LogFormat::Json && !cfg!(feature = "json-log") {
        return Err(ConfigError::validation(
            "Log format 'json' requires the json-log feature",
        ));
    }

    if let Some(module) = logging.filters.keys().find(|m| m.trim().is_empty()) {
        return Err(ConfigError::validation(format!(
            "Invalid log filter module: {module:?}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    fn with_username(username: &str) -> CourierConfig {
        let mut config = CourierConfig::default();
        config.bot.username = Some(username.to_string());
        config
    }

    #[test]
    fn test_validate_empty_config() {
        let config = CourierConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_usernames() {
        assert!(validate_config(&with_username("ThisBot")).is_ok());
        assert!(validate_config(&with_username("@this_bot")).is_ok());
        assert!(validate_config(&with_username(" ThisBot ")).is_ok());

        assert!(matches!(
            validate_config(&with_username("this bot")),
            Err(ConfigError::InvalidUsername { .. })
        ));
        assert!(matches!(
            validate_config(&with_username("bot")),
            Err(ConfigError::InvalidUsername { .. })
        ));
        assert!(matches!(
            validate_config(&with_username("@")),
            Err(ConfigError::MissingField { .. })
        ));
        assert!(matches!(
            validate_config(&with_username("  ")),
            Err(ConfigError::MissingField { .. })
        ));
    }

    #[test]
    fn test_validate_file_output_needs_path() {
        let mut config = CourierConfig::default();
        config.logging.output = LogOutput::File;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { .. })
        ));

        config.logging.file_path = Some("logs/courier.log".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_filter_module() {
        let mut config = CourierConfig::default();
        config.logging.filters.insert(" ".into(), LogLevel::Debug);
        assert!(validate_config(&config).is_err());
    }

    #[cfg(not(feature = "json-log"))]
    #[test]
    fn test_validate_json_without_feature() {
        let mut config = CourierConfig::default();
        config.logging.format = LogFormat::Json;
        assert!(validate_config(&config).is_err());
    }
}
