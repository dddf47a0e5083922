use crate::config::types::{
    Config, ElementTarget, EngineConfig, ExtractorConfig, HttpConfig, OutputConfig, SinkKind,
};
use crate::ConfigError;

/// Upper bound on links fetched concurrently in one batch
const MAX_BATCH_SIZE: usize = 1000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_engine_config(&config.engine)?;
    validate_http_config(&config.http)?;
    validate_extractor_config(&config.extractor)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates batch engine configuration
fn validate_engine_config(config: &EngineConfig) -> Result<(), ConfigError> {
    if config.batch_size < 1 || config.batch_size > MAX_BATCH_SIZE {
        return Err(ConfigError::Validation(format!(
            "batch_size must be between 1 and {}, got {}",
            MAX_BATCH_SIZE, config.batch_size
        )));
    }

    if config.batch_timeout().is_zero() {
        return Err(ConfigError::Validation(
            "batch timeout must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates extraction targets
fn validate_extractor_config(config: &ExtractorConfig) -> Result<(), ConfigError> {
    validate_target("identifier", &config.identifier.container)?;

    if config.identifier.inner_element.trim().is_empty() {
        return Err(ConfigError::Validation(
            "identifier inner_element cannot be empty".to_string(),
        ));
    }

    validate_target("name", &config.name)?;
    validate_target("price", &config.price)?;
    Ok(())
}

/// Validates a single element-kind + class target
fn validate_target(field: &str, target: &ElementTarget) -> Result<(), ConfigError> {
    if target.element.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "{} element cannot be empty",
            field
        )));
    }

    if !target
        .element
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "{} element '{}' is not a valid element name",
            field, target.element
        )));
    }

    if target.class.is_empty() {
        return Err(ConfigError::Validation(format!(
            "{} class cannot be empty",
            field
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.sink != SinkKind::Display && config.path.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "output path cannot be empty for the {:?} sink",
            config.sink
        )));
    }

    Ok(())
}
