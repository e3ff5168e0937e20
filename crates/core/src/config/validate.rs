use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Tool path is not blank
/// - Batches run one job at a time
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.tool.path.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "tool.path cannot be empty".to_string(),
        ));
    }

    if config.batch.max_concurrent != 1 {
        return Err(ConfigError::ValidationError(format!(
            "batch.max_concurrent must be 1 (got {})",
            config.batch.max_concurrent
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_validate_default_config() {
        assert_ok!(validate_config(&Config::default()));
    }

    #[test]
    fn test_validate_blank_path_fails() {
        let mut config = Config::default();
        config.tool.path = "   ".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_blank_path_rejected_with_message() {
        let mut config = Config::default();
        config.tool.path = String::new();
        let err = assert_err!(validate_config(&config));
        assert!(err.to_string().contains("tool.path"));
    }

    #[test]
    fn test_validate_concurrency_fails() {
        let mut config = Config::default();
        config.batch.max_concurrent = 3;
        let err = assert_err!(validate_config(&config));
        assert!(err.to_string().contains("max_concurrent must be 1"));
    }
}
