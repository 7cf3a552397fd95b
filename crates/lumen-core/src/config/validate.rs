//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
const LOG_FORMATS: [&str; 2] = ["pretty", "json"];

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let captioning = &self.captioning;

        if captioning.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "captioning.supported_formats must not be empty".into(),
            ));
        }
        let caption_ext = captioning.caption_extension.trim_start_matches('.');
        if caption_ext.is_empty() {
            return Err(ConfigError::ValidationError(
                "captioning.caption_extension must not be empty".into(),
            ));
        }
        // A caption extension that is also an image extension would overwrite sources.
        if captioning
            .supported_formats
            .iter()
            .any(|fmt| fmt.trim_start_matches('.').eq_ignore_ascii_case(caption_ext))
        {
            return Err(ConfigError::ValidationError(format!(
                "captioning.caption_extension '{caption_ext}' must not be a supported image format"
            )));
        }
        if !captioning.request_interval_secs.is_finite() || captioning.request_interval_secs < 0.0
        {
            return Err(ConfigError::ValidationError(
                "captioning.request_interval_secs must be a finite value >= 0".into(),
            ));
        }
        if !(0.0..=2.0).contains(&captioning.temperature) {
            return Err(ConfigError::ValidationError(
                "captioning.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.gemini.endpoint.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "gemini.endpoint must not be empty".into(),
            ));
        }
        if self.gemini.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "gemini.model must not be empty".into(),
            ));
        }
        if self.gemini.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "gemini.timeout_ms must be > 0".into(),
            ));
        }
        let level = self.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                self.logging.level
            )));
        }
        let format = self.logging.format.to_ascii_lowercase();
        if !LOG_FORMATS.contains(&format.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.format must be \"pretty\" or \"json\", got '{}'",
                self.logging.format
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_interval() {
        let mut config = Config::default();
        config.captioning.request_interval_secs = -1.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("request_interval_secs"));

        config.captioning.request_interval_secs = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_zero_interval() {
        let mut config = Config::default();
        config.captioning.request_interval_secs = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_caption_extension_clashing_with_image() {
        let mut config = Config::default();
        config.captioning.caption_extension = ".PNG".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("caption_extension"));
    }

    #[test]
    fn test_validate_rejects_empty_formats() {
        let mut config = Config::default();
        config.captioning.supported_formats.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("supported_formats"));
    }

    #[test]
    fn test_validate_rejects_invalid_temperature() {
        let mut config = Config::default();
        config.captioning.temperature = 2.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.gemini.timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_ms"));
    }

    #[test]
    fn test_validate_logging_level() {
        let mut config = Config::default();
        config.logging.level = "WARN".to_string();
        assert!(config.validate().is_ok());

        config.logging.level = "loud".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("logging.level"));
    }

    #[test]
    fn test_validate_logging_format() {
        let mut config = Config::default();
        config.logging.format = "json".to_string();
        assert!(config.validate().is_ok());

        config.logging.format = "xml".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("logging.format"));
    }
}
