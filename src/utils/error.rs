use thiserror::Error;

#[derive(Error, Debug)]
pub enum CardError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Image decoding failed: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Render error: {message}")]
    RenderError { message: String },

    #[error("Card export failed: {message}")]
    ExportError { message: String },
}

/// 錯誤分類，決定回報方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Rendering,
    Export,
    System,
}

/// 錯誤嚴重度，決定 CLI 退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CardError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CardError::ApiError(_) => ErrorCategory::Network,
            CardError::ConfigError { .. }
            | CardError::InvalidConfigValueError { .. }
            | CardError::MissingConfigError { .. } => ErrorCategory::Configuration,
            CardError::RenderError { .. } | CardError::ImageError(_) => ErrorCategory::Rendering,
            CardError::ExportError { .. } | CardError::ZipError(_) => ErrorCategory::Export,
            CardError::IoError(_) | CardError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // API 掛掉可重試或換端點，不算致命
            CardError::ApiError(_) => ErrorSeverity::Medium,
            CardError::ImageError(_) => ErrorSeverity::Low,
            CardError::ConfigError { .. }
            | CardError::InvalidConfigValueError { .. }
            | CardError::MissingConfigError { .. } => ErrorSeverity::High,
            CardError::RenderError { .. } | CardError::ExportError { .. } => ErrorSeverity::High,
            CardError::IoError(_)
            | CardError::SerializationError(_)
            | CardError::ZipError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            CardError::ApiError(_) => {
                "Check that the deals API is reachable and the endpoint URL is correct".to_string()
            }
            CardError::ConfigError { .. }
            | CardError::InvalidConfigValueError { .. }
            | CardError::MissingConfigError { .. } => {
                "Review the configuration values (see --help or the TOML config file)".to_string()
            }
            CardError::ImageError(_) => {
                "The product image could not be decoded; a placeholder will be used".to_string()
            }
            CardError::RenderError { .. } => {
                "Verify the bundled font assets are intact and the card dimensions are sane"
                    .to_string()
            }
            CardError::ExportError { .. } => {
                "Check free disk space and write permissions on the output directory".to_string()
            }
            CardError::IoError(_) => {
                "Check filesystem permissions and that the output path exists".to_string()
            }
            CardError::SerializationError(_) => {
                "The API response shape changed; inspect the raw response".to_string()
            }
            CardError::ZipError(_) => {
                "Archive creation failed; retry without --archive to export loose files"
                    .to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CardError::ApiError(_) => "Could not reach the deals API".to_string(),
            CardError::ConfigError { message } => format!("Configuration problem: {}", message),
            CardError::InvalidConfigValueError { field, .. } => {
                format!("Configuration value for '{}' is invalid", field)
            }
            CardError::MissingConfigError { field } => {
                format!("Configuration field '{}' is required", field)
            }
            CardError::ImageError(_) => "A product image could not be decoded".to_string(),
            CardError::RenderError { message } => format!("Card rendering failed: {}", message),
            CardError::ExportError { message } => format!("Card export failed: {}", message),
            CardError::IoError(e) => format!("File operation failed: {}", e),
            CardError::SerializationError(_) => "Unexpected API response format".to_string(),
            CardError::ZipError(_) => "Could not build the export archive".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = CardError::MissingConfigError {
            field: "api_endpoint".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_image_decode_failure_is_low_severity() {
        let err = CardError::ImageError(image::ImageError::Unsupported(
            image::error::UnsupportedError::from_format_and_kind(
                image::error::ImageFormatHint::Unknown,
                image::error::UnsupportedErrorKind::GenericFeature("bad".to_string()),
            ),
        ));
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert_eq!(err.category(), ErrorCategory::Rendering);
    }

    #[test]
    fn test_export_error_has_actionable_suggestion() {
        let err = CardError::ExportError {
            message: "raster stage panicked".to_string(),
        };
        assert!(err.recovery_suggestion().contains("disk space"));
        assert!(err.user_friendly_message().contains("export failed"));
    }
}
