use thiserror::Error;

/// Errors raised while loading or validating tuning configuration.
///
/// The per-tick update path never produces these; invalid numeric input is
/// clamped at the update boundary instead.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON config error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML config error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("{field} = {value} is out of range [{min}, {max}]")]
    OutOfRange { field: String, value: f32, min: f32, max: f32 },

    #[error("Inconsistent config: {reason}")]
    Inconsistent { reason: String },
}

impl ConfigError {
    /// Range/consistency failures can be fixed by editing the file; parse and
    /// IO failures usually mean the wrong file was given.
    pub fn is_validation(&self) -> bool {
        matches!(self, ConfigError::OutOfRange { .. } | ConfigError::Inconsistent { .. })
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_message() {
        let err = ConfigError::OutOfRange {
            field: "edge.max_edge_angle".to_string(),
            value: 2.0,
            min: 0.0,
            max: 1.5,
        };
        assert_eq!(err.to_string(), "edge.max_edge_angle = 2 is out of range [0, 1.5]");
        assert!(err.is_validation());
    }

    #[test]
    fn test_json_error_converts() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: ConfigError = parse.unwrap_err().into();
        assert!(matches!(err, ConfigError::Json(_)));
        assert!(!err.is_validation());
    }
}
