use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] parkpulse_core::ValidationError),

    #[error("configuration error: {0}")]
    Config(#[from] parkpulse_core::ConfigError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<parkpulse_core::CoreError> for CliError {
    fn from(error: parkpulse_core::CoreError) -> Self {
        match error {
            parkpulse_core::CoreError::Validation(error) => Self::Validation(error),
            parkpulse_core::CoreError::Config(error) => Self::Config(error),
            parkpulse_core::CoreError::Serialization(error) => Self::Serialization(error),
        }
    }
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Config(_) => 3,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_park_exits_with_invalid_input_code() {
        let error = CliError::from(parkpulse_core::ValidationError::UnknownPark {
            value: String::from("epic-universe"),
        });
        assert_eq!(error.exit_code(), 2);
        assert!(error.to_string().contains("epic-universe"));
    }

    #[test]
    fn core_config_errors_keep_their_category() {
        let error = CliError::from(parkpulse_core::CoreError::Config(
            parkpulse_core::ConfigError::InvalidNumber {
                var: "PARKPULSE_RETRIES",
                value: String::from("many"),
            },
        ));
        assert_eq!(error.exit_code(), 3);
    }
}
