//! Error types for the dispatch core

pub type Result<T> = std::result::Result<T, DispatchError>;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Filter rule references a provider that is not registered
    #[error("Filter rule references unknown provider '{provider}'")]
    UnknownProvider { provider: String },

    /// A provider with this name is already registered
    #[error("Provider '{provider}' is already registered")]
    DuplicateProvider { provider: String },

    /// Factory already shut down
    #[error("Logging pipeline already shut down")]
    FactoryStopped,

    /// A sink failed to write an event (provider-local, never surfaced to
    /// logging callers)
    #[error("Sink '{sink}' write failed: {message}")]
    SinkWrite { sink: String, message: String },
}

impl DispatchError {
    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        DispatchError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create an unknown provider error
    pub fn unknown_provider(provider: impl Into<String>) -> Self {
        DispatchError::UnknownProvider {
            provider: provider.into(),
        }
    }

    /// Create a duplicate provider error
    pub fn duplicate_provider(provider: impl Into<String>) -> Self {
        DispatchError::DuplicateProvider {
            provider: provider.into(),
        }
    }

    /// Create a sink write error
    pub fn sink_write(sink: impl Into<String>, message: impl Into<String>) -> Self {
        DispatchError::SinkWrite {
            sink: sink.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = DispatchError::config("FilterConfig", "bad level");
        assert!(matches!(err, DispatchError::InvalidConfiguration { .. }));

        let err = DispatchError::unknown_provider("syslog");
        assert!(matches!(err, DispatchError::UnknownProvider { .. }));

        let err = DispatchError::duplicate_provider("console");
        assert!(matches!(err, DispatchError::DuplicateProvider { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = DispatchError::config("FilterConfig", "'verbose' is not a level");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for FilterConfig: 'verbose' is not a level"
        );

        let err = DispatchError::unknown_provider("syslog");
        assert_eq!(
            err.to_string(),
            "Filter rule references unknown provider 'syslog'"
        );

        let err = DispatchError::sink_write("console", "pipe closed");
        assert_eq!(err.to_string(), "Sink 'console' write failed: pipe closed");
    }
}
