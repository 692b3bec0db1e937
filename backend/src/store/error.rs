//! Error types for the timetable blob cache.

use crate::error::ErrorContext;

/// Result type for cache operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading, writing or removing a cached blob failed.
    #[error("Cache I/O error: {message} {context}")]
    Io {
        message: String,
        context: ErrorContext,
        #[source]
        source: std::io::Error,
    },

    /// Invalid cache settings.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl StoreError {
    pub fn io(source: std::io::Error, context: ErrorContext) -> Self {
        Self::Io {
            message: source.to_string(),
            context,
            source,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "CACHE_IO_ERROR",
            Self::Configuration(_) => "CACHE_CONFIGURATION_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display_carries_context() {
        let err = StoreError::io(
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            ErrorContext::new("put").with_entity_id("schedule.json"),
        );
        let text = err.to_string();
        assert!(text.contains("denied"));
        assert!(text.contains("operation=put"));
        assert!(text.contains("id=schedule.json"));
        assert_eq!(err.code(), "CACHE_IO_ERROR");
    }
}
