//! Errors from upstream timetable and lesson sources.

use crate::error::{ErrorContext, ScheduleError};

pub type SourceResult<T> = Result<T, SourceError>;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The upstream HTTP request failed or returned a non-success status.
    #[error("Fetch error: {message} {context}")]
    Fetch {
        message: String,
        context: ErrorContext,
    },

    /// Upstream payload was readable but not in the expected shape.
    #[error("Parse error: {message} {context}")]
    Parse {
        message: String,
        context: ErrorContext,
    },

    /// Local file source could not be read.
    #[error("I/O error: {message} {context}")]
    Io {
        message: String,
        context: ErrorContext,
    },

    /// No source of this kind is configured.
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    /// Timetable bytes failed the validating decode.
    #[error(transparent)]
    Decode(#[from] ScheduleError),
}

impl SourceError {
    pub fn fetch(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Fetch {
            message: message.into(),
            context,
        }
    }

    pub fn parse(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Parse {
            message: message.into(),
            context,
        }
    }

    pub fn io(source: &std::io::Error, context: ErrorContext) -> Self {
        Self::Io {
            message: source.to_string(),
            context,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Fetch { .. } => "UPSTREAM_FETCH_ERROR",
            Self::Parse { .. } => "UPSTREAM_PARSE_ERROR",
            Self::Io { .. } => "SOURCE_IO_ERROR",
            Self::Unavailable(_) => "SOURCE_UNAVAILABLE",
            Self::Decode(e) => e.code(),
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        let mut context = ErrorContext::new("fetch_timetable");
        if let Some(url) = err.url() {
            context = context.with_details(format!("url={}", url));
        }
        Self::fetch(err.to_string(), context)
    }
}
