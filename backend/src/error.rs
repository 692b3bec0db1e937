//! Error types for timetable decoding and occurrence generation.
//!
//! Everything in this module is fatal to a reconciliation pass. Soft
//! problems (unmatched disciplines, missing same-day occurrences) are not
//! errors; they are reported as [`crate::services::diagnostics::Diagnostic`].

use std::fmt;

/// Result type for timetable and occurrence operations.
pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// Structured context attached to errors.
///
/// Provides additional information about where and why an error occurred.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// The operation being performed (e.g., "decode_rows", "expand_card")
    pub operation: Option<String>,
    /// The entity type involved (e.g., "cards", "periods")
    pub entity: Option<String>,
    /// The entity ID if applicable
    pub entity_id: Option<String>,
    /// Additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with an operation name.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    /// Set the entity type.
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Set the entity ID.
    pub fn with_entity_id(mut self, id: impl ToString) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    /// Set additional details.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    fn is_empty(&self) -> bool {
        self.operation.is_none()
            && self.entity.is_none()
            && self.entity_id.is_none()
            && self.details.is_none()
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        let mut parts = Vec::new();
        if let Some(ref op) = self.operation {
            parts.push(format!("operation={}", op));
        }
        if let Some(ref entity) = self.entity {
            parts.push(format!("entity={}", entity));
        }
        if let Some(ref id) = self.entity_id {
            parts.push(format!("id={}", id));
        }
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Fatal errors raised while decoding the timetable or expanding cards.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    /// The requested class is absent from the timetable's `classes` table.
    #[error("Class not found: {class} {context}")]
    ClassNotFound { class: String, context: ErrorContext },

    /// A card carries a weekday mask other than a single Mon–Fri flag.
    #[error("Invalid weekday mask: {mask:?} {context}")]
    InvalidWeekdayMask { mask: String, context: ErrorContext },

    /// A start time or a computed anchor could not be built in the civil zone.
    #[error("Time parse error: {message} {context}")]
    TimeParse { message: String, context: ErrorContext },

    /// The configured timezone identifier is unknown.
    #[error("Invalid timezone: {message} {context}")]
    InvalidTimezone { message: String, context: ErrorContext },

    /// A lesson row references a subject id missing from `subjects`.
    #[error("Subject not found: {subject} {context}")]
    SubjectNotFound { subject: String, context: ErrorContext },

    /// A card references a period id missing from `periods`.
    #[error("Period not found: {period} {context}")]
    PeriodNotFound { period: String, context: ErrorContext },

    /// The timetable document or one of its rows is malformed.
    #[error("Decode error: {message} {context}")]
    Decode { message: String, context: ErrorContext },
}

impl ScheduleError {
    pub fn class_not_found(class: impl Into<String>) -> Self {
        Self::ClassNotFound {
            class: class.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn invalid_weekday_mask(mask: impl Into<String>) -> Self {
        Self::InvalidWeekdayMask {
            mask: mask.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn time_parse(message: impl Into<String>) -> Self {
        Self::TimeParse {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn invalid_timezone(message: impl Into<String>) -> Self {
        Self::InvalidTimezone {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn subject_not_found(subject: impl Into<String>) -> Self {
        Self::SubjectNotFound {
            subject: subject.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn period_not_found(period: impl Into<String>) -> Self {
        Self::PeriodNotFound {
            period: period.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create a decode error with full context.
    pub fn decode_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Decode {
            message: message.into(),
            context,
        }
    }

    /// Get the error context.
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::ClassNotFound { context, .. }
            | Self::InvalidWeekdayMask { context, .. }
            | Self::TimeParse { context, .. }
            | Self::InvalidTimezone { context, .. }
            | Self::SubjectNotFound { context, .. }
            | Self::PeriodNotFound { context, .. }
            | Self::Decode { context, .. } => context,
        }
    }

    /// Replace the error context.
    pub fn with_context(mut self, new_context: ErrorContext) -> Self {
        match &mut self {
            Self::ClassNotFound { context, .. }
            | Self::InvalidWeekdayMask { context, .. }
            | Self::TimeParse { context, .. }
            | Self::InvalidTimezone { context, .. }
            | Self::SubjectNotFound { context, .. }
            | Self::PeriodNotFound { context, .. }
            | Self::Decode { context, .. } => *context = new_context,
        }
        self
    }

    /// Stable code used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ClassNotFound { .. } => "CLASS_NOT_FOUND",
            Self::InvalidWeekdayMask { .. } => "INVALID_WEEKDAY_MASK",
            Self::TimeParse { .. } => "TIME_PARSE_ERROR",
            Self::InvalidTimezone { .. } => "INVALID_TIMEZONE",
            Self::SubjectNotFound { .. } => "SUBJECT_NOT_FOUND",
            Self::PeriodNotFound { .. } => "PERIOD_NOT_FOUND",
            Self::Decode { .. } => "DECODE_ERROR",
        }
    }
}
