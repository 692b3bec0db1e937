//! Soft reconciliation events.
//!
//! None of these abort a pass. They are logged as warnings and returned to
//! the caller next to the lesson list.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A soft problem found while matching records against the timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// No occurrence set carries this discipline name.
    DisciplineUnmatched {
        day: NaiveDate,
        discipline: String,
        records: usize,
    },
    /// More records than same-day occurrences; the surplus got the last one.
    SameDayOccurrenceExhausted {
        day: NaiveDate,
        discipline: String,
        records: usize,
        occurrences: usize,
    },
    /// The subject has occurrences, none of them on this day.
    NoSameDayOccurrence {
        day: NaiveDate,
        discipline: String,
        records: usize,
    },
}

impl Diagnostic {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DisciplineUnmatched { .. } => "discipline_unmatched",
            Self::SameDayOccurrenceExhausted { .. } => "same_day_occurrence_exhausted",
            Self::NoSameDayOccurrence { .. } => "no_same_day_occurrence",
        }
    }

    pub fn day(&self) -> NaiveDate {
        match self {
            Self::DisciplineUnmatched { day, .. }
            | Self::SameDayOccurrenceExhausted { day, .. }
            | Self::NoSameDayOccurrence { day, .. } => *day,
        }
    }

    pub fn discipline(&self) -> &str {
        match self {
            Self::DisciplineUnmatched { discipline, .. }
            | Self::SameDayOccurrenceExhausted { discipline, .. }
            | Self::NoSameDayOccurrence { discipline, .. } => discipline,
        }
    }
}

/// Collects the diagnostics of one reconciliation pass.
///
/// Each pass gets an id so its warnings can be correlated in the logs.
#[derive(Debug)]
pub struct DiagnosticLog {
    pass_id: String,
    entries: Vec<Diagnostic>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self {
            pass_id: Uuid::new_v4().to_string(),
            entries: Vec::new(),
        }
    }

    pub fn pass_id(&self) -> &str {
        &self.pass_id
    }

    /// Record a diagnostic and emit it as a warning.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(
            pass_id = %self.pass_id,
            kind = diagnostic.kind(),
            day = %diagnostic.day(),
            discipline = diagnostic.discipline(),
            "reconciliation diagnostic"
        );
        self.entries.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the log, returning diagnostics in the order they were pushed.
    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl Default for DiagnosticLog {
    fn default() -> Self {
        Self::new()
    }
}
