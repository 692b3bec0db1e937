//! Lesson records as scraped from the diary and as returned after reconciliation.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// Teacher note attached to a lesson cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonNotes {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub note: String,
}

/// Extra lesson metadata fetched separately from the marks table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonDetails {
    pub teacher: String,
    pub topic: String,
    pub assignments: Vec<String>,
}

/// A lesson as the diary scraper sees it: dated only by its table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLessonRecord {
    /// Discipline name in the diary's own spelling.
    pub discipline: String,
    /// Calendar day inferred from the column position.
    pub day: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mark: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_notes: Option<LessonNotes>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub teacher: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub topic: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignments: Vec<String>,
}

impl RawLessonRecord {
    pub fn new(discipline: impl Into<String>, day: NaiveDate) -> Self {
        Self {
            discipline: discipline.into(),
            day,
            mark: None,
            lesson_notes: None,
            teacher: String::new(),
            topic: String::new(),
            assignments: Vec::new(),
        }
    }

    /// Merge lesson-info details into the record.
    pub fn apply_details(&mut self, details: LessonDetails) {
        self.teacher = details.teacher;
        self.topic = details.topic;
        self.assignments = details.assignments;
    }
}

/// Date of a reconciled lesson: the scraped day, or a timetable date-time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LessonDate {
    Scheduled(DateTime<FixedOffset>),
    Provisional(NaiveDate),
}

impl LessonDate {
    /// Civil calendar day of the lesson.
    pub fn calendar_day(&self) -> NaiveDate {
        match self {
            Self::Scheduled(at) => at.date_naive(),
            Self::Provisional(day) => *day,
        }
    }

    pub fn is_scheduled(&self) -> bool {
        matches!(self, Self::Scheduled(_))
    }
}

/// A lesson after its date has been checked against the weekly timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledLesson {
    pub discipline: String,
    pub day: LessonDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mark: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_notes: Option<LessonNotes>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub teacher: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub topic: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignments: Vec<String>,
    /// Upcoming timetable dates for this discipline, ascending.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next_dates: Vec<DateTime<FixedOffset>>,
}

impl From<RawLessonRecord> for ReconciledLesson {
    fn from(record: RawLessonRecord) -> Self {
        Self {
            discipline: record.discipline,
            day: LessonDate::Provisional(record.day),
            mark: record.mark,
            lesson_notes: record.lesson_notes,
            teacher: record.teacher,
            topic: record.topic,
            assignments: record.assignments,
            next_dates: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_record_from_json() {
        let record: RawLessonRecord = serde_json::from_value(json!({
            "discipline": "Matematika",
            "day": "2024-09-03",
            "mark": "10",
            "lessonNotes": { "category": "Pagyrimas", "note": "Puikiai" }
        }))
        .unwrap();
        assert_eq!(record.day, NaiveDate::from_ymd_opt(2024, 9, 3).unwrap());
        assert_eq!(record.mark.as_deref(), Some("10"));
        assert!(record.assignments.is_empty());
    }

    #[test]
    fn test_empty_fields_are_omitted() {
        let lesson = ReconciledLesson::from(RawLessonRecord::new(
            "Matematika",
            NaiveDate::from_ymd_opt(2024, 9, 3).unwrap(),
        ));
        let value = serde_json::to_value(&lesson).unwrap();
        assert_eq!(value, json!({ "discipline": "Matematika", "day": "2024-09-03" }));
    }

    #[test]
    fn test_lesson_date_serde() {
        let scheduled: LessonDate = serde_json::from_str("\"2024-09-04T09:00:00+03:00\"").unwrap();
        assert!(scheduled.is_scheduled());
        assert_eq!(
            scheduled.calendar_day(),
            NaiveDate::from_ymd_opt(2024, 9, 4).unwrap()
        );

        let provisional: LessonDate = serde_json::from_str("\"2024-09-04\"").unwrap();
        assert_eq!(
            provisional,
            LessonDate::Provisional(NaiveDate::from_ymd_opt(2024, 9, 4).unwrap())
        );
        assert_eq!(
            serde_json::to_string(&scheduled).unwrap(),
            "\"2024-09-04T09:00:00+03:00\""
        );
    }

    #[test]
    fn test_apply_details() {
        let mut record =
            RawLessonRecord::new("Istorija", NaiveDate::from_ymd_opt(2024, 9, 2).unwrap());
        record.apply_details(LessonDetails {
            teacher: "Jonas Jonaitis".into(),
            topic: "Įvadinė pamoka".into(),
            assignments: vec!["Perskaityti p. 6-7".into()],
        });
        assert_eq!(record.teacher, "Jonas Jonaitis");
        assert_eq!(record.assignments.len(), 1);
    }
}
