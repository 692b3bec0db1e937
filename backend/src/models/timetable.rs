//! Timetable document model.
//!
//! The public timetable endpoint returns a nested set of tables whose rows
//! are free-form field maps. [`TimetableDocument`] mirrors that shape as-is;
//! [`Timetable::decode`] turns the tables this crate needs into typed rows in
//! one pass and fails on the first missing or mis-typed field.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::time::WeekdayMask;
use crate::error::{ErrorContext, ScheduleError, ScheduleResult};

pub const CLASSES_TABLE: &str = "classes";
pub const LESSONS_TABLE: &str = "lessons";
pub const SUBJECTS_TABLE: &str = "subjects";
pub const CARDS_TABLE: &str = "cards";
pub const PERIODS_TABLE: &str = "periods";

/// Raw timetable document as served by the timetable endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimetableDocument {
    pub r: DocumentBody,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentBody {
    #[serde(rename = "dbiAccessorRes", alias = "DbiAccessorRes")]
    pub dbi_accessor_res: TableSet,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableSet {
    #[serde(default)]
    pub tables: Vec<RawTable>,
}

/// One table of the document; rows stay untyped until decoded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTable {
    pub id: String,
    #[serde(default)]
    pub def: TableDef,
    #[serde(default)]
    pub data_rows: Vec<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableDef {
    #[serde(default)]
    pub name: String,
}

impl TimetableDocument {
    /// Parse a document from raw bytes.
    pub fn from_slice(bytes: &[u8]) -> ScheduleResult<Self> {
        let mut de = serde_json::Deserializer::from_slice(bytes);
        serde_path_to_error::deserialize(&mut de).map_err(|e| {
            ScheduleError::decode_with_context(
                e.inner().to_string(),
                ErrorContext::new("parse_document").with_details(format!("path={}", e.path())),
            )
        })
    }

    pub fn table(&self, id: &str) -> Option<&RawTable> {
        self.r.dbi_accessor_res.tables.iter().find(|t| t.id == id)
    }

    /// Decode every row of a table into `T`. A missing table yields no rows.
    pub fn decode_rows<T: DeserializeOwned>(&self, table: &str) -> ScheduleResult<Vec<T>> {
        let Some(raw) = self.table(table) else {
            return Ok(Vec::new());
        };

        raw.data_rows
            .iter()
            .enumerate()
            .map(|(index, row)| {
                serde_path_to_error::deserialize(Value::Object(row.clone())).map_err(|e| {
                    ScheduleError::decode_with_context(
                        e.inner().to_string(),
                        ErrorContext::new("decode_rows")
                            .with_entity(table)
                            .with_entity_id(index)
                            .with_details(format!("path={}", e.path())),
                    )
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRow {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub short: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonRow {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(deserialize_with = "id_strings")]
    pub classids: Vec<String>,
    #[serde(deserialize_with = "id_string")]
    pub subjectid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRow {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    /// Display name; occurrence sets are keyed by it.
    pub name: String,
    #[serde(default)]
    pub short: String,
}

/// A recurrence rule: one lesson, one weekday, one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRow {
    #[serde(default, deserialize_with = "id_string")]
    pub id: String,
    #[serde(deserialize_with = "id_string")]
    pub lessonid: String,
    #[serde(deserialize_with = "id_string")]
    pub period: String,
    pub days: WeekdayMask,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRow {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub starttime: String,
}

/// Typed view of the tables the occurrence generator reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timetable {
    pub classes: Vec<ClassRow>,
    pub lessons: Vec<LessonRow>,
    pub subjects: Vec<SubjectRow>,
    pub cards: Vec<CardRow>,
    pub periods: Vec<PeriodRow>,
}

impl Timetable {
    pub fn decode(document: &TimetableDocument) -> ScheduleResult<Self> {
        Ok(Self {
            classes: document.decode_rows(CLASSES_TABLE)?,
            lessons: document.decode_rows(LESSONS_TABLE)?,
            subjects: document.decode_rows(SUBJECTS_TABLE)?,
            cards: document.decode_rows(CARDS_TABLE)?,
            periods: document.decode_rows(PERIODS_TABLE)?,
        })
    }

    /// Parse and decode raw document bytes.
    pub fn from_slice(bytes: &[u8]) -> ScheduleResult<Self> {
        Self::decode(&TimetableDocument::from_slice(bytes)?)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

/// Row ids come through as strings or integers depending on the table.
fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    RawId::deserialize(deserializer)
        .map(String::from)
        .map_err(|_| de::Error::custom("expected a string or integer id"))
}

fn id_strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Vec::<RawId>::deserialize(deserializer)
        .map(|ids| ids.into_iter().map(String::from).collect())
        .map_err(|_| de::Error::custom("expected a list of string or integer ids"))
}
