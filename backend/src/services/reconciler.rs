//! Date correction of scraped lesson records against generated occurrences.
//!
//! Both sides are normalized through the discipline table: occurrence sets
//! are keyed by the canonical form of their subject name, records are
//! grouped by (calendar day, canonical discipline). Within a group the i-th record in scrape order takes the i-th occurrence of that
//! day; surplus records take the last one.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use super::diagnostics::{Diagnostic, DiagnosticLog};
use super::disciplines::DisciplineTable;
use super::occurrences::OccurrenceSet;
use crate::models::{LessonDate, RawLessonRecord, ReconciledLesson};

/// Output of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub pass_id: String,
    pub lessons: Vec<ReconciledLesson>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct Reconciler<'a> {
    disciplines: &'a DisciplineTable,
    now: DateTime<Utc>,
}

impl<'a> Reconciler<'a> {
    pub fn new(disciplines: &'a DisciplineTable, now: DateTime<Utc>) -> Self {
        Self { disciplines, now }
    }

    /// Correct record dates and attach upcoming occurrences.
    ///
    /// Never fails: every input record is in the output, degraded to its
    /// provisional day when the timetable has nothing for it.
    pub fn reconcile(
        &self,
        records: Vec<RawLessonRecord>,
        sets: &[OccurrenceSet],
    ) -> Reconciliation {
        let by_subject = self.merge_sets(sets);
        let mut log = DiagnosticLog::new();

        let groups = self.group_records(&records);
        let mut lessons: Vec<ReconciledLesson> =
            records.into_iter().map(ReconciledLesson::from).collect();

        for group in groups {
            let Some(dates) = by_subject.get(group.discipline.as_str()) else {
                log.push(Diagnostic::DisciplineUnmatched {
                    day: group.day,
                    discipline: group.discipline.clone(),
                    records: group.members.len(),
                });
                continue;
            };

            let next_dates: Vec<DateTime<FixedOffset>> = dates
                .iter()
                .filter(|d| d.with_timezone(&Utc) > self.now)
                .map(DateTime::fixed_offset)
                .collect();
            let same_day: Vec<DateTime<FixedOffset>> = dates
                .iter()
                .filter(|d| d.date_naive() == group.day)
                .map(DateTime::fixed_offset)
                .collect();

            if same_day.is_empty() {
                log.push(Diagnostic::NoSameDayOccurrence {
                    day: group.day,
                    discipline: group.discipline.clone(),
                    records: group.members.len(),
                });
            } else if group.members.len() > same_day.len() {
                log.push(Diagnostic::SameDayOccurrenceExhausted {
                    day: group.day,
                    discipline: group.discipline.clone(),
                    records: group.members.len(),
                    occurrences: same_day.len(),
                });
            }

            for (position, &member) in group.members.iter().enumerate() {
                let lesson = &mut lessons[member];
                lesson.next_dates = next_dates.clone();
                if let Some(last) = same_day.last() {
                    let corrected = same_day.get(position).unwrap_or(last);
                    tracing::debug!(
                        discipline = %group.discipline,
                        from = %lesson.day.calendar_day(),
                        to = %corrected,
                        "correcting lesson date"
                    );
                    lesson.day = LessonDate::Scheduled(*corrected);
                }
            }
        }

        lessons.sort_by(compare_by_next_date);

        tracing::info!(
            pass_id = log.pass_id(),
            lessons = lessons.len(),
            diagnostics = log.len(),
            "reconciliation finished"
        );
        Reconciliation {
            pass_id: log.pass_id().to_string(),
            lessons,
            diagnostics: log.into_entries(),
        }
    }

    /// Occurrence dates per canonical subject name, merged and re-sorted.
    fn merge_sets(&self, sets: &[OccurrenceSet]) -> HashMap<String, Vec<DateTime<Tz>>> {
        let mut merged: HashMap<String, Vec<DateTime<Tz>>> = HashMap::new();
        for set in sets {
            merged
                .entry(self.disciplines.canonical(&set.subject).to_string())
                .or_default()
                .extend(set.dates.iter().copied());
        }
        for dates in merged.values_mut() {
            dates.sort();
        }
        merged
    }

    /// Groups in order of first appearance; members keep scrape order.
    fn group_records(&self, records: &[RawLessonRecord]) -> Vec<RecordGroup> {
        let mut groups: Vec<RecordGroup> = Vec::new();
        let mut positions: HashMap<(NaiveDate, String), usize> = HashMap::new();

        for (i, record) in records.iter().enumerate() {
            let discipline = self.disciplines.canonical(&record.discipline);
            let slot = *positions
                .entry((record.day, discipline.to_string()))
                .or_insert_with(|| {
                    groups.push(RecordGroup {
                        day: record.day,
                        discipline: discipline.to_string(),
                        members: Vec::new(),
                    });
                    groups.len() - 1
                });
            groups[slot].members.push(i);
        }
        groups
    }
}

struct RecordGroup {
    day: NaiveDate,
    discipline: String,
    members: Vec<usize>,
}

/// Lessons without upcoming dates first, then by first upcoming date.
fn compare_by_next_date(a: &ReconciledLesson, b: &ReconciledLesson) -> Ordering {
    match (a.next_dates.first(), b.next_dates.first()) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.cmp(y),
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod reconciler_tests;
