//! Expansion of weekly timetable cards into concrete dates.
//!
//! A card only says "weekday W, period P". Each card is anchored on today's
//! date at the period's start time, moved forward to weekday W, and then
//! walked week by week into the requested window. All stepping happens on
//! civil wall-clock values.

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, Utc, Weekday};
use chrono_tz::Tz;
use serde::Serialize;

use super::timetable_index::TimetableIndex;
use crate::error::{ErrorContext, ScheduleError, ScheduleResult};
use crate::models::{parse_start_time, CardRow, CivilZone};

/// Date window occurrences are generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl Window {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// Window ending `ahead` after `now` and spanning `back` before that end.
    pub fn around(now: DateTime<Utc>, back: Duration, ahead: Duration) -> Self {
        let to = now + ahead;
        Self { from: to - back, to }
    }
}

/// All generated dates of one subject, ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccurrenceSet {
    pub subject: String,
    pub dates: Vec<DateTime<Tz>>,
}

impl OccurrenceSet {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            dates: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Generates occurrence sets in a fixed civil zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct OccurrenceGenerator {
    zone: CivilZone,
}

impl OccurrenceGenerator {
    pub fn new(zone: CivilZone) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> CivilZone {
        self.zone
    }

    /// One occurrence set per lesson of `class_short`, in document order.
    ///
    /// `now` fixes the anchor day. Every returned date `d` satisfies
    /// `window.from < d <= window.to`.
    pub fn class_occurrences(
        &self,
        index: &TimetableIndex<'_>,
        class_short: &str,
        window: &Window,
        now: DateTime<Utc>,
    ) -> ScheduleResult<Vec<OccurrenceSet>> {
        let class = index.class_by_short(class_short)?;
        let today = self.zone.to_local(&now).date();
        let from = self.zone.to_local(&window.from);
        let to = self.zone.to_local(&window.to);

        let mut result = Vec::new();
        for lesson in index.lessons_for_class(&class.id) {
            let subject = index.subject(&lesson.subjectid).ok_or_else(|| {
                ScheduleError::subject_not_found(&lesson.subjectid).with_context(
                    ErrorContext::new("class_occurrences")
                        .with_entity("lessons")
                        .with_entity_id(&lesson.id),
                )
            })?;

            let mut local_dates = Vec::new();
            for card in index.cards_for_lesson(&lesson.id) {
                let weekday = card_weekday(card)?;
                let period = index.period(&card.period).ok_or_else(|| {
                    ScheduleError::period_not_found(&card.period).with_context(
                        ErrorContext::new("expand_card")
                            .with_entity("cards")
                            .with_entity_id(&card.id),
                    )
                })?;
                let start = parse_start_time(&period.starttime).map_err(|e| {
                    e.with_context(
                        ErrorContext::new("expand_card")
                            .with_entity("periods")
                            .with_entity_id(&period.id),
                    )
                })?;

                let anchor = shift_to_weekday(today.and_time(start), weekday);
                local_dates.extend(extrapolate_weekly(anchor, from, to));
            }
            local_dates.sort();

            let dates = local_dates
                .into_iter()
                .map(|local| self.zone.localize(local))
                .collect::<ScheduleResult<Vec<_>>>()?;

            tracing::debug!(
                class = class_short,
                subject = %subject.name,
                occurrences = dates.len(),
                "expanded lesson cards"
            );
            result.push(OccurrenceSet {
                subject: subject.name.clone(),
                dates,
            });
        }

        Ok(result)
    }
}

fn card_weekday(card: &CardRow) -> ScheduleResult<Weekday> {
    card.days.weekday().ok_or_else(|| {
        ScheduleError::invalid_weekday_mask(card.days.as_str()).with_context(
            ErrorContext::new("expand_card")
                .with_entity("cards")
                .with_entity_id(&card.id),
        )
    })
}

/// Move `anchor` forward (0..=6 days) onto `target`.
pub(crate) fn shift_to_weekday(anchor: NaiveDateTime, target: Weekday) -> NaiveDateTime {
    let current = anchor.weekday().num_days_from_monday() as i64;
    let wanted = target.num_days_from_monday() as i64;
    anchor + Duration::days((wanted - current + 7) % 7)
}

/// Weekly dates congruent with `date` inside `(from, to]`.
///
/// The anchor can sit anywhere relative to the window, so walk back until
/// it is not after `from`, then forward to the first date after `from`.
pub(crate) fn extrapolate_weekly(
    mut date: NaiveDateTime,
    from: NaiveDateTime,
    to: NaiveDateTime,
) -> Vec<NaiveDateTime> {
    let week = Duration::weeks(1);
    while date > from {
        date -= week;
    }
    while date <= from {
        date += week;
    }

    let mut result = Vec::new();
    while date <= to {
        result.push(date);
        date += week;
    }
    result
}

#[cfg(test)]
#[path = "occurrences_tests.rs"]
mod occurrences_tests;
