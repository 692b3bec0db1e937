//! Lookup tables over a decoded timetable.

use std::collections::HashMap;

use crate::error::{ScheduleError, ScheduleResult};
use crate::models::{CardRow, ClassRow, LessonRow, PeriodRow, SubjectRow, Timetable};

/// Row-id indexes over one [`Timetable`].
///
/// Cards are grouped by lesson id; each group keeps document order.
pub struct TimetableIndex<'a> {
    timetable: &'a Timetable,
    classes: HashMap<&'a str, &'a ClassRow>,
    lessons: HashMap<&'a str, &'a LessonRow>,
    subjects: HashMap<&'a str, &'a SubjectRow>,
    cards_by_lesson: HashMap<&'a str, Vec<&'a CardRow>>,
    periods: HashMap<&'a str, &'a PeriodRow>,
}

impl<'a> TimetableIndex<'a> {
    pub fn new(timetable: &'a Timetable) -> Self {
        let mut cards_by_lesson: HashMap<&str, Vec<&CardRow>> = HashMap::new();
        for card in &timetable.cards {
            cards_by_lesson
                .entry(card.lessonid.as_str())
                .or_default()
                .push(card);
        }

        Self {
            timetable,
            classes: timetable.classes.iter().map(|c| (c.id.as_str(), c)).collect(),
            lessons: timetable.lessons.iter().map(|l| (l.id.as_str(), l)).collect(),
            subjects: timetable.subjects.iter().map(|s| (s.id.as_str(), s)).collect(),
            cards_by_lesson,
            periods: timetable.periods.iter().map(|p| (p.id.as_str(), p)).collect(),
        }
    }

    /// Resolve a class by its short name (e.g. "5d").
    pub fn class_by_short(&self, short: &str) -> ScheduleResult<&'a ClassRow> {
        self.timetable
            .classes
            .iter()
            .find(|c| c.short == short)
            .ok_or_else(|| ScheduleError::class_not_found(short))
    }

    pub fn class(&self, id: &str) -> Option<&'a ClassRow> {
        self.classes.get(id).copied()
    }

    pub fn lesson(&self, id: &str) -> Option<&'a LessonRow> {
        self.lessons.get(id).copied()
    }

    pub fn subject(&self, id: &str) -> Option<&'a SubjectRow> {
        self.subjects.get(id).copied()
    }

    pub fn period(&self, id: &str) -> Option<&'a PeriodRow> {
        self.periods.get(id).copied()
    }

    /// Lessons attended by the class with the given external id, in document order.
    pub fn lessons_for_class(&self, class_id: &str) -> Vec<&'a LessonRow> {
        self.timetable
            .lessons
            .iter()
            .filter(|l| l.classids.iter().any(|id| id == class_id))
            .collect()
    }

    /// Cards scheduling the given lesson, in document order.
    pub fn cards_for_lesson(&self, lesson_id: &str) -> &[&'a CardRow] {
        self.cards_by_lesson
            .get(lesson_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Timetable {
        Timetable::from_slice(include_bytes!("../../tests/fixtures/timetable.json")).unwrap()
    }

    #[test]
    fn test_class_by_short() {
        let timetable = fixture();
        let index = TimetableIndex::new(&timetable);
        assert_eq!(index.class_by_short("5d").unwrap().id, "-12");
        assert_eq!(index.class("-13").unwrap().short, "6a");
        assert!(matches!(
            index.class_by_short("12z"),
            Err(ScheduleError::ClassNotFound { .. })
        ));
    }

    #[test]
    fn test_lessons_for_class_keeps_order() {
        let timetable = fixture();
        let index = TimetableIndex::new(&timetable);
        let ids: Vec<&str> = index
            .lessons_for_class("-12")
            .iter()
            .map(|l| l.id.as_str())
            .collect();
        assert_eq!(ids, vec!["-201", "-202", "-203"]);
        assert_eq!(index.lessons_for_class("-13").len(), 2);
        assert!(index.lessons_for_class("-99").is_empty());
    }

    #[test]
    fn test_cards_grouped_by_lesson() {
        let timetable = fixture();
        let index = TimetableIndex::new(&timetable);
        let cards: Vec<&str> = index
            .cards_for_lesson("-203")
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(cards, vec!["-303", "-304"]);
        assert!(index.cards_for_lesson("-999").is_empty());
    }

    #[test]
    fn test_row_lookups() {
        let timetable = fixture();
        let index = TimetableIndex::new(&timetable);
        assert_eq!(index.subject("-103").unwrap().name, "Matematika");
        assert_eq!(index.period("2").unwrap().starttime, "09:00");
        assert_eq!(index.lesson("-204").unwrap().subjectid, "-104");
        assert!(index.period("9").is_none());
    }
}
