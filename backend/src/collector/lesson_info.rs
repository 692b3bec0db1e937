//! Lesson-info popup parsing.
//!
//! The diary attaches an `onclick` command to each lesson cell; the third
//! argument is the lesson id. Fetching that id returns a small HTML
//! fragment of `<br />`-separated lines with bold labels.

use scraper::Html;

use crate::error::ErrorContext;
use crate::models::LessonDetails;
use crate::sources::{SourceError, SourceResult};

const COMMAND_PREFIX: &str = "tomval_AjaxCmd(";
const COMMAND_SUFFIX: &str = ", this); return false";

const INFO_MARKER: &str = "<b>Mokytoja(s)";
const LINE_SEPARATOR: &str = "<br />";
const TEACHER_PREFIX: &str = "<b>Mokytoja(s): </b>";
const TOPIC_PREFIX: &str = "<b>Tema: </b>";
const ASSIGNMENT_PREFIX: &str = "<b>Užduotys: </b>";

/// Lesson id from a `tomval_AjaxCmd('cmd', 'hash', 'id', this); return false` handler.
pub fn parse_lesson_info_command(onclick: &str) -> Option<String> {
    onclick.match_indices(COMMAND_PREFIX).find_map(|(start, _)| {
        let mut rest = &onclick[start + COMMAND_PREFIX.len()..];
        let mut args = Vec::with_capacity(3);
        for i in 0..3 {
            if i > 0 {
                rest = rest.strip_prefix(", ")?;
            }
            let (arg, tail) = quoted_word(rest)?;
            args.push(arg);
            rest = tail;
        }
        rest.starts_with(COMMAND_SUFFIX).then(|| args[2].to_string())
    })
}

/// Split `'word'...` into `word` and the remainder.
fn quoted_word(input: &str) -> Option<(&str, &str)> {
    let body = input.strip_prefix('\'')?;
    let end = body.find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))?;
    if end == 0 || !body[end..].starts_with('\'') {
        return None;
    }
    Some((&body[..end], &body[end + 1..]))
}

/// Teacher, topic and assignments from a lesson-info fragment.
pub fn parse_lesson_info_response(html: &str) -> SourceResult<LessonDetails> {
    let start = html.find(INFO_MARKER).ok_or_else(|| {
        SourceError::parse(
            "could not parse lesson info",
            ErrorContext::new("parse_lesson_info").with_details("missing teacher marker"),
        )
    })?;

    let mut details = LessonDetails::default();
    for line in html[start..].split(LINE_SEPARATOR) {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(teacher) = line.strip_prefix(TEACHER_PREFIX) {
            details.teacher = decode_entities(teacher);
        } else if let Some(topic) = line.strip_prefix(TOPIC_PREFIX) {
            details.topic = decode_entities(topic);
        } else {
            let assignment = line.strip_prefix(ASSIGNMENT_PREFIX).unwrap_or(line);
            let assignment = decode_entities(assignment);
            if !assignment.trim().is_empty() {
                details.assignments.push(assignment);
            }
        }
    }

    Ok(details)
}

/// Resolve HTML character references in a text fragment.
fn decode_entities(fragment: &str) -> String {
    if !fragment.contains('&') {
        return fragment.to_string();
    }
    Html::parse_fragment(fragment)
        .root_element()
        .text()
        .collect()
}
