//! Small parsers for values the portal hides in inline scripts and free text.

use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::LazyLock;

use crate::date;
use crate::error::DerivationError;

const LOAD_SUBJECTS_PREFIX: &str = "loadSubjects('/ajax/subj/";
const LOAD_SUBJECTS_SUFFIX: &str = "', true)";
const LESSON_TOPIC_PREFIX: &str = "Тема:";
const MAILTO_PREFIX: &str = "/messages/new/?to=";
const EDU_YEAR_SUFFIX: &str = "учебный год";

static ROLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"Учащийся\s*\(\s*(?P<number>\d+)\s*"(?P<section>[^"]+)"\s*\)"#)
        .expect("role pattern is valid")
});

static MARK_INFO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"showMarkInfo\(\s*'(?P<date>\d{1,2}\s+\p{L}+\s+\d{1,4}\s*г\.)(?:\s*\((?P<dow>\p{L}+)\))?",
    )
    .expect("mark info pattern is valid")
});

static FINAL_MARK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"showMarkItogInfo\(\s*'(?P<period>[^']*)'").expect("final mark pattern is valid")
});

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("number pattern is valid"));

static PERIOD_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<start>\d{1,2}\s+\p{L}+\s+\d{4}\s*г\.)\s+по\s+(?P<end>\d{1,2}\s+\p{L}+\s+\d{4}\s*г\.)",
    )
    .expect("period range pattern is valid")
});

/// Splits a diary day header `"<dow> (<date>)"` into its two parts.
pub fn split_day_header(title: &str) -> Option<(String, String)> {
    let title = title.trim();
    let title = title.strip_suffix(')').unwrap_or(title);
    let (dow, date) = title.rsplit_once(" (")?;
    Some((dow.trim().to_string(), date.trim().to_string()))
}

/// Class number and section from the role line, e.g. `Учащийся (7 "Б")`.
pub fn parse_class_role(role: &str) -> Result<(u32, String), DerivationError> {
    let caps = ROLE_RE
        .captures(role)
        .ok_or(DerivationError::RolePatternNotFound)?;
    let number = caps["number"]
        .parse()
        .map_err(|_| DerivationError::RolePatternNotFound)?;
    Ok((number, caps["section"].to_string()))
}

/// Class id from the body `onload` handler `loadSubjects('/ajax/subj/<id>', true)`.
pub fn parse_load_subjects(onload: &str) -> Result<i64, DerivationError> {
    let onload = onload.trim();
    if onload.is_empty() {
        return Err(DerivationError::ClassIdMissing);
    }
    let id = onload
        .strip_prefix(LOAD_SUBJECTS_PREFIX)
        .and_then(|rest| rest.strip_suffix(LOAD_SUBJECTS_SUFFIX))
        .unwrap_or(onload);
    id.parse()
        .map_err(|_| DerivationError::ClassIdNotNumeric(id.to_string()))
}

/// Academic year bounds from `"2018-2019 учебный год"`.
pub fn parse_edu_year(label: &str) -> Result<(i32, i32), DerivationError> {
    let malformed = || DerivationError::EduYearMalformed(label.trim().to_string());
    let label = label.trim();
    let years = label.strip_suffix(EDU_YEAR_SUFFIX).unwrap_or(label).trim();
    let (start, end) = years.split_once('-').ok_or_else(malformed)?;
    let start = start.trim().parse().map_err(|_| malformed())?;
    let end = end.trim().parse().map_err(|_| malformed())?;
    Ok((start, end))
}

/// Lesson topic from a row `title`, without the `Тема:` label.
pub fn strip_lesson_topic(title: &str) -> String {
    let title = title.trim();
    title
        .strip_prefix(LESSON_TOPIC_PREFIX)
        .unwrap_or(title)
        .trim()
        .to_string()
}

/// Date details embedded in a grade's `showMarkInfo('<date> (<dow>)', ...)` handler.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkInfo {
    pub date: Option<NaiveDateTime>,
    pub day_of_week: Option<String>,
}

/// Anything that does not match the handler shape yields an unknown date.
pub fn parse_mark_info(onclick: &str) -> MarkInfo {
    let Some(caps) = MARK_INFO_RE.captures(onclick) else {
        log::debug!("onclick without a mark date: {:?}", onclick);
        return MarkInfo::default();
    };
    MarkInfo {
        date: date::parse_opt(&caps["date"]),
        day_of_week: caps.name("dow").map(|m| m.as_str().to_string()),
    }
}

/// Quarter number of a final grade from `showMarkItogInfo('2 четверть', ...)`.
///
/// Only 1..=4 is a quarter; anything else is `None`.
pub fn parse_final_mark_quarter(onclick: &str) -> Option<u8> {
    let caps = FINAL_MARK_RE.captures(onclick)?;
    let number: u8 = NUMBER_RE.find(&caps["period"])?.as_str().parse().ok()?;
    (1..=4).contains(&number).then_some(number)
}

/// Start and end date texts of a `"<start> по <end>"` period header.
pub fn parse_period_range(header: &str) -> Option<(String, String)> {
    let caps = PERIOD_RANGE_RE.captures(header)?;
    Some((caps["start"].to_string(), caps["end"].to_string()))
}

/// Teacher login from a `/messages/new/?to=<login>@<schoolId>` link.
pub fn parse_mailto_contact(href: &str, school_id: i64) -> Option<String> {
    let rest = href.trim().strip_prefix(MAILTO_PREFIX)?;
    let suffix = format!("@{}", school_id);
    let login = rest.strip_suffix(&suffix).unwrap_or(rest);
    (!login.is_empty()).then(|| login.to_string())
}
