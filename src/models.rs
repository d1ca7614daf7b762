use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::ScraperError;

/// The school/class/academic-year scope the portal currently serves to a session.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    pub school_id: i64,
    pub class_id: i64,
    /// Grade level, e.g. `7` for "7 Б".
    pub class_number: u32,
    /// Section letter, e.g. `"Б"`.
    pub class_char: String,
    pub edu_year_start: i32,
    pub edu_year_end: i32,
}

impl Context {
    /// Human readable class label such as `7 "Б"`.
    pub fn class_label(&self) -> String {
        format!("{} \"{}\"", self.class_number, self.class_char)
    }
}

/// A sub-range of an academic year (quarter, trimester, half-year).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub school_id: i64,
    pub edu_year_start: i32,
    pub edu_year_end: i32,
    /// Display name, e.g. "2 четверть".
    pub name: String,
    /// Opaque selector value used to build marks URLs.
    pub token: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Period {
    /// Half-open check: `start <= at < end`.
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at < self.end
    }

    pub fn is_current(&self) -> bool {
        self.contains(chrono::Local::now().naive_local())
    }

    pub fn is_quarter(&self) -> bool {
        self.name.to_lowercase().contains("четверть")
    }
}

/// One grade cell (or final grade) of a pupil.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Mark {
    pub user_id: String,
    pub school_id: i64,
    pub course_id: Option<i64>,
    pub course_name: String,
    pub subject: String,
    pub homework: String,
    /// Grades in document order; a single lesson may carry several.
    pub grades: Vec<u8>,
    pub day_of_week: String,
    /// `None` when the page did not carry a recognizable date.
    pub date: Option<NaiveDateTime>,
    pub edu_year_start: i32,
    pub edu_year_end: i32,
    pub quarter: Option<u8>,
    pub annual: bool,
}

/// Orders marks chronologically, undated marks last.
pub fn sort_by_date(marks: &mut [Mark]) {
    marks.sort_by_key(|m| (m.date.is_none(), m.date));
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Homework {
    pub school_id: i64,
    pub class_id: i64,
    pub date: Option<NaiveDateTime>,
    pub day_of_week: String,
    pub course_id: Option<i64>,
    pub course_name: String,
    pub homework: String,
    pub subject: String,
}

/// A row of the inbox listing.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub user_id: String,
    pub date: Option<NaiveDateTime>,
    pub from: String,
    pub is_unread: bool,
    pub subject: String,
}

/// A single message as shown on its own page.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageDetail {
    pub id: i64,
    pub date: Option<NaiveDateTime>,
    pub from: String,
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct MessagesCount {
    #[serde(rename = "unread_messages", default)]
    pub unread: u32,
    #[serde(rename = "all_messages", default)]
    pub total: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub school_id: i64,
    /// Portal login of the teacher, taken from the "write a message" link.
    pub user_id: String,
    pub full_name: String,
    pub course_id: Option<i64>,
    pub course_name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct Course {
    pub id: i64,
    pub name: String,
}

/// Removes repeated `(id, name)` pairs, keeping the first occurrence.
pub fn dedup_courses<I>(courses: I) -> Vec<Course>
where
    I: IntoIterator<Item = Course>,
{
    let mut seen = HashSet::new();
    courses
        .into_iter()
        .filter(|c| seen.insert((c.id, c.name.clone())))
        .collect()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Region {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct School {
    pub id: i64,
    pub region_id: i64,
    pub name: String,
    /// Group label the school is listed under, e.g. "Общеобразовательные".
    #[serde(rename = "type")]
    pub kind: String,
}

/// Layout of the current-marks page. The token is a URL path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    /// Pupil diary: weeks, days, lessons.
    Note,
    /// One row of grades per course.
    List,
    /// Grades by date. Not supported yet.
    Date,
}

impl ListType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListType::Note => "note",
            ListType::List => "list",
            ListType::Date => "date",
        }
    }
}

impl fmt::Display for ListType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListType {
    type Err = ScraperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "note" => Ok(ListType::Note),
            "list" => Ok(ListType::List),
            "date" => Ok(ListType::Date),
            other => Err(ScraperError::ParsingError(format!(
                "Unknown marks list type: {}",
                other
            ))),
        }
    }
}

/// Calendar month of an academic year, September first.
///
/// The portal accepts these tokens as the marks range in place of a period token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcademicMonth {
    September,
    October,
    November,
    December,
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
}

impl AcademicMonth {
    pub const ALL: [AcademicMonth; 12] = [
        AcademicMonth::September,
        AcademicMonth::October,
        AcademicMonth::November,
        AcademicMonth::December,
        AcademicMonth::January,
        AcademicMonth::February,
        AcademicMonth::March,
        AcademicMonth::April,
        AcademicMonth::May,
        AcademicMonth::June,
        AcademicMonth::July,
        AcademicMonth::August,
    ];

    /// Calendar month number, 1 = January.
    pub fn month_number(&self) -> u32 {
        match self {
            AcademicMonth::January => 1,
            AcademicMonth::February => 2,
            AcademicMonth::March => 3,
            AcademicMonth::April => 4,
            AcademicMonth::May => 5,
            AcademicMonth::June => 6,
            AcademicMonth::July => 7,
            AcademicMonth::August => 8,
            AcademicMonth::September => 9,
            AcademicMonth::October => 10,
            AcademicMonth::November => 11,
            AcademicMonth::December => 12,
        }
    }

    pub fn from_month_number(month: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.month_number() == month)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AcademicMonth::September => "month9",
            AcademicMonth::October => "month10",
            AcademicMonth::November => "month11",
            AcademicMonth::December => "month12",
            AcademicMonth::January => "month1",
            AcademicMonth::February => "month2",
            AcademicMonth::March => "month3",
            AcademicMonth::April => "month4",
            AcademicMonth::May => "month5",
            AcademicMonth::June => "month6",
            AcademicMonth::July => "month7",
            AcademicMonth::August => "month8",
        }
    }
}

impl AsRef<str> for AcademicMonth {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for AcademicMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AcademicMonth {
    type Err = ScraperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ScraperError::ParsingError(format!("Unknown academic month: {}", s)))
    }
}
