use scraper::ElementRef;

use crate::date;
use crate::error::Result;
use crate::html::{self, Page};
use crate::models::{Context, Course, ListType, Mark};
use crate::parsers::script;

/// Fields stamped on every mark of a session.
#[derive(Debug, Clone)]
pub struct MarkOwner {
    pub user_id: String,
    pub school_id: i64,
    pub edu_year_start: i32,
    pub edu_year_end: i32,
}

impl MarkOwner {
    pub fn new(user_id: impl Into<String>, context: &Context) -> Self {
        Self {
            user_id: user_id.into(),
            school_id: context.school_id,
            edu_year_start: context.edu_year_start,
            edu_year_end: context.edu_year_end,
        }
    }

    fn blank(&self) -> Mark {
        Mark {
            user_id: self.user_id.clone(),
            school_id: self.school_id,
            edu_year_start: self.edu_year_start,
            edu_year_end: self.edu_year_end,
            ..Mark::default()
        }
    }
}

/// Parses a current-marks page of the given layout.
pub fn parse_marks(html: &str, list_type: ListType, owner: &MarkOwner) -> Result<Vec<Mark>> {
    match list_type {
        ListType::Note => parse_note_marks(html, owner),
        ListType::List => parse_list_marks(html, owner),
        ListType::Date => {
            log::warn!("Marks list type 'date' is not supported, returning no marks");
            Ok(Vec::new())
        }
    }
}

/// Page heading with whitespace runs collapsed, for debug output.
pub fn page_title(html: &str) -> Result<String> {
    let page = Page::parse(html);
    let title = page
        .first("#content > h3")?
        .map(html::text)
        .unwrap_or_default();
    Ok(title.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn grade(el: ElementRef<'_>) -> Option<u8> {
    let text = html::trimmed_text(el);
    match text.parse() {
        Ok(g) => Some(g),
        Err(_) => {
            if !text.is_empty() {
                log::debug!("Skipping non-numeric grade marker {:?}", text);
            }
            None
        }
    }
}

/// Diary layout: weeks of days, one lesson per table row.
pub fn parse_note_marks(html: &str, owner: &MarkOwner) -> Result<Vec<Mark>> {
    let page = Page::parse(html);
    let mut marks = Vec::new();

    for week in page.select("#marks > div.week")? {
        for day in html::find_all(week, "div.dayofweek")? {
            let title = html::find_text(day, "div.weekday > h3")?;
            let (day_of_week, date) = match script::split_day_header(&title) {
                Some((day_of_week, date_text)) => (day_of_week, date::parse_opt(&date_text)),
                None => {
                    log::warn!("Day header without a date, marks stay undated: {:?}", title.trim());
                    (title.trim().to_string(), None)
                }
            };

            for row in html::find_all(day, "table > tbody > tr")? {
                let mut mark = owner.blank();
                mark.day_of_week = day_of_week.clone();
                mark.date = date;
                mark.course_name = html::find_text(row, "td:nth-child(1)")?.trim().to_string();
                mark.subject = script::strip_lesson_topic(
                    &html::attr(row, "title").unwrap_or_default(),
                );
                mark.homework = html::find_text(row, "td:nth-child(2)")?.trim().to_string();
                mark.grades = html::find_all(row, "td.col-mark > span.mark")?
                    .into_iter()
                    .filter_map(grade)
                    .collect();
                marks.push(mark);
            }
        }
    }

    Ok(marks)
}

/// Per-course layout: one mark per grade marker, averages excluded.
pub fn parse_list_marks(html: &str, owner: &MarkOwner) -> Result<Vec<Mark>> {
    let page = Page::parse(html);
    let mut marks = Vec::new();

    for row in page.select("#marks > #mark-row")? {
        let course_name = html::find_text(row, "div.mark-label")?.trim().to_string();

        for marker in html::find_all(row, "span.mark")? {
            if html::has_class(marker, "avg") {
                continue;
            }
            let link = html::find(marker, "a")?;
            let Some(value) = grade(link.unwrap_or(marker)) else {
                continue;
            };
            let info = link
                .and_then(|a| html::attr(a, "onclick"))
                .map(|onclick| script::parse_mark_info(&onclick))
                .unwrap_or_default();

            let mut mark = owner.blank();
            mark.course_name = course_name.clone();
            mark.date = info.date;
            mark.day_of_week = info.day_of_week.unwrap_or_default();
            mark.grades = vec![value];
            marks.push(mark);
        }
    }

    Ok(marks)
}

/// Final (quarter and annual) grades. Course names come from `courses`.
pub fn parse_final_marks(html: &str, owner: &MarkOwner, courses: &[Course]) -> Result<Vec<Mark>> {
    let page = Page::parse(html);
    let mut marks = Vec::new();

    for row in page.select("#marks > #wrap-col > #wrap-marks > div > #mark-row")? {
        let course_id = html::attr(row, "name").and_then(|id| id.trim().parse::<i64>().ok());
        let course_name = course_id
            .and_then(|id| courses.iter().find(|c| c.id == id))
            .map(|c| c.name.clone())
            .unwrap_or_default();
        if course_name.is_empty() {
            log::debug!("No catalog course for final marks row {:?}", course_id);
        }

        for marker in html::find_all(row, ".mark")? {
            let quarterly = html::has_class(marker, "itg-q");
            let annual = html::has_class(marker, "itg-y");
            if !quarterly && !annual {
                continue;
            }

            let link = html::find(marker, "a")?;
            let Some(value) = grade(link.unwrap_or(marker)) else {
                continue;
            };

            let mut mark = owner.blank();
            mark.course_id = course_id;
            mark.course_name = course_name.clone();
            mark.grades = vec![value];

            if quarterly {
                let onclick = link.and_then(|a| html::attr(a, "onclick")).unwrap_or_default();
                let Some(quarter) = script::parse_final_mark_quarter(&onclick) else {
                    log::warn!("Skipping quarter grade without a quarter number: {:?}", onclick);
                    continue;
                };
                mark.quarter = Some(quarter);
            } else {
                mark.annual = true;
            }
            marks.push(mark);
        }
    }

    Ok(marks)
}
