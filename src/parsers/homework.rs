use crate::date;
use crate::error::Result;
use crate::html::{self, Page};
use crate::models::Homework;

pub const PAGER: &str = "#homework_list > div.pager";

/// Homework table rows: date, weekday, course, assignment, lesson topic.
pub fn parse_homework(html: &str, school_id: i64, class_id: i64) -> Result<Vec<Homework>> {
    let page = Page::parse(html);
    let mut items = Vec::new();

    for row in page.select("#homework_list > table.list > tbody > tr")? {
        let cells = html::find_all(row, "td")?;
        if cells.len() < 5 {
            log::warn!("Skipping homework row with {} cells", cells.len());
            continue;
        }
        let course_name = match html::find(cells[2], "a")? {
            Some(link) => html::trimmed_text(link),
            None => html::trimmed_text(cells[2]),
        };

        items.push(Homework {
            school_id,
            class_id,
            date: date::parse_opt(&html::text(cells[0])),
            day_of_week: html::trimmed_text(cells[1]),
            course_id: None,
            course_name,
            homework: html::trimmed_text(cells[3]),
            subject: html::trimmed_text(cells[4]),
        });
    }

    Ok(items)
}
