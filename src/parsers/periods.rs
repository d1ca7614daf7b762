use chrono::NaiveDateTime;

use crate::date;
use crate::error::{Result, ScraperError};
use crate::html::{self, Page};
use crate::parsers::script;

/// One entry of the period selector on the current-marks page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodOption {
    pub name: String,
    pub token: String,
}

/// Period options in page-declaration order.
pub fn parse_period_options(html: &str) -> Result<Vec<PeriodOption>> {
    let page = Page::parse(html);
    let mut options = Vec::new();

    for group in page.select("#mark_range > optgroup")? {
        for option in html::find_all(group, "option")? {
            let token = html::attr(option, "value").unwrap_or_default();
            if token.trim().is_empty() {
                continue;
            }
            options.push(PeriodOption {
                name: html::trimmed_text(option),
                token: token.trim().to_string(),
            });
        }
    }

    Ok(options)
}

/// Start and end of a period from the heading of its notes page.
pub fn parse_period_bounds(html: &str) -> Result<(NaiveDateTime, NaiveDateTime)> {
    let page = Page::parse(html);
    let header = page
        .first("#content > h3")?
        .map(html::text)
        .ok_or_else(|| ScraperError::ElementNotFound("#content > h3".to_string()))?;

    let (start, end) = script::parse_period_range(&header).ok_or_else(|| {
        ScraperError::ParsingError(format!(
            "Period heading has no date range: {:?}",
            header.trim()
        ))
    })?;

    let start = date::parse(&start)?;
    let end = date::parse(&end)?;
    if start > end {
        return Err(ScraperError::ParsingError(format!(
            "Period starts after it ends: {} > {}",
            start, end
        )));
    }
    Ok((start, end))
}
