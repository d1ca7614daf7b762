use crate::error::Result;
use crate::html::{self, Page};
use crate::models::{Course, Region, School};

/// `(id, label)` of every `select > option` with a non-zero numeric value.
fn numbered_options(html: &str) -> Result<Vec<(i64, String)>> {
    let page = Page::parse(html);
    let mut options = Vec::new();
    for option in page.select("select > option")? {
        let id: i64 = html::attr(option, "value")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0);
        if id != 0 {
            options.push((id, html::trimmed_text(option)));
        }
    }
    Ok(options)
}

pub fn parse_regions(html: &str) -> Result<Vec<Region>> {
    Ok(numbered_options(html)?
        .into_iter()
        .map(|(id, name)| Region { id, name })
        .collect())
}

pub fn parse_courses(html: &str) -> Result<Vec<Course>> {
    Ok(numbered_options(html)?
        .into_iter()
        .map(|(id, name)| Course { id, name })
        .collect())
}

/// Schools flattened out of their `optgroup`, each tagged with the group label.
pub fn parse_schools(html: &str, region_id: i64) -> Result<Vec<School>> {
    let page = Page::parse(html);
    let mut schools = Vec::new();

    for group in page.select("select > optgroup")? {
        let kind = html::attr(group, "label").unwrap_or_default();
        for option in html::find_all(group, "option")? {
            let Some(id) = html::attr(option, "value").and_then(|v| v.trim().parse().ok()) else {
                continue;
            };
            schools.push(School {
                id,
                region_id,
                name: html::trimmed_text(option),
                kind: kind.clone(),
            });
        }
    }

    Ok(schools)
}
