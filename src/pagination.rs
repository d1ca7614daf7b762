use serde::{Deserialize, Serialize};

use crate::error::{Result, ScraperError};
use crate::html::{self, Page};

/// Pager shape of a listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub has_pages: bool,
    pub total_pages: u32,
}

impl PageInfo {
    pub const SINGLE: PageInfo = PageInfo {
        has_pages: false,
        total_pages: 1,
    };
}

/// Reads the pager found under `pager` (e.g. `#content > div.pager`).
///
/// The pager lists one `span.page` per page number followed by a "next"
/// control, so the total is the text of the second-to-last node. No
/// `span.page_remark` (or an empty one) means the content fits one page.
pub fn resolve(page: &Page, pager: &str) -> Result<PageInfo> {
    let remark = page.text(&format!("{pager} > span.page_remark"))?;
    if remark.trim().is_empty() {
        return Ok(PageInfo::SINGLE);
    }

    let texts = page_nodes(page, pager)?;

    let total = match texts.len() {
        0 => 1,
        1 => texts[0].parse().unwrap_or(1),
        n => texts[n - 2].parse().map_err(|_| {
            ScraperError::ParsingError(format!("Page count is not a number: {:?}", texts[n - 2]))
        })?,
    };

    Ok(PageInfo {
        has_pages: true,
        total_pages: total,
    })
}

/// Trimmed texts of the pager's `span.page` nodes, "next" control included.
pub fn page_nodes(page: &Page, pager: &str) -> Result<Vec<String>> {
    let nodes = page.select(&format!("{pager} > span.page"))?;
    Ok(nodes.into_iter().map(html::trimmed_text).collect())
}

/// Appends the `page` query parameter the listings understand.
pub fn page_path(path: &str, page: u32) -> String {
    if page <= 1 {
        path.to_string()
    } else if path.contains('?') {
        format!("{path}&page={page}")
    } else {
        format!("{path}?page={page}")
    }
}
