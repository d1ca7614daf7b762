//! Thin selector-based navigation over a parsed page.

use scraper::{ElementRef, Html, Selector};

use crate::error::{Result, ScraperError};

pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|_| ScraperError::InvalidSelector(css.to_string()))
}

/// A parsed HTML document.
pub struct Page {
    document: Html,
}

impl Page {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// All elements matching `css`, in document order.
    pub fn select(&self, css: &str) -> Result<Vec<ElementRef<'_>>> {
        let sel = selector(css)?;
        Ok(self.document.select(&sel).collect())
    }

    pub fn first(&self, css: &str) -> Result<Option<ElementRef<'_>>> {
        let sel = selector(css)?;
        Ok(self.document.select(&sel).next())
    }

    /// Like `first`, but a missing element is an error.
    pub fn require(&self, css: &str) -> Result<ElementRef<'_>> {
        self.first(css)?
            .ok_or_else(|| ScraperError::ElementNotFound(css.to_string()))
    }

    /// Concatenated text of every match; empty when nothing matches.
    pub fn text(&self, css: &str) -> Result<String> {
        Ok(self.select(css)?.into_iter().map(text).collect())
    }

    pub fn attr(&self, css: &str, name: &str) -> Result<Option<String>> {
        Ok(self
            .first(css)?
            .and_then(|el| el.value().attr(name))
            .map(str::to_string))
    }
}

/// Raw text content of an element.
pub fn text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

pub fn trimmed_text(el: ElementRef<'_>) -> String {
    text(el).trim().to_string()
}

pub fn has_class(el: ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

pub fn attr(el: ElementRef<'_>, name: &str) -> Option<String> {
    el.value().attr(name).map(str::to_string)
}

/// First descendant of `el` matching `css`.
pub fn find<'a>(el: ElementRef<'a>, css: &str) -> Result<Option<ElementRef<'a>>> {
    let sel = selector(css)?;
    Ok(el.select(&sel).next())
}

pub fn find_all<'a>(el: ElementRef<'a>, css: &str) -> Result<Vec<ElementRef<'a>>> {
    let sel = selector(css)?;
    Ok(el.select(&sel).collect())
}

/// Text of the first descendant matching `css`, or an empty string.
pub fn find_text(el: ElementRef<'_>, css: &str) -> Result<String> {
    Ok(find(el, css)?.map(text).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTML: &str = r#"
        <div id="box">
            <a class="mail unread" href="/x/">  One </a>
            <a class="mail" href="/y/">Two</a>
        </div>
    "#;

    #[test]
    fn navigates_document() {
        let page = Page::parse(HTML);
        assert_eq!(page.select("#box > a").unwrap().len(), 2);
        assert_eq!(page.text("#box > a").unwrap(), "  One Two");
        assert_eq!(page.attr("a.mail", "href").unwrap().as_deref(), Some("/x/"));
        assert!(page.first("#missing").unwrap().is_none());
        assert!(matches!(
            page.require("#missing"),
            Err(ScraperError::ElementNotFound(_))
        ));
    }

    #[test]
    fn inspects_elements() {
        let page = Page::parse(HTML);
        let links = page.select("#box > a").unwrap();
        assert!(has_class(links[0], "unread"));
        assert!(!has_class(links[1], "unread"));
        assert_eq!(trimmed_text(links[0]), "One");

        let root = page.require("#box").unwrap();
        assert_eq!(find_text(root, "a:nth-child(2)").unwrap(), "Two");
        assert_eq!(find_text(root, "b").unwrap(), "");
    }

    #[test]
    fn bad_selector_is_reported() {
        let page = Page::parse(HTML);
        assert!(matches!(
            page.select("a[["),
            Err(ScraperError::InvalidSelector(_))
        ));
    }
}
