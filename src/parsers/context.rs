use crate::error::{Result, ScraperError};
use crate::html::Page;
use crate::models::Context;
use crate::parsers::script;

const TOKEN_SELECTOR: &str = ".login__form > input[name='csrfmiddlewaretoken']";
const ROLE_SELECTOR: &str = "#auth_info > #role";
const EDU_YEAR_SELECTOR: &str = "#eduyear > #curedy";

/// Anti-forgery token of the login form.
pub fn parse_login_token(html: &str) -> Result<String> {
    let page = Page::parse(html);
    page.attr(TOKEN_SELECTOR, "value")?
        .filter(|token| !token.is_empty())
        .ok_or(ScraperError::TokenNotFound)
}

/// Builds the session `Context` from the dashboard page.
///
/// All three fragments (role line, subject loader, academic year label) must
/// be present; a partially derived context is never returned.
pub fn parse_context(html: &str, school_id: i64) -> Result<Context> {
    let page = Page::parse(html);

    let role = page.text(ROLE_SELECTOR)?;
    let (class_number, class_char) = script::parse_class_role(&role)?;

    let onload = page.attr("body", "onload")?.unwrap_or_default();
    let class_id = script::parse_load_subjects(&onload)?;

    let edu_year = page.text(EDU_YEAR_SELECTOR)?;
    let (edu_year_start, edu_year_end) = script::parse_edu_year(&edu_year)?;

    Ok(Context {
        school_id,
        class_id,
        class_number,
        class_char,
        edu_year_start,
        edu_year_end,
    })
}
