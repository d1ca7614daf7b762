use crate::date;
use crate::error::Result;
use crate::html::{self, Page};
use crate::models::{Message, MessageDetail, MessagesCount};

pub const PAGER: &str = "#content > div.pager";

const DATE_LABEL: &str = "Дата:";

/// Inbox rows of one listing page.
pub fn parse_messages(html: &str, user_id: &str) -> Result<Vec<Message>> {
    let page = Page::parse(html);
    let mut messages = Vec::new();

    for row in page.select("#content > form > table.list > tbody > tr")? {
        let raw_id = html::find(row, "td:nth-child(1) > input")?
            .and_then(|input| html::attr(input, "value"))
            .unwrap_or_default();
        let Ok(id) = raw_id.trim().parse() else {
            log::warn!("Skipping message row with id {:?}", raw_id);
            continue;
        };

        let (subject, is_unread) = match html::find(row, "td:nth-child(2) > a")? {
            Some(link) => (html::trimmed_text(link), html::has_class(link, "unread")),
            None => (String::new(), false),
        };

        messages.push(Message {
            id,
            user_id: user_id.to_string(),
            date: date::parse_opt(&html::find_text(row, "td:nth-child(4)")?),
            from: html::find_text(row, "td:nth-child(3)")?.trim().to_string(),
            is_unread,
            subject,
        });
    }

    Ok(messages)
}

/// A message page: two meta lines (date, sender) and the text block.
pub fn parse_message_detail(html: &str, id: i64) -> Result<MessageDetail> {
    let page = Page::parse(html);
    let props = "#msgview > div.msg-meta > div.msg-props";

    let date_line = page
        .first(&format!("{props} > div:nth-child(1)"))?
        .map(html::trimmed_text)
        .unwrap_or_default();
    let date_text = date_line.strip_prefix(DATE_LABEL).unwrap_or(&date_line);

    let from = page
        .first(&format!("{props} > div:nth-child(2) > a:nth-child(2)"))?
        .map(html::trimmed_text)
        .unwrap_or_default();

    let body = html::text(page.require("#msgview > div.msg-text")?);

    Ok(MessageDetail {
        id,
        date: date::parse_opt(date_text),
        from,
        body: body.trim().to_string(),
    })
}

pub fn parse_messages_count(json: &str) -> Result<MessagesCount> {
    Ok(serde_json::from_str(json)?)
}
