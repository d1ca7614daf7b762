// tests/messages_test.rs

mod common;

use common::StubPortal;
use dnevnik_core::{MessagesCount, Result, ScraperError};

fn inbox_page(ids: &[i64], pages: u32) -> String {
    let mut pager = String::new();
    if pages > 1 {
        pager.push_str("<div class=\"pager\"><span class=\"page_remark\">Страницы:</span>");
        for n in 1..=pages {
            pager.push_str(&format!("<span class=\"page\"><a href=\"?page={n}\">{n}</a></span>"));
        }
        pager.push_str("<span class=\"page page_next\"><a href=\"?page=2\">следующая</a></span></div>");
    }

    let rows: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<tr>
                     <td><input type="checkbox" class="message_mark" name="marks" value="{id}"/></td>
                     <td><a href="/messages/input/{id}/" class="{class}">Сообщение {id}</a></td>
                     <td>Петрова А. В.</td>
                     <td>17 декабря 2018 г. 18:09</td>
                   </tr>"#,
                class = if id % 2 == 0 { "unread" } else { "" }
            )
        })
        .collect();

    format!(
        r#"<html><body><div id="content">{pager}
             <form><table class="list"><tbody>{rows}</tbody></table></form>
           </div></body></html>"#
    )
}

#[tokio::test]
async fn test_single_page_inbox() -> Result<()> {
    let portal = StubPortal::new();
    let client = common::logged_in(&portal).await;
    portal.page("/messages/input/", inbox_page(&[10, 11], 1));

    let messages = client.get_messages().await?;
    assert!(messages.is_complete());
    let messages = messages.into_result()?;
    assert_eq!(messages.len(), 2);
    assert!(messages[0].is_unread);
    assert!(!messages[1].is_unread);
    assert_eq!(messages[1].subject, "Сообщение 11");
    assert_eq!(messages[0].user_id, "ivanov");
    assert_eq!(portal.count("/messages/input/?page=2"), 0);
    Ok(())
}

#[tokio::test]
async fn test_inbox_walks_every_page() -> Result<()> {
    let portal = StubPortal::new();
    let client = common::logged_in(&portal).await;
    portal
        .page("/messages/input/", inbox_page(&[1, 2], 3))
        .page("/messages/input/?page=2", inbox_page(&[3, 4], 3))
        .page("/messages/input/?page=3", inbox_page(&[5], 3));

    let messages = client.get_messages().await?.into_result()?;
    let ids: Vec<i64> = messages.iter().map(|m| m.id).collect();
    assert_eq!(ids, [1, 2, 3, 4, 5]);
    Ok(())
}

#[tokio::test]
async fn test_inbox_keeps_pages_before_a_failure() -> Result<()> {
    let portal = StubPortal::new();
    let client = common::logged_in(&portal).await;
    portal
        .page("/messages/input/", inbox_page(&[1, 2], 3))
        .down("/messages/input/?page=2");

    let partial = client.get_messages().await?;
    assert!(!partial.is_complete());
    assert_eq!(partial.records.len(), 2);
    assert!(matches!(partial.error, Some(ScraperError::Transport(_))));
    assert_eq!(portal.count("/messages/input/?page=3"), 0);
    Ok(())
}

#[tokio::test]
async fn test_inbox_first_page_failure_is_an_error() {
    let portal = StubPortal::new();
    let client = common::logged_in(&portal).await;
    portal.status("/messages/input/", 503);

    assert!(matches!(
        client.get_messages().await,
        Err(ScraperError::HttpStatus { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_message_detail_by_id() -> Result<()> {
    let portal = StubPortal::new();
    let client = common::logged_in(&portal).await;
    portal.page(
        "/messages/input/123456/",
        r#"<div id="msgview">
             <div class="msg-meta"><div class="msg-props">
               <div>Дата: 17 декабря 2018 г. 18:09</div>
               <div><span>От:</span><a href="/p/5/">Петрова А. В.</a></div>
             </div></div>
             <div class="msg-text">Завтра занятия отменяются.</div>
           </div>"#,
    );

    let message = client.get_message(123456).await?;
    assert_eq!(message.id, 123456);
    assert_eq!(message.from, "Петрова А. В.");
    assert_eq!(message.body, "Завтра занятия отменяются.");
    assert!(message.date.is_some());
    Ok(())
}

#[tokio::test]
async fn test_messages_count() -> Result<()> {
    let portal = StubPortal::new();
    let client = common::logged_in(&portal).await;
    portal.page(
        "/ajax/messages_count/",
        r#"{"unread_messages": 3, "all_messages": 57}"#,
    );

    assert_eq!(
        client.get_messages_count().await?,
        MessagesCount {
            unread: 3,
            total: 57
        }
    );
    Ok(())
}
