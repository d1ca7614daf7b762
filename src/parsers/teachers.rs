use crate::error::Result;
use crate::html::{self, Page};
use crate::models::Teacher;
use crate::parsers::script;

pub fn parse_teachers(html: &str, school_id: i64) -> Result<Vec<Teacher>> {
    let page = Page::parse(html);
    let mut teachers = Vec::new();

    for row in page.select("#content > table.list > tbody > tr")? {
        let href = html::find(row, "td.action_links > a.mailto")?
            .and_then(|link| html::attr(link, "href"))
            .unwrap_or_default();
        let user_id = script::parse_mailto_contact(&href, school_id).unwrap_or_default();

        // Course names are bold when the cell also lists class details.
        let mut course_name = html::find_text(row, "td:nth-child(3) > b")?.trim().to_string();
        if course_name.is_empty() {
            course_name = html::find_text(row, "td:nth-child(3)")?.trim().to_string();
        }

        teachers.push(Teacher {
            school_id,
            user_id,
            full_name: html::find_text(row, "td:nth-child(2)")?.trim().to_string(),
            course_id: None,
            course_name,
        });
    }

    Ok(teachers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn teacher_rows() {
        let html = r#"<div id="content"><table class="list"><tbody>
            <tr>
              <td>1</td><td>Петрова Анна Викторовна</td>
              <td><b>Алгебра</b>, 7 "Б"</td>
              <td class="action_links"><a class="mailto" href="/messages/new/?to=petrova@83">Написать</a></td>
            </tr>
            <tr>
              <td>2</td><td> Сидоров Олег </td>
              <td> Физика </td>
              <td class="action_links"></td>
            </tr>
          </tbody></table></div>"#;

        let teachers = parse_teachers(html, 83).unwrap();
        assert_eq!(teachers.len(), 2);
        assert_eq!(teachers[0].user_id, "petrova");
        assert_eq!(teachers[0].full_name, "Петрова Анна Викторовна");
        assert_eq!(teachers[0].course_name, "Алгебра");
        assert_eq!(teachers[1].user_id, "");
        assert_eq!(teachers[1].full_name, "Сидоров Олег");
        assert_eq!(teachers[1].course_name, "Физика");
        assert!(teachers.iter().all(|t| t.school_id == 83));
    }
}
