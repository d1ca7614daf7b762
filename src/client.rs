use crate::config::{ClientConfig, Credentials};
use crate::error::{Partial, Result};
use crate::html::Page;
use crate::models::{
    Context, Course, Homework, ListType, Mark, Message, MessageDetail, MessagesCount, Period,
    Teacher,
};
use crate::pagination;
use crate::parsers;
use crate::parsers::marks::MarkOwner;
use crate::session::{Session, DASHBOARD_PATH};

const MARKS_CURRENT_PATH: &str = "/marks/current/";
const MARKS_FINAL_PATH: &str = "/marks/itog/";
const MESSAGES_PATH: &str = "/messages/input/";
const MESSAGES_COUNT_PATH: &str = "/ajax/messages_count/";
const TEACHERS_PATH: &str = "/teachers/";

/// Page extractors on top of an authenticated [`Session`].
///
/// Every call fetches sequentially through the session and returns fresh
/// records; nothing is cached between calls.
pub struct DnevnikClient {
    session: Session,
}

impl DnevnikClient {
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_config(credentials, ClientConfig::default())
    }

    pub fn with_config(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        Ok(Self::from_session(Session::new(credentials, config)?))
    }

    pub fn from_session(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn context(&self) -> Option<&Context> {
        self.session.context()
    }

    /// Logs into the portal and returns the derived context.
    pub async fn login(&mut self) -> Result<Context> {
        self.session.authenticate().await.cloned()
    }

    /// Switches the academic year; `None` returns to the current one.
    pub async fn switch_edu_year(&mut self, year: Option<u16>) -> Result<Context> {
        self.session.switch_edu_year(year).await.cloned()
    }

    fn debug(&self) -> bool {
        self.session.config().debug
    }

    fn owner(&self) -> Result<MarkOwner> {
        let context = self.session.require_context()?;
        Ok(MarkOwner::new(&self.session.credentials().login, context))
    }

    /// Courses of the current class.
    pub async fn get_courses(&self) -> Result<Vec<Course>> {
        let class_id = self.session.require_context()?.class_id;
        let html = self.session.get_html(&format!("/ajax/subj/{}", class_id)).await?;
        parsers::catalog::parse_courses(&html)
    }

    /// Course catalog for joins; a failed fetch yields an empty catalog.
    async fn course_catalog(&self) -> Vec<Course> {
        match self.get_courses().await {
            Ok(courses) => courses,
            Err(e) => {
                log::warn!("Course catalog unavailable, course fields stay empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Academic periods in the order the portal declares them.
    ///
    /// Each period costs one extra fetch; a period whose page cannot be
    /// fetched or read is skipped.
    pub async fn get_periods(&self) -> Result<Vec<Period>> {
        let context = self.session.require_context()?.clone();
        let html = self.session.get_html(MARKS_CURRENT_PATH).await?;
        let options = parsers::periods::parse_period_options(&html)?;

        let mut periods = Vec::with_capacity(options.len());
        for option in options {
            let path = format!("{}{}/note", MARKS_CURRENT_PATH, option.token);
            let bounds = match self.session.get_html(&path).await {
                Ok(page) => parsers::periods::parse_period_bounds(&page),
                Err(e) => Err(e),
            };
            match bounds {
                Ok((start, end)) => periods.push(Period {
                    school_id: context.school_id,
                    edu_year_start: context.edu_year_start,
                    edu_year_end: context.edu_year_end,
                    name: option.name,
                    token: option.token,
                    start,
                    end,
                }),
                Err(e) => log::warn!("Skipping period {:?}: {}", option.name, e),
            }
        }

        Ok(periods)
    }

    /// The quarter running today, if any.
    pub async fn current_quarter(&self) -> Result<Option<Period>> {
        Ok(self
            .get_periods()
            .await?
            .into_iter()
            .find(|p| p.is_quarter() && p.is_current()))
    }

    /// Diary marks of the portal's default range.
    pub async fn get_marks_current(&self) -> Result<Vec<Mark>> {
        self.get_marks_with_type(None, ListType::Note).await
    }

    /// Diary marks of a period token or an `AcademicMonth` token.
    pub async fn get_marks_for(&self, range: &str) -> Result<Vec<Mark>> {
        self.get_marks_with_type(Some(range), ListType::Note).await
    }

    pub async fn get_marks_with_type(
        &self,
        range: Option<&str>,
        list_type: ListType,
    ) -> Result<Vec<Mark>> {
        let owner = self.owner()?;
        if list_type == ListType::Date {
            return parsers::marks::parse_marks("", list_type, &owner);
        }

        let path = match range {
            Some(range) if !range.is_empty() => {
                format!("{}{}/{}/", MARKS_CURRENT_PATH, range, list_type)
            }
            _ => format!("{}{}/", MARKS_CURRENT_PATH, list_type),
        };
        let html = self.session.get_html(&path).await?;
        if self.debug() {
            log::debug!("page title - {}", parsers::marks::page_title(&html)?);
        }
        parsers::marks::parse_marks(&html, list_type, &owner)
    }

    /// Quarter and annual grades, course names joined from the class catalog.
    pub async fn get_marks_final(&self) -> Result<Vec<Mark>> {
        let owner = self.owner()?;
        let html = self.session.get_html(MARKS_FINAL_PATH).await?;
        let courses = self.course_catalog().await;
        parsers::marks::parse_final_marks(&html, &owner, &courses)
    }

    pub async fn get_homework(&self) -> Result<Partial<Homework>> {
        let context = self.session.require_context()?.clone();
        let mut homework = self
            .collect_pages(DASHBOARD_PATH, parsers::homework::PAGER, |html| {
                parsers::homework::parse_homework(html, context.school_id, context.class_id)
            })
            .await?;

        let courses = self.course_catalog().await;
        for item in &mut homework.records {
            item.course_id = course_id_by_name(&courses, &item.course_name);
        }
        Ok(homework)
    }

    /// Inbox listing across all of its pages.
    pub async fn get_messages(&self) -> Result<Partial<Message>> {
        let user_id = self.session.credentials().login.clone();
        self.collect_pages(MESSAGES_PATH, parsers::messages::PAGER, |html| {
            parsers::messages::parse_messages(html, &user_id)
        })
        .await
    }

    pub async fn get_message(&self, id: i64) -> Result<MessageDetail> {
        let html = self
            .session
            .get_html(&format!("{}{}/", MESSAGES_PATH, id))
            .await?;
        parsers::messages::parse_message_detail(&html, id)
    }

    pub async fn get_messages_count(&self) -> Result<MessagesCount> {
        let json = self.session.get_html(MESSAGES_COUNT_PATH).await?;
        parsers::messages::parse_messages_count(&json)
    }

    pub async fn get_teachers(&self) -> Result<Vec<Teacher>> {
        let school_id = self.session.credentials().school_id;
        let html = self.session.get_html(TEACHERS_PATH).await?;
        let mut teachers = parsers::teachers::parse_teachers(&html, school_id)?;

        if self.session.context().is_some() {
            let courses = self.course_catalog().await;
            for teacher in &mut teachers {
                teacher.course_id = course_id_by_name(&courses, &teacher.course_name);
            }
        }
        Ok(teachers)
    }

    /// Walks a paginated listing. The first page failing is an error; a
    /// later one ends the walk with what was gathered so far.
    async fn collect_pages<T, F>(&self, path: &str, pager: &str, parse: F) -> Result<Partial<T>>
    where
        F: Fn(&str) -> Result<Vec<T>>,
    {
        let first = self.session.get_html(path).await?;
        let mut records = parse(&first)?;

        let info = {
            let page = Page::parse(&first);
            if self.debug() {
                log::debug!("pager nodes: {:?}", pagination::page_nodes(&page, pager));
            }
            match pagination::resolve(&page, pager) {
                Ok(info) => info,
                Err(e) => return Ok(Partial::interrupted(records, e)),
            }
        };
        if self.debug() {
            log::debug!("{} spans {} page(s)", path, info.total_pages);
        }

        for n in 2..=info.total_pages {
            let page = self
                .session
                .get_html(&pagination::page_path(path, n))
                .await
                .and_then(|html| parse(&html));
            match page {
                Ok(mut more) => records.append(&mut more),
                Err(e) => {
                    log::warn!("Stopped {} at page {} of {}: {}", path, n, info.total_pages, e);
                    return Ok(Partial::interrupted(records, e));
                }
            }
        }

        Ok(Partial::complete(records))
    }
}

fn course_id_by_name(courses: &[Course], name: &str) -> Option<i64> {
    courses.iter().find(|c| c.name == name).map(|c| c.id)
}
