// tests/common/mod.rs

#![allow(dead_code)]

use async_trait::async_trait;
use dnevnik_core::{
    ClientConfig, Credentials, DelayConfig, DnevnikClient, FetchRequest, FetchResponse, Fetcher,
    Result, ScraperError, Session,
};
use reqwest::cookie::Jar;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

pub const BASE: &str = "https://stub.dnevnik.test";
pub const SCHOOL_ID: i64 = 83;

#[derive(Clone)]
enum Reply {
    Page { status: u16, final_path: String, body: String },
    Down,
}

/// In-memory portal: canned replies per path, every request recorded.
///
/// A path with several queued replies serves them in order and then keeps
/// repeating the last one.
#[derive(Default)]
pub struct StubPortal {
    routes: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl StubPortal {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, path: &str, reply: Reply) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    pub fn page(&self, path: &str, body: impl Into<String>) -> &Self {
        self.push(
            path,
            Reply::Page {
                status: 200,
                final_path: path.to_string(),
                body: body.into(),
            },
        )
    }

    pub fn status(&self, path: &str, status: u16) -> &Self {
        self.push(
            path,
            Reply::Page {
                status,
                final_path: path.to_string(),
                body: String::new(),
            },
        )
    }

    /// Answers as if the portal bounced the request to the login form.
    pub fn redirect_to_login(&self, path: &str) -> &Self {
        self.push(
            path,
            Reply::Page {
                status: 200,
                final_path: format!("/accounts/login/?next={}", path),
                body: login_page("fresh"),
            },
        )
    }

    pub fn down(&self, path: &str) -> &Self {
        self.push(path, Reply::Down)
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Paths requested so far, in order.
    pub fn paths(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r.url.trim_start_matches(BASE).to_string())
            .collect()
    }

    pub fn count(&self, path: &str) -> usize {
        self.paths().iter().filter(|p| *p == path).count()
    }
}

#[async_trait]
impl Fetcher for StubPortal {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let path = request.url.trim_start_matches(BASE).to_string();

        let reply = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(&path) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match reply {
            Some(Reply::Page {
                status,
                final_path,
                body,
            }) => Ok(FetchResponse {
                status,
                url: format!("{}{}", BASE, final_path),
                body,
            }),
            Some(Reply::Down) => Err(ScraperError::Transport(format!(
                "connection refused: {}",
                path
            ))),
            None => Ok(FetchResponse {
                status: 404,
                url: request.url.clone(),
                body: String::new(),
            }),
        }
    }
}

pub fn config() -> ClientConfig {
    ClientConfig {
        base_url: BASE.to_string(),
        delay: DelayConfig::disabled(),
        ..ClientConfig::default()
    }
}

pub fn credentials() -> Credentials {
    Credentials::new("ivanov", "secret", SCHOOL_ID)
}

pub fn session(portal: &Arc<StubPortal>) -> Session {
    session_with(portal, config())
}

pub fn session_with(portal: &Arc<StubPortal>, config: ClientConfig) -> Session {
    Session::with_transport(credentials(), config, portal.clone(), Arc::new(Jar::default()))
        .expect("stub session")
}

pub fn client(portal: &Arc<StubPortal>) -> DnevnikClient {
    DnevnikClient::from_session(session(portal))
}

/// A client that has already logged in against the standard fixtures.
pub async fn logged_in(portal: &Arc<StubPortal>) -> DnevnikClient {
    serve_login(portal);
    let mut client = client(portal);
    client.login().await.expect("stub login");
    client
}

pub fn serve_login(portal: &StubPortal) {
    portal
        .page("/accounts/login/", login_page("tok-123"))
        .page("/homework/", dashboard(7, "Б", "4821", 2018));
}

pub fn login_page(token: &str) -> String {
    format!(
        r#"<html><body><form class="login__form" method="post" action="/accounts/login/">
             <input type="hidden" name="csrfmiddlewaretoken" value="{token}">
             <input type="text" name="fake_username"><input type="password" name="password">
           </form></body></html>"#
    )
}

pub fn dashboard(class_number: u32, section: &str, class_id: &str, year: i32) -> String {
    dashboard_with_rows(class_number, section, class_id, year, "")
}

pub fn dashboard_with_rows(
    class_number: u32,
    section: &str,
    class_id: &str,
    year: i32,
    rows: &str,
) -> String {
    format!(
        r#"<html><body onload="loadSubjects('/ajax/subj/{class_id}', true)">
  <div id="auth_info">
    <span id="name">Иванов Иван</span>
    <span id="role">
      Учащийся
      ({class_number} "{section}")
    </span>
  </div>
  <div id="eduyear"><span id="curedy">{year}-{next} учебный год</span></div>
  <div id="homework_list">
    <table class="list"><tbody>{rows}</tbody></table>
  </div>
</body></html>"#,
        next = year + 1
    )
}

pub fn courses_page() -> String {
    r#"<select name="subject">
         <option value="0">Все предметы</option>
         <option value="12">Алгебра</option>
         <option value="15">Физика</option>
       </select>"#
        .to_string()
}
