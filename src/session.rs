use reqwest::cookie::Jar;
use std::sync::Arc;
use url::Url;

use crate::config::{validate_page_size, ClientConfig, Credentials};
use crate::error::{Result, ScraperError};
use crate::models::Context;
use crate::parsers;
use crate::transport::{FetchRequest, FetchResponse, Fetcher, HttpFetcher, SessionCookies};

pub const LOGIN_PATH: &str = "/accounts/login/";
/// The homework page doubles as the dashboard the context is read from.
pub const DASHBOARD_PATH: &str = "/homework/";

pub const PAGE_SIZE_COOKIE: &str = "items_perpage";
pub const EDU_YEAR_COOKIE: &str = "edu_year";

/// Authenticated, year-scoped state of one portal account.
///
/// Not meant to be shared: every state change goes through `&mut self`.
pub struct Session {
    credentials: Credentials,
    config: ClientConfig,
    base_url: Url,
    fetcher: Arc<dyn Fetcher>,
    cookies: Arc<dyn SessionCookies>,
    token: Option<String>,
    context: Option<Context>,
}

impl Session {
    /// A session over the default `reqwest` transport.
    pub fn new(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let fetcher = Arc::new(HttpFetcher::new(&config, jar.clone())?);
        Self::with_transport(credentials, config, fetcher, jar)
    }

    /// A session over caller-supplied transport and cookie store.
    pub fn with_transport(
        credentials: Credentials,
        config: ClientConfig,
        fetcher: Arc<dyn Fetcher>,
        cookies: Arc<dyn SessionCookies>,
    ) -> Result<Self> {
        config.validate()?;
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ScraperError::Config(format!("Bad base URL: {}", e)))?;

        let session = Self {
            credentials,
            base_url,
            fetcher,
            cookies,
            token: None,
            context: None,
            config,
        };
        session.cookies.set(
            &session.base_url,
            PAGE_SIZE_COOKIE,
            &session.config.page_size.to_string(),
        );
        Ok(session)
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Anti-forgery token of the last login attempt.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// The derived context, `None` until login succeeds.
    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    pub fn require_context(&self) -> Result<&Context> {
        self.context.as_ref().ok_or(ScraperError::NotAuthenticated)
    }

    pub fn cookie(&self, name: &str) -> Option<String> {
        self.cookies.get(&self.base_url, name)
    }

    /// Absolute portal URL for `path`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    /// Logs in and derives the context.
    ///
    /// Only a failed fetch of the login form or a failed transport on submit
    /// is reported as is; whatever the portal answers to the submit, the
    /// login counts only if the context can be derived afterwards.
    pub async fn authenticate(&mut self) -> Result<&Context> {
        self.context = None;
        let login_url = self.url(LOGIN_PATH);

        let login_page = self.get_html(LOGIN_PATH).await?;
        let token = parsers::context::parse_login_token(&login_page)?;
        self.token = Some(token.clone());

        let username = self.credentials.portal_username();
        let school = self.credentials.school_id.to_string();
        let origin = self.base_url.origin().ascii_serialization();
        let host = self.base_url.host_str().unwrap_or_default().to_string();

        let request = FetchRequest::form(
            login_url.clone(),
            [
                ("next", ""),
                ("csrfmiddlewaretoken", token.as_str()),
                ("username", username.as_str()),
                ("fake_username", self.credentials.login.as_str()),
                ("password", self.credentials.password.as_str()),
                ("school", school.as_str()),
                ("submit", ""),
            ],
        )
        .header("Referer", login_url)
        .header("Host", host)
        .header("Origin", origin);

        let response = self.send(request).await?;
        log::debug!("Login form answered {} ({})", response.status, response.url);

        if let Err(e) = self.derive_context().await {
            log::warn!("Login did not yield a usable context: {}", e);
            return Err(ScraperError::AuthenticationFailed(e.to_string()));
        }
        log::info!("Logged in as {}", self.credentials.portal_username());
        self.require_context()
    }

    /// Re-reads class and academic year from the dashboard.
    ///
    /// The previous context is dropped first, so a failure leaves none.
    pub async fn derive_context(&mut self) -> Result<&Context> {
        self.context = None;
        let html = self.get_html(DASHBOARD_PATH).await?;
        let context = parsers::context::parse_context(&html, self.credentials.school_id)?;
        log::debug!(
            "Context: class {} (id {}), year {}-{}",
            context.class_label(),
            context.class_id,
            context.edu_year_start,
            context.edu_year_end
        );
        Ok(self.context.insert(context))
    }

    /// Installs a portal cookie and re-derives the context it may affect.
    pub async fn set_context_cookie(&mut self, name: &str, value: &str) -> Result<&Context> {
        self.cookies.set(&self.base_url, name, value);
        self.derive_context().await
    }

    /// Switches the academic year; `None` returns to the current one.
    pub async fn switch_edu_year(&mut self, year: Option<u16>) -> Result<&Context> {
        let value = year.map(|y| y.to_string()).unwrap_or_default();
        self.set_context_cookie(EDU_YEAR_COOKIE, &value).await
    }

    pub async fn set_page_size(&mut self, size: u16) -> Result<&Context> {
        validate_page_size(size)?;
        self.config.page_size = size;
        self.set_context_cookie(PAGE_SIZE_COOKIE, &size.to_string()).await
    }

    /// Sends a request after the configured politeness pause.
    pub async fn send(&self, request: FetchRequest) -> Result<FetchResponse> {
        if let Some(pause) = self.config.delay.next_delay() {
            tokio::time::sleep(pause).await;
        }
        log::debug!("{:?} {}", request.method, request.url);
        self.fetcher.fetch(request).await
    }

    /// GETs a portal page, failing on error statuses and login redirects.
    pub async fn get_html(&self, path: &str) -> Result<String> {
        let url = self.url(path);
        let response = self.send(FetchRequest::get(url.clone())).await?;

        if !response.is_success() {
            return Err(ScraperError::HttpStatus {
                url,
                status: response.status,
            });
        }
        if path != LOGIN_PATH && redirected_to_login(&response.url) {
            return Err(ScraperError::SessionExpired);
        }

        Ok(response.body)
    }
}

fn redirected_to_login(final_url: &str) -> bool {
    Url::parse(final_url)
        .map(|u| u.path().starts_with(LOGIN_PATH))
        .unwrap_or(false)
}
