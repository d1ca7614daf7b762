//! The two collaborators a session talks through: a page fetcher and a
//! per-domain cookie store.

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Result, ScraperError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// A POST with an `application/x-www-form-urlencoded` body.
    pub fn form<'a, I>(url: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        Self {
            method: Method::Post,
            url: url.into(),
            headers: vec![(
                "Content-Type".to_string(),
                "application/x-www-form-urlencoded".to_string(),
            )],
            body: Some(body),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    /// Final URL after redirects.
    pub url: String,
    pub body: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues one request and returns the body. Cookies are the fetcher's concern.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse>;
}

/// Cookies keyed by the domain of `url`.
pub trait SessionCookies: Send + Sync {
    fn set(&self, url: &Url, name: &str, value: &str);
    fn get(&self, url: &Url, name: &str) -> Option<String>;
}

impl SessionCookies for Jar {
    fn set(&self, url: &Url, name: &str, value: &str) {
        self.add_cookie_str(&format!("{}={}; Path=/", name, value), url);
    }

    fn get(&self, url: &Url, name: &str) -> Option<String> {
        let header = self.cookies(url)?;
        let header = header.to_str().ok()?;
        header.split(';').find_map(|pair| {
            let (k, v) = pair.trim().split_once('=')?;
            (k == name).then(|| v.to_string())
        })
    }
}

/// Default fetcher: a `reqwest` client sharing the session's cookie jar.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &ClientConfig, jar: Arc<Jar>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| ScraperError::Config(format!("Bad user agent: {}", e)))?;
        headers.insert(USER_AGENT, agent);

        let client = reqwest::Client::builder()
            .cookie_provider(jar)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let body = response.text().await?;

        Ok(FetchResponse { status, url, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_request_is_urlencoded() {
        let req = FetchRequest::form(
            "https://example.test/login/",
            [("username", "ivanov@83"), ("password", "a b&c")],
        )
        .header("Referer", "https://example.test/login/");

        assert_eq!(req.method, Method::Post);
        assert_eq!(
            req.body.as_deref(),
            Some("username=ivanov%4083&password=a+b%26c")
        );
        assert!(req
            .headers
            .iter()
            .any(|(k, v)| k == "Content-Type" && v == "application/x-www-form-urlencoded"));
        assert_eq!(req.headers.len(), 2);
    }

    #[test]
    fn jar_reads_back_cookies_by_name() {
        let jar = Jar::default();
        let url = Url::parse("https://example.test/").unwrap();
        jar.set(&url, "items_perpage", "1000");
        jar.set(&url, "edu_year", "2018");
        jar.set(&url, "edu_year", "2017");

        assert_eq!(jar.get(&url, "items_perpage").as_deref(), Some("1000"));
        assert_eq!(jar.get(&url, "edu_year").as_deref(), Some("2017"));
        assert_eq!(jar.get(&url, "missing"), None);
    }
}
