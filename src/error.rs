use thiserror::Error;

/// Failures of the locale date parser.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateParseError {
    #[error("Date text does not look like '<day> <month> <year> г.': {0:?}")]
    Malformed(String),

    #[error("Unknown month name: {0:?}")]
    UnknownMonth(String),

    #[error("Date is out of range: {0:?}")]
    OutOfRange(String),
}

/// Reasons the post-login dashboard could not be turned into a `Context`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DerivationError {
    #[error("Role text does not contain the pupil class pattern")]
    RolePatternNotFound,

    #[error("Dashboard has no subject loader script")]
    ClassIdMissing,

    #[error("Class id is not numeric: {0:?}")]
    ClassIdNotNumeric(String),

    #[error("Academic year label is malformed: {0:?}")]
    EduYearMalformed(String),
}

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("Request to the portal failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Portal answered {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to parse HTML: {0}")]
    ParsingError(String),

    #[error("Invalid selector '{0}'")]
    InvalidSelector(String),

    #[error("Failed to parse date: {0}")]
    Date(#[from] DateParseError),

    #[error("Failed to decode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not derive the session context: {0}")]
    Derivation(#[from] DerivationError),

    #[error("The portal session appears to have expired")]
    SessionExpired,

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Could not find the login CSRF token on the page")]
    TokenNotFound,

    #[error("The session has no derived context, log in first")]
    NotAuthenticated,

    #[error("Could not find required element on the page: {0}")]
    ElementNotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ScraperError {
    /// True for failures of the fetch itself rather than of the page content.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ScraperError::RequestError(_)
                | ScraperError::Transport(_)
                | ScraperError::HttpStatus { .. }
                | ScraperError::SessionExpired
        )
    }
}

pub type Result<T> = std::result::Result<T, ScraperError>;

/// Best-effort outcome of a list that spans several fetches.
///
/// `records` holds everything gathered before `error` stopped the walk.
#[derive(Debug)]
pub struct Partial<T> {
    pub records: Vec<T>,
    pub error: Option<ScraperError>,
}

impl<T> Partial<T> {
    pub fn complete(records: Vec<T>) -> Self {
        Self {
            records,
            error: None,
        }
    }

    pub fn interrupted(records: Vec<T>, error: ScraperError) -> Self {
        Self {
            records,
            error: Some(error),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Drops the gathered records when the walk was interrupted.
    pub fn into_result(self) -> Result<Vec<T>> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.records),
        }
    }
}
