// Declare all our modules
mod catalog;
mod client;
mod config;
pub mod date;
mod error;
pub mod html;
mod models;
pub mod pagination;
pub mod parsers;
mod session;
mod transport;

// Publicly export the parts of our library that users will need
pub use catalog::Catalog;
pub use client::DnevnikClient;
pub use config::{ClientConfig, Credentials, DelayConfig, DEFAULT_PAGE_SIZE, PAGE_SIZES};
pub use error::{DateParseError, DerivationError, Partial, Result, ScraperError};
pub use models::*; // Exposes all structs like Mark, Period, etc.
pub use pagination::PageInfo;
pub use session::{Session, EDU_YEAR_COOKIE, PAGE_SIZE_COOKIE};
pub use transport::{FetchRequest, FetchResponse, Fetcher, HttpFetcher, Method, SessionCookies};
