pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod service;

pub use config::AppConfig;
pub use error::{ClientError, RequestError};
pub use service::{build_request, render, CompareSession, MatcherClient};
