pub mod api;
pub mod config;
pub mod error;
pub mod portfolio;
pub mod refresh;
pub mod schema;
pub mod watchlist;

pub use crate::api::{Api, Http};
pub use crate::config::Config;
pub use crate::error::FetchError;
