pub mod session;

pub use reqwest::Client;
