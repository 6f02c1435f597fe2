pub mod config;
pub mod error;
pub mod generate;
pub mod kind;
pub mod routes;
pub mod server;
pub mod stats;
pub mod store;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Result<T> = std::result::Result<T, Error>;
