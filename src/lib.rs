pub mod aggregate;
pub mod config;
pub mod db;
pub mod error;
pub mod relevance;
pub mod server;
pub mod sources;

pub use error::{SourceError, StoreError};
