mod source;
mod store;

pub use source::SourceError;
pub use store::{FailureBody, StoreError};
