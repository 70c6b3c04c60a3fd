pub mod analytics;
pub mod backup;
pub mod bridge;
pub mod categorize;
pub mod dedupe;
pub mod error;
pub mod model;
pub mod quality;
pub mod store;
pub mod xlsx;

pub use error::{Result, SnippetError};
pub use model::*;
