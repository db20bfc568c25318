// Service exports
pub mod sink;
pub mod source;

pub use sink::{JsonFileWriter, SinkError, SubmissionClient};
pub use source::{SourceClient, SourceEndpoints, SourceError};
