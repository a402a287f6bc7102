//! Validation-and-integrity pipeline for quiz score submissions.
//!
//! Raw JSON goes through [`SubmissionRecord::from_value`], which enforces the
//! score contract and derives authenticity from the client digest. The
//! [`report`] module turns a record into the markdown block delivered to the
//! notification sink.

pub mod digest;
mod error;
pub mod escape;
pub mod report;
pub mod submission;

pub use digest::Authenticity;
pub use error::ValidationError;
pub use escape::md_escape;
pub use submission::{Edition, LongNamePolicy, Score, SubmissionRecord, ValidatorOptions};
