//! # sanction-workspace
//!
//! Applies the file directives of an approved proposal to a project
//! directory.
//!
//! ## Key components
//!
//! - [`ActionProcessor`] — writes each directive under the conversation's
//!   project root and returns one [`FileActionResult`] per write, carrying on
//!   past individual failures
//! - [`ProjectRoots`] — resolves which directory a conversation's changes land
//!   in; [`FixedProjectRoot`] and [`ProjectRootMap`] cover the common setups
//! - [`ApplyError`] — the batch could not run at all (no usable project root)

pub mod error;
pub mod processor;
pub mod result;
pub mod roots;

pub use error::{ApplyError, WorkspaceError};
pub use processor::ActionProcessor;
pub use result::{ActionOutcome, AggregateResult, FileActionResult};
pub use roots::{FixedProjectRoot, ProjectRootMap, ProjectRoots};
