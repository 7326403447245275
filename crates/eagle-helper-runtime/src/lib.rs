//! External collaborators for eagle-helper.
//!
//! This crate wraps the tools the helper shells out to: detection of
//! executables on the search path (`git`) and the best-effort clone/refresh
//! of the shared utils repository into the helper's home directory.

pub mod prereq;
pub mod sync;

pub use prereq::{
    check_optional_tools, command_exists, format_missing, git_available, MissingPrereq,
};
pub use sync::{sync_repo, SyncOutcome, UtilsRepo};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("command '{program}' failed: {detail}")]
    CommandFailed { program: String, detail: String },
}
