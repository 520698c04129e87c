//! Git repository access for maintenance signals.

pub mod repository;

pub use repository::GitRepository;

/// Name of the version control marker directory.
pub const GIT_DIR: &str = ".git";
