use thiserror::Error;

/// Unified error type for git-dch operations
#[derive(Error, Debug)]
pub enum DchError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Version error: {0}")]
    Version(String),

    #[error("Changelog entry error: {0}")]
    Entry(String),

    #[error("Changelog parse error: {0}")]
    Parse(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in git-dch
pub type Result<T> = std::result::Result<T, DchError>;

impl DchError {
    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        DchError::Version(msg.into())
    }

    /// Create a changelog entry error with context
    pub fn entry(msg: impl Into<String>) -> Self {
        DchError::Entry(msg.into())
    }

    /// Create a changelog parse error with context
    pub fn parse(msg: impl Into<String>) -> Self {
        DchError::Parse(msg.into())
    }

    /// Create a repository error with context
    pub fn repository(msg: impl Into<String>) -> Self {
        DchError::Repository(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        DchError::Config(msg.into())
    }
}
