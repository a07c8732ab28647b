use thiserror::Error;
use std::io;

#[derive(Error, Debug)]
pub enum FrameworkError {
    #[error("No such test '{0}'")]
    UnknownTest(String),

    #[error("No such test '{0}' in skip list")]
    UnknownSkipTest(String),

    #[error("Test {name} has invalid category flags {bits:#x}")]
    InvalidCategoryFlags { name: String, bits: u32 },

    #[error("Test {0} is already registered")]
    DuplicateTest(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Report error: {0}")]
    ReportError(String),
}

impl FrameworkError {
    /// Returns `true` for errors caused by user test selection rather than
    /// by a defect in a registered module.
    pub fn is_selection_error(&self) -> bool {
        matches!(self, FrameworkError::UnknownTest(_) | FrameworkError::UnknownSkipTest(_))
    }
}

pub type Result<T> = std::result::Result<T, FrameworkError>;
