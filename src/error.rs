use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("issue tracker error: {0}")]
    IssueTracker(String),
    #[error("wiki error: {0}")]
    Wiki(String),
    #[error("forge error: {0}")]
    Forge(String),
    #[error("calendar error: {0}")]
    Calendar(String),
    #[error("time clock error: {0}")]
    TimeClock(String),
    #[error("mail error: {0}")]
    Mail(String),
    #[error("file transfer error: {0}")]
    FileTransfer(String),
    #[error("template error: {0}")]
    Template(String),
    #[error("spreadsheet error: {0}")]
    Spreadsheet(String),
    #[error("document error: {0}")]
    Document(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
