use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("invalid choice: '{0}'")]
    InvalidChoice(String),

    #[error("invalid sub-choice: '{selector}' is not an item of group {group}")]
    InvalidSubChoice { selector: String, group: u8 },

    #[error("failed to list crontab (exit code {exit_code}): {stderr}")]
    CrontabRead { exit_code: i32, stderr: String },

    #[error("failed to install crontab: {0}")]
    CrontabWrite(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AdminError>;
