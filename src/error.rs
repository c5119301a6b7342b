//! Error types shared by the analysis pipeline and its collaborators.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, CopilotError>;

#[derive(Debug, thiserror::Error)]
pub enum CopilotError {
    /// The API credential was not provided in the environment.
    #[error("missing credential: {0} must be set")]
    MissingCredential(&'static str),

    /// The uploaded file is not valid tabular data.
    #[error("could not parse dataset: {0}")]
    DatasetParse(#[from] csv::Error),

    /// A summed column holds a value that is not a number.
    #[error("column `{column}` row {row}: `{value}` is not a number")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },

    /// The history file exists but does not match the fixed schema.
    #[error("history file {path} is corrupt: {reason}")]
    HistoryCorrupt { path: PathBuf, reason: String },

    #[error("analysis already received its label")]
    AlreadyLabeled,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Non-success answer from the chat completion endpoint.
    #[error("remote service answered {status}")]
    RemoteService { status: u16, payload: String },

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("cannot plot: {0}")]
    Plot(String),
}
