//! Error taxonomy for the command generation pipeline.
//!
//! Every failure the pipeline can surface is one of these variants. The
//! orchestrator catches them at its boundary and converts them into a
//! terminal `Failed` state; nothing here is retried automatically.

use thiserror::Error;

/// Errors produced by the generation and execution pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// The prompt builder was given an empty instruction or no files.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A submit was attempted without the required credential/selection,
    /// or while a previous request was still in flight.
    #[error("{0}")]
    Precondition(String),

    /// The generation backend rejected the credential.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The generation backend could not be reached or answered abnormally.
    #[error("generation request failed: {0}")]
    Transport(String),

    /// The generation backend answered, but with no usable text.
    #[error("the generation backend returned no usable command text")]
    EmptyResponse,

    /// No recognizable executable token was found in the generated text.
    #[error("no ffmpeg command found in generated text: {0}")]
    MalformedCommand(String),

    /// The process execution collaborator reported a failure.
    #[error("command execution failed: {0}")]
    Execution(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
