use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading events and compiling them into artifacts.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Reading or writing an artifact failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The events source parsed, but is not a JSON array
    #[error("Events file must contain a JSON array: {}", .path.display())]
    EventsNotArray { path: PathBuf },

    /// JSON parsing failed (events file, flow file)
    #[error("JSON parse error ({context}): {source}")]
    JsonParse {
        context: String,
        source: serde_json::Error,
    },

    /// JSON serialization failed (flow, template, embedded steps)
    #[error("JSON serialize error ({context}): {source}")]
    JsonSerialize {
        context: String,
        source: serde_json::Error,
    },

    /// A non-empty URL on the first event could not be parsed
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    /// The optional rewrite collaborator failed
    #[error("Script rewrite failed: {0}")]
    Rewrite(#[from] RewriteError),
}

impl CompileError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CompileError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failures of the optional script-rewrite service.
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rewrite request failed: {status} {body}")]
    Status { status: u16, body: String },

    #[error("rewrite response missing content")]
    MissingContent,

    #[error("could not encode flow for prompt: {0}")]
    Prompt(#[from] serde_json::Error),
}

/// Text that is not part of the locator expression grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized locator expression: {0}")]
pub struct LocatorParseError(pub String);
