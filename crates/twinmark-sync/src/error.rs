//! Error types for host-facing operations.

use miette::Diagnostic;
use thiserror::Error;

/// Errors that can occur while moving documents in and out of the session.
#[derive(Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum HostError {
    /// Reading or writing a file failed.
    #[error(transparent)]
    #[diagnostic(code(twinmark::host::io))]
    Io(#[from] std::io::Error),

    /// A dropped or opened file is not a text document.
    #[error("unsupported file: {0}")]
    #[diagnostic(
        code(twinmark::host::unsupported),
        help("only .md, .markdown and .txt files can be opened")
    )]
    UnsupportedFile(String),

    /// File content is not valid UTF-8.
    #[error("{0} is not valid UTF-8 text")]
    #[diagnostic(code(twinmark::host::encoding))]
    NotText(String),

    /// The current document has changes that would be lost.
    #[error("the current document has unsaved changes")]
    #[diagnostic(
        code(twinmark::host::unsaved),
        help("save first, or force the operation")
    )]
    UnsavedChanges,

    /// A pending-file record could not be decoded.
    #[error("malformed pending file record: {0}")]
    #[diagnostic(code(twinmark::host::pending))]
    MalformedPending(#[from] serde_json::Error),

    /// The coordinator task has stopped.
    #[error("sync coordinator is no longer running")]
    #[diagnostic(code(twinmark::host::closed))]
    ChannelClosed,
}

pub type Result<T, E = HostError> = std::result::Result<T, E>;
