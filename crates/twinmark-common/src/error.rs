//! Error types shared by the twinmark crates.

use std::path::PathBuf;

use miette::Diagnostic;

/// Errors raised while loading or persisting shared configuration.
#[derive(thiserror::Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum Error {
    /// Reading or writing a file failed.
    #[error(transparent)]
    #[diagnostic(code(twinmark::io))]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed.
    #[error(transparent)]
    #[diagnostic(code(twinmark::json))]
    Json(#[from] serde_json::Error),

    /// TOML deserialization failed.
    #[error(transparent)]
    #[diagnostic(code(twinmark::toml))]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization failed.
    #[error(transparent)]
    #[diagnostic(code(twinmark::toml))]
    TomlSer(#[from] toml::ser::Error),

    /// The configuration file extension is not one we know how to read.
    #[error("unsupported configuration format: {}", .0.display())]
    #[diagnostic(
        code(twinmark::config::format),
        help("use a .toml or .json file")
    )]
    UnsupportedFormat(PathBuf),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
