use thiserror::Error;

/// Canonical result for the placement engine.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// An operation that requires a bound unit ran before `bind`.
    #[error("no unit bound: call bind() before {0}")]
    NotBound(&'static str),

    /// `bind` was called on an engine that already owns a unit. One engine
    /// serves exactly one deployable unit for its whole lifetime.
    #[error("engine already bound to unit '{0}': create a new engine per unit")]
    AlreadyBound(String),

    /// Malformed descriptor or unusable configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// I/O failure writing the template or manifest at finalize.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal invariant failed.
    #[error("internal invariant failed: {0}")]
    Invariant(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Invariant(e.to_string())
    }
}
