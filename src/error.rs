//! Unified error type.

/// The error type returned by posta's fallible operations.
///
/// Application-level outcomes (404, 201, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// infrastructure failures: binding a port, loading configuration, compiling
/// a route pattern, or a handler that could not finish its work.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid route pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid socket address `{0}`")]
    Addr(String),
}

/// Boxed error produced by a failing handler.
///
/// Anything a handler returns in its `Err` arm is converted into this and
/// logged by the dispatcher before the client gets a bare `500`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
