//! Error types for registration, dispatch, and definition loading.
//!
//! Parse failures are not errors: [`Parser::parse`](crate::Parser::parse)
//! reports them through its boolean return and the rendered usage text.
//! Everything else that can go wrong surfaces as an [`Error`].

use thiserror::Error;

/// Error returned by an option or verb callback.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Result type returned by option and verb callbacks.
///
/// `Ok(bool)` carries the "handled" flag; the dispatcher ignores it apart
/// from logging, so returning `Ok(true)` is the usual success value.
pub type CallbackResult = std::result::Result<bool, CallbackError>;

/// Errors that can occur while registering, running, or loading a parser.
#[derive(Debug, Error)]
pub enum Error {
    /// An option or verb was registered with an empty or whitespace-only name.
    #[error("option and verb names cannot be empty")]
    EmptyName,

    /// Two pre-verb options share a name.
    #[error("duplicate option: -{0}")]
    DuplicateOption(String),

    /// Two sub-options of the same verb share a name.
    #[error("duplicate option for verb '{verb}': --{option}")]
    DuplicateSubOption {
        /// Verb the option was being added to.
        verb: String,
        /// Name of the rejected option.
        option: String,
    },

    /// Two verbs share a name.
    #[error("duplicate verb: {0}")]
    DuplicateVerb(String),

    /// [`Parser::run`](crate::Parser::run) was called without a successful
    /// preceding parse.
    #[error("run requires a successful parse")]
    NotParsed,

    /// A callback reported an error; the run was aborted.
    #[error("callback for '{name}' failed: {source}")]
    Callback {
        /// Name of the option or verb whose callback failed.
        name: String,
        /// Error returned by the callback.
        #[source]
        source: CallbackError,
    },

    /// File I/O failure while loading a definition or writing help text.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON definition parsing failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML definition parsing failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Definition file extension is neither JSON nor YAML.
    #[error("unsupported definition format: {0}")]
    UnsupportedDefinitionFormat(String),
}

/// Convenience alias for results with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
