//! Runtime configuration for a [`Parser`](crate::Parser).

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

/// Stream that receives usage text and required-option diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HelpStream {
    /// Standard output (the default).
    #[default]
    Stdout,
    /// Standard error, for hosts that keep stdout for data.
    Stderr,
}

impl HelpStream {
    /// Opens a writer on the selected stream.
    pub fn writer(self) -> Box<dyn Write> {
        match self {
            HelpStream::Stdout => Box::new(io::stdout()),
            HelpStream::Stderr => Box::new(io::stderr()),
        }
    }
}

/// Parser settings.
///
/// # Examples
///
/// ```
/// use verbopt_core::{HelpStream, ParserConfig};
///
/// let config = ParserConfig::default()
///     .with_debug(true)
///     .with_help_stream(HelpStream::Stderr);
/// assert!(config.debug);
/// assert_eq!(config.help_stream, HelpStream::Stderr);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ParserConfig {
    /// Emit a `tracing` debug event for every token decision.
    #[serde(default)]
    pub debug: bool,
    /// Where [`Parser::parse`](crate::Parser::parse) and
    /// [`Parser::run`](crate::Parser::run) write help output.
    #[serde(default)]
    pub help_stream: HelpStream,
}

impl ParserConfig {
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_help_stream(mut self, help_stream: HelpStream) -> Self {
        self.help_stream = help_stream;
        self
    }
}
