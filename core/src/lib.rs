//! Verb-and-option command-line parsing.
//!
//! This crate maps an argument vector of the shape
//!
//! ```text
//! <program> [-option[=value] ...] <verb> [--verb_option[=value] ...]
//! ```
//!
//! onto registered definitions and dispatches their callbacks:
//!
//! - [`Opt`] — a named flag with an optional value and callback.
//! - [`Verb`] — a subcommand with its own options, an optional
//!   required-option constraint, and a callback.
//! - [`Parser`] — the registry and matching engine. [`Parser::parse`]
//!   resolves the active verb and matched options; [`Parser::run`] fires
//!   callbacks in order (pre-verb options, verb options, verb).
//! - [`render_help`] — the usage text printed when a parse fails.
//! - [`ParserDefinition`] — options and verbs loaded from YAML or JSON.
//!
//! # Example
//!
//! ```
//! use verbopt_core::*;
//!
//! let mut parser = Parser::new();
//! parser.add_option(Opt::new("v", "Show version of program")).unwrap();
//!
//! let mut get = Verb::new("get", "Retrieve information about the node", |verb| {
//!     let target = verb.get_option("test").map(Opt::data).unwrap_or_default();
//!     Ok(!target.is_empty())
//! });
//! get.add_option(Opt::new("test", "Select the test option")).unwrap();
//! parser.add_verb(get).unwrap();
//!
//! assert!(parser.parse(&["/usr/bin/tool", "-v", "get", "--test=node-1"]));
//! assert_eq!(parser.program_name(), "tool");
//! assert_eq!(parser.run().unwrap(), RunOutcome::Completed);
//! ```

mod config;
mod definition;
mod error;
mod help;
mod option;
mod parser;
mod verb;

pub use config::{HelpStream, ParserConfig};
pub use definition::{OptionDefinition, ParserDefinition, VerbDefinition};
pub use error::{CallbackError, CallbackResult, Error, Result};
pub use help::{render_help, usage_line};
pub use option::{NAME_COLUMN_WIDTH, Opt, OptionCallback};
pub use parser::{ParseStatus, Parser, RunOutcome};
pub use verb::{Verb, VerbCallback};
