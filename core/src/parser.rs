//! The option/verb registry and matching engine.
//!
//! A [`Parser`] walks the argument vector once. Until a verb is found, a
//! token starting with `-` is looked up among the pre-verb options and any
//! other token among the verbs. Once a verb is active, every remaining token
//! has its first two characters (conventionally `--`) stripped and is looked
//! up among that verb's options. Tokens may carry a value as `name=value`.
//!
//! Parsing succeeds only when every token after the program name matched
//! something. On failure the usage text is written to the help stream.
//!
//! [`Parser::run`] then fires callbacks in a fixed order: matched pre-verb
//! options, matched verb options, then the verb itself. The first callback
//! error aborts the run.

use std::collections::HashMap;
use std::ffi::OsString;
use std::io::Write;
use std::path::Path;

use tracing::{debug, warn};

use crate::config::ParserConfig;
use crate::error::{CallbackResult, Error, Result};
use crate::help::render_help;
use crate::option::Opt;
use crate::verb::Verb;

/// Status of the most recent [`Parser::parse`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseStatus {
    /// No parse has been attempted, or state was reset.
    #[default]
    NotParsed,
    /// The last parse left at least one token unhandled.
    Failed,
    /// Every token of the last parse was handled.
    Parsed,
}

/// How a [`Parser::run`] finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every matched callback, including the verb's, ran successfully.
    Completed,
    /// Only pre-verb options were given; their callbacks ran.
    NoVerb,
    /// The active verb requires an option and none was matched. The verb's
    /// description was written to the help stream and its callback skipped.
    MissingRequiredOption {
        /// Name of the verb that was skipped.
        verb: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenMatch {
    PreVerbOption(usize),
    Verb(usize),
    VerbOption(usize),
    Unhandled,
}

/// One matched option token: the registry index and the value it carried.
#[derive(Debug, Clone, PartialEq, Eq)]
struct MatchedToken {
    index: usize,
    value: Option<String>,
}

/// Registry of pre-verb options and verbs, plus the state of the last parse.
///
/// # Examples
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// use verbopt_core::{Opt, Parser, RunOutcome, Verb};
///
/// let seen = Rc::new(RefCell::new(String::new()));
/// let sink = Rc::clone(&seen);
///
/// let mut parser = Parser::new();
/// parser.add_option(Opt::new("v", "Show version of program")).unwrap();
/// parser
///     .add_verb(
///         Verb::new("drink", "consume a liquid", move |v| {
///             let flavor = v.get_option("flavor").ok_or("flavor not registered")?;
///             sink.borrow_mut().push_str(flavor.data());
///             Ok(true)
///         })
///         .with_option(Opt::new("flavor", "one word delight"))
///         .unwrap(),
///     )
///     .unwrap();
///
/// assert!(parser.parse(&["test", "drink", "--flavor=red"]));
/// assert_eq!(parser.run().unwrap(), RunOutcome::Completed);
/// assert_eq!(*seen.borrow(), "red");
/// ```
#[derive(Debug, Default)]
pub struct Parser {
    default_program_name: String,
    program_name: String,
    options: Vec<Opt>,
    option_index: HashMap<String, usize>,
    verbs: Vec<Verb>,
    verb_index: HashMap<String, usize>,
    config: ParserConfig,
    active_verb: Option<usize>,
    matched_options: Vec<MatchedToken>,
    matched_verb_options: Vec<MatchedToken>,
    status: ParseStatus,
}

impl Parser {
    /// Creates an empty parser. The program name is taken from the first
    /// argument of each parse.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty parser with a program name used in help text until
    /// a parse replaces it. Only the final path segment of `name` is kept.
    ///
    /// A parse given an empty argument vector restores this name.
    pub fn with_program_name(name: &str) -> Self {
        let name = program_base_name(name);
        Self {
            default_program_name: name.clone(),
            program_name: name,
            ..Self::default()
        }
    }

    /// Replaces the parser configuration.
    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ParserConfig) {
        self.config = config;
    }

    pub fn program_name(&self) -> &str {
        &self.program_name
    }

    /// Registers a pre-verb option.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyName`] for a blank name and
    /// [`Error::DuplicateOption`] if the name is already registered.
    pub fn add_option(&mut self, option: Opt) -> Result<()> {
        if option.text().trim().is_empty() {
            return Err(Error::EmptyName);
        }
        if self.option_index.contains_key(option.text()) {
            return Err(Error::DuplicateOption(option.text().to_string()));
        }
        self.option_index
            .insert(option.text().to_string(), self.options.len());
        self.options.push(option);
        Ok(())
    }

    /// Registers a verb.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyName`] for a blank name and
    /// [`Error::DuplicateVerb`] if the name is already registered.
    pub fn add_verb(&mut self, verb: Verb) -> Result<()> {
        if verb.name().trim().is_empty() {
            return Err(Error::EmptyName);
        }
        if self.verb_index.contains_key(verb.name()) {
            return Err(Error::DuplicateVerb(verb.name().to_string()));
        }
        self.verb_index
            .insert(verb.name().to_string(), self.verbs.len());
        self.verbs.push(verb);
        Ok(())
    }

    /// Registered pre-verb options in registration order.
    pub fn options(&self) -> impl Iterator<Item = &Opt> {
        self.options.iter()
    }

    /// Registered verbs in registration order.
    pub fn verbs(&self) -> impl Iterator<Item = &Verb> {
        self.verbs.iter()
    }

    pub fn get_option(&self, name: &str) -> Option<&Opt> {
        self.option_index.get(name).map(|&i| &self.options[i])
    }

    pub fn get_verb(&self, name: &str) -> Option<&Verb> {
        self.verb_index.get(name).map(|&i| &self.verbs[i])
    }

    pub fn parse_status(&self) -> ParseStatus {
        self.status
    }

    /// Verb selected by the last parse, if any.
    pub fn active_verb(&self) -> Option<&Verb> {
        self.active_verb.map(|i| &self.verbs[i])
    }

    /// Pre-verb options matched by the last parse, in match order.
    /// An option given twice appears twice.
    pub fn matched_options(&self) -> impl Iterator<Item = &Opt> {
        self.matched_option_values().map(|(option, _)| option)
    }

    /// Like [`matched_options`](Parser::matched_options), paired with the
    /// value each token carried. An option's own data only holds the last one.
    pub fn matched_option_values(&self) -> impl Iterator<Item = (&Opt, Option<&str>)> {
        self.matched_options
            .iter()
            .map(|m| (&self.options[m.index], m.value.as_deref()))
    }

    /// Options of the active verb matched by the last parse, in match order.
    pub fn matched_verb_options(&self) -> impl Iterator<Item = &Opt> {
        self.matched_verb_option_values().map(|(option, _)| option)
    }

    /// Like [`matched_verb_options`](Parser::matched_verb_options), paired
    /// with the value each token carried.
    pub fn matched_verb_option_values(&self) -> impl Iterator<Item = (&Opt, Option<&str>)> {
        let verb = self.active_verb.map(|i| &self.verbs[i]);
        self.matched_verb_options
            .iter()
            .filter_map(move |m| verb.map(|v| (v.option_at(m.index), m.value.as_deref())))
    }

    /// Parses `args`, writing usage text to the configured help stream on
    /// failure.
    ///
    /// `args[0]` is the program path; its final segment becomes the program
    /// name. Returns `true` when every remaining token was handled.
    pub fn parse<S: AsRef<str>>(&mut self, args: &[S]) -> bool {
        let mut out = self.config.help_stream.writer();
        match self.parse_to(args, &mut out) {
            Ok(handled) => handled,
            Err(e) => {
                warn!(error = %e, "Failed to write usage text");
                false
            }
        }
    }

    /// Parses the process arguments. Arguments that are not valid Unicode
    /// are converted lossily.
    pub fn parse_env(&mut self) -> bool {
        let args = lossy_args(std::env::args_os());
        self.parse(args.as_slice())
    }

    /// Parses `args`, writing usage text to `out` on failure.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] only if writing the usage text fails.
    pub fn parse_to<S: AsRef<str>>(&mut self, args: &[S], out: &mut impl Write) -> Result<bool> {
        let handled = self.match_args(args);
        self.status = if handled {
            ParseStatus::Parsed
        } else {
            ParseStatus::Failed
        };
        if !handled {
            out.write_all(render_help(self).as_bytes())?;
            out.flush()?;
        }
        Ok(handled)
    }

    /// Fires the callbacks matched by the last parse, writing required-option
    /// diagnostics to the configured help stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotParsed`] unless the last parse succeeded, and
    /// [`Error::Callback`] for the first callback that fails. Callbacks after
    /// the failing one do not run.
    pub fn run(&self) -> Result<RunOutcome> {
        let mut out = self.config.help_stream.writer();
        self.run_to(&mut out)
    }

    /// Like [`run`](Parser::run), writing diagnostics to `out`.
    pub fn run_to(&self, out: &mut impl Write) -> Result<RunOutcome> {
        if self.status != ParseStatus::Parsed {
            return Err(Error::NotParsed);
        }

        for matched in &self.matched_options {
            let option = &self.options[matched.index];
            self.dispatch(option.text(), option.on_match())?;
        }

        let Some(verb_index) = self.active_verb else {
            return Ok(RunOutcome::NoVerb);
        };
        let verb = &self.verbs[verb_index];

        for matched in &self.matched_verb_options {
            let option = verb.option_at(matched.index);
            self.dispatch(option.text(), option.on_match())?;
        }

        if verb.is_option_required() && self.matched_verb_options.is_empty() {
            if self.config.debug {
                debug!(verb = verb.name(), "Verb requires an option, skipping callback");
            }
            writeln!(out, "{verb}")?;
            out.flush()?;
            return Ok(RunOutcome::MissingRequiredOption {
                verb: verb.name().to_string(),
            });
        }

        self.dispatch(verb.name(), verb.on_match())?;
        Ok(RunOutcome::Completed)
    }

    fn dispatch(&self, name: &str, result: CallbackResult) -> Result<bool> {
        match result {
            Ok(handled) => {
                if self.config.debug {
                    debug!(name, handled, "Callback finished");
                }
                Ok(handled)
            }
            Err(source) => Err(Error::Callback {
                name: name.to_string(),
                source,
            }),
        }
    }

    fn reset(&mut self) {
        self.active_verb = None;
        self.matched_options.clear();
        self.matched_verb_options.clear();
        self.status = ParseStatus::NotParsed;
        for option in &mut self.options {
            option.clear_data();
        }
        for verb in &mut self.verbs {
            verb.clear_option_data();
        }
    }

    fn match_args<S: AsRef<str>>(&mut self, args: &[S]) -> bool {
        self.reset();

        let Some((program, tokens)) = args.split_first() else {
            self.program_name.clone_from(&self.default_program_name);
            return false;
        };
        self.program_name = program_base_name(program.as_ref());
        if tokens.is_empty() {
            return false;
        }

        let mut handled = 0;
        for token in tokens {
            let token = token.as_ref();
            let matched = self.match_token(token);
            if self.config.debug {
                debug!(token, matched = ?matched, "Matched token");
            }
            if matched != TokenMatch::Unhandled {
                handled += 1;
            }
        }

        handled == tokens.len()
    }

    fn match_token(&mut self, token: &str) -> TokenMatch {
        match self.active_verb {
            None if token.len() > 1 && token.starts_with('-') => {
                let (name, value) = split_assignment(&token[1..]);
                let Some(&i) = self.option_index.get(name) else {
                    return TokenMatch::Unhandled;
                };
                if let Some(value) = value {
                    self.options[i].set_data(value);
                }
                self.matched_options.push(MatchedToken {
                    index: i,
                    value: value.map(str::to_string),
                });
                TokenMatch::PreVerbOption(i)
            }
            None => match self.verb_index.get(token) {
                Some(&i) => {
                    self.active_verb = Some(i);
                    TokenMatch::Verb(i)
                }
                None => TokenMatch::Unhandled,
            },
            Some(verb_index) => {
                let Some(rest) = strip_prefix_chars(token, 2) else {
                    return TokenMatch::Unhandled;
                };
                let (name, value) = split_assignment(rest);
                let verb = &mut self.verbs[verb_index];
                let Some(i) = verb.option_index(name) else {
                    return TokenMatch::Unhandled;
                };
                if let Some(value) = value {
                    verb.option_at_mut(i).set_data(value);
                }
                self.matched_verb_options.push(MatchedToken {
                    index: i,
                    value: value.map(str::to_string),
                });
                TokenMatch::VerbOption(i)
            }
        }
    }
}

/// Converts OS arguments to strings, replacing invalid Unicode with U+FFFD.
fn lossy_args(args: impl IntoIterator<Item = OsString>) -> Vec<String> {
    args.into_iter()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect()
}

/// Final path segment of `path`, or `path` itself when it has none.
fn program_base_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Splits `name=value` on the first `=`.
fn split_assignment(token: &str) -> (&str, Option<&str>) {
    match token.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (token, None),
    }
}

/// Drops the first `count` characters, or `None` if the token is not longer.
fn strip_prefix_chars(token: &str, count: usize) -> Option<&str> {
    token.char_indices().nth(count).map(|(i, _)| &token[i..])
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    type Log = Rc<RefCell<Vec<String>>>;

    fn recording_option(name: &str, log: &Log) -> Opt {
        let log = Rc::clone(log);
        Opt::with_callback(name, "records itself", move |o| {
            log.borrow_mut().push(format!("{}={}", o.text(), o.data()));
            Ok(true)
        })
    }

    fn recording_verb(name: &str, log: &Log) -> Verb {
        let log = Rc::clone(log);
        Verb::new(name, "records itself", move |v| {
            log.borrow_mut().push(format!("verb:{}", v.name()));
            Ok(true)
        })
    }

    fn parse_quiet(parser: &mut Parser, args: &[&str]) -> (bool, String) {
        let mut out = Vec::new();
        let handled = parser.parse_to(args, &mut out).unwrap();
        (handled, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_split_assignment() {
        assert_eq!(split_assignment("x=42"), ("x", Some("42")));
        assert_eq!(split_assignment("x"), ("x", None));
        assert_eq!(split_assignment("x="), ("x", Some("")));
        assert_eq!(split_assignment("url=a=b"), ("url", Some("a=b")));
    }

    #[test]
    fn test_strip_prefix_chars() {
        assert_eq!(strip_prefix_chars("--n=5", 2), Some("n=5"));
        assert_eq!(strip_prefix_chars("--", 2), None);
        assert_eq!(strip_prefix_chars("-", 2), None);
        assert_eq!(strip_prefix_chars("één", 2), Some("n"));
    }

    #[test]
    fn test_program_base_name() {
        assert_eq!(program_base_name("/usr/local/bin/tool"), "tool");
        assert_eq!(program_base_name("tool"), "tool");
        assert_eq!(program_base_name("./bin/tool.exe"), "tool.exe");
    }

    #[test]
    fn test_lossy_args_keeps_valid_arguments() {
        let args = lossy_args(["prog", "-x=1"].map(OsString::from));
        assert_eq!(args, vec!["prog", "-x=1"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_lossy_args_replaces_invalid_unicode() {
        use std::os::unix::ffi::OsStringExt;

        let args = lossy_args([
            OsString::from("prog"),
            OsString::from_vec(b"-x=\xFF".to_vec()),
        ]);
        assert_eq!(args, vec!["prog", "-x=\u{FFFD}"]);

        let mut parser = Parser::new();
        parser.add_option(Opt::new("x", "a value")).unwrap();
        assert!(parser.parse_to(args.as_slice(), &mut Vec::new()).unwrap());
        assert_eq!(parser.get_option("x").unwrap().data(), "\u{FFFD}");
    }

    #[test]
    fn test_with_program_name_keeps_base_name() {
        let parser = Parser::with_program_name("/usr/bin/tool");
        assert_eq!(parser.program_name(), "tool");
    }

    #[test]
    fn test_empty_args_restore_constructor_program_name() {
        let mut parser = Parser::with_program_name("prog");
        parser.add_option(Opt::new("x", "a number")).unwrap();

        let (handled, _) = parse_quiet(&mut parser, &["other", "-x"]);
        assert!(handled);
        assert_eq!(parser.program_name(), "other");

        let args: [&str; 0] = [];
        let (handled, help) = parse_quiet(&mut parser, &args);
        assert!(!handled);
        assert_eq!(parser.program_name(), "prog");
        assert!(help.starts_with("usage: prog  [-options]"));
    }

    #[test]
    fn test_empty_args_fail_with_help() {
        let mut parser = Parser::with_program_name("prog");
        let args: [&str; 0] = [];
        let (handled, help) = parse_quiet(&mut parser, &args);

        assert!(!handled);
        assert_eq!(parser.parse_status(), ParseStatus::Failed);
        assert!(help.starts_with("usage: prog  [-options]"));
    }

    #[test]
    fn test_program_name_only_fails_with_help() {
        let mut parser = Parser::new();
        let (handled, help) = parse_quiet(&mut parser, &["/opt/bin/test"]);

        assert!(!handled);
        assert_eq!(parser.program_name(), "test");
        assert_eq!(
            help,
            "usage: test  [-options] [command] [--command_option=value]\n"
        );
    }

    #[test]
    fn test_empty_token_is_unhandled() {
        let mut parser = Parser::new();
        let (handled, help) = parse_quiet(&mut parser, &["test", ""]);
        assert!(!handled);
        assert!(help.starts_with("usage: test"));
    }

    #[test]
    fn test_pre_verb_option_value_is_captured() {
        let mut parser = Parser::new();
        parser.add_option(Opt::new("x", "a number")).unwrap();

        let (handled, help) = parse_quiet(&mut parser, &["prog", "-x=42"]);
        assert!(handled);
        assert!(help.is_empty());
        assert_eq!(parser.get_option("x").unwrap().data(), "42");

        let matched: Vec<&str> = parser.matched_options().map(Opt::text).collect();
        assert_eq!(matched, vec!["x"]);
        assert!(parser.active_verb().is_none());
    }

    #[test]
    fn test_pre_verb_option_without_value_keeps_data_empty() {
        let mut parser = Parser::new();
        parser.add_option(Opt::new("v", "verbose")).unwrap();

        let (handled, _) = parse_quiet(&mut parser, &["prog", "-v"]);
        assert!(handled);
        assert!(!parser.get_option("v").unwrap().has_data());
        assert_eq!(parser.matched_options().count(), 1);
    }

    #[test]
    fn test_verb_and_sub_option_resolve() {
        let mut parser = Parser::new();
        parser
            .add_verb(
                Verb::without_callback("go", "move")
                    .with_option(Opt::new("n", "steps"))
                    .unwrap(),
            )
            .unwrap();

        let (handled, _) = parse_quiet(&mut parser, &["prog", "go", "--n=5"]);
        assert!(handled);
        assert_eq!(parser.active_verb().unwrap().name(), "go");

        let matched: Vec<(&str, &str)> = parser
            .matched_verb_options()
            .map(|o| (o.text(), o.data()))
            .collect();
        assert_eq!(matched, vec![("n", "5")]);
    }

    #[test]
    fn test_unknown_token_fails_whole_parse() {
        let mut parser = Parser::new();
        parser.add_option(Opt::new("v", "verbose")).unwrap();
        parser
            .add_verb(Verb::without_callback("go", "move").with_option(Opt::new("n", "steps")).unwrap())
            .unwrap();

        for args in [
            vec!["prog", "-v", "-q"],
            vec!["prog", "-v", "stop"],
            vec!["prog", "go", "--n=1", "--m=2"],
            vec!["prog", "--n=1", "go"],
        ] {
            let (handled, help) = parse_quiet(&mut parser, &args);
            assert!(!handled, "expected failure for {args:?}");
            assert!(help.starts_with("usage: prog"));
        }
    }

    #[test]
    fn test_unknown_token_still_records_other_matches() {
        let mut parser = Parser::new();
        parser.add_option(Opt::new("v", "verbose")).unwrap();

        let (handled, _) = parse_quiet(&mut parser, &["prog", "-q", "-v=1"]);
        assert!(!handled);
        assert_eq!(parser.get_option("v").unwrap().data(), "1");
    }

    #[test]
    fn test_single_dash_is_looked_up_as_verb() {
        let mut parser = Parser::new();
        parser
            .add_verb(Verb::without_callback("-", "read stdin"))
            .unwrap();

        let (handled, _) = parse_quiet(&mut parser, &["prog", "-"]);
        assert!(handled);
        assert_eq!(parser.active_verb().unwrap().name(), "-");
    }

    #[test]
    fn test_second_verb_name_is_not_a_verb() {
        let mut parser = Parser::new();
        parser.add_verb(Verb::without_callback("go", "move")).unwrap();
        parser.add_verb(Verb::without_callback("stop", "halt")).unwrap();

        let (handled, _) = parse_quiet(&mut parser, &["prog", "go", "stop"]);
        assert!(!handled);
    }

    #[test]
    fn test_post_verb_prefix_is_two_characters() {
        let mut parser = Parser::new();
        parser
            .add_verb(Verb::without_callback("go", "move").with_option(Opt::new("n", "steps")).unwrap())
            .unwrap();

        let (handled, _) = parse_quiet(&mut parser, &["prog", "go", "-n=5"]);
        assert!(!handled);
    }

    #[test]
    fn test_duplicate_tokens_are_recorded_each_time() {
        let log: Log = Rc::default();
        let mut parser = Parser::new();
        parser.add_option(recording_option("x", &log)).unwrap();

        let (handled, _) = parse_quiet(&mut parser, &["prog", "-x=1", "-x=2"]);
        assert!(handled);
        assert_eq!(parser.matched_options().count(), 2);
        assert_eq!(parser.get_option("x").unwrap().data(), "2");

        parser.run_to(&mut Vec::new()).unwrap();
        assert_eq!(*log.borrow(), vec!["x=2", "x=2"]);
    }

    #[test]
    fn test_matched_values_are_kept_per_token() {
        let mut parser = Parser::new();
        parser.add_option(Opt::new("x", "a number")).unwrap();
        parser
            .add_verb(Verb::without_callback("go", "move").with_option(Opt::new("n", "steps")).unwrap())
            .unwrap();

        let (handled, _) =
            parse_quiet(&mut parser, &["prog", "-x=1", "-x", "go", "--n=a", "--n=b"]);
        assert!(handled);

        let pre: Vec<(&str, Option<&str>)> = parser
            .matched_option_values()
            .map(|(o, v)| (o.text(), v))
            .collect();
        assert_eq!(pre, vec![("x", Some("1")), ("x", None)]);

        let post: Vec<Option<&str>> = parser.matched_verb_option_values().map(|(_, v)| v).collect();
        assert_eq!(post, vec![Some("a"), Some("b")]);
        assert_eq!(parser.get_verb("go").unwrap().get_option("n").unwrap().data(), "b");
    }

    #[test]
    fn test_reparse_does_not_leak_state() {
        let mut parser = Parser::new();
        parser.add_option(Opt::new("x", "a number")).unwrap();
        parser
            .add_verb(Verb::without_callback("go", "move").with_option(Opt::new("n", "steps")).unwrap())
            .unwrap();

        let (handled, _) = parse_quiet(&mut parser, &["prog", "-x=1", "go", "--n=5"]);
        assert!(handled);

        let (handled, _) = parse_quiet(&mut parser, &["other", "-x"]);
        assert!(handled);
        assert_eq!(parser.program_name(), "other");
        assert!(parser.active_verb().is_none());
        assert_eq!(parser.matched_options().count(), 1);
        assert_eq!(parser.matched_verb_options().count(), 0);
        assert!(!parser.get_option("x").unwrap().has_data());
        assert!(!parser.get_verb("go").unwrap().get_option("n").unwrap().has_data());
    }

    #[test]
    fn test_run_order_is_pre_verb_then_verb_options_then_verb() {
        let log: Log = Rc::default();
        let mut parser = Parser::new();
        parser.add_option(recording_option("a", &log)).unwrap();
        parser.add_option(recording_option("b", &log)).unwrap();
        let mut verb = recording_verb("go", &log);
        verb.add_option(recording_option("n", &log)).unwrap();
        parser.add_verb(verb).unwrap();

        let (handled, _) = parse_quiet(&mut parser, &["prog", "-b", "-a=1", "go", "--n=5"]);
        assert!(handled);
        assert_eq!(parser.run_to(&mut Vec::new()).unwrap(), RunOutcome::Completed);
        assert_eq!(*log.borrow(), vec!["b=", "a=1", "n=5", "verb:go"]);
    }

    #[test]
    fn test_run_without_verb_reports_no_verb() {
        let log: Log = Rc::default();
        let mut parser = Parser::new();
        parser.add_option(recording_option("preverb", &log)).unwrap();

        let (handled, _) = parse_quiet(&mut parser, &["test", "-preverb=matrix"]);
        assert!(handled);
        assert_eq!(parser.run_to(&mut Vec::new()).unwrap(), RunOutcome::NoVerb);
        assert_eq!(*log.borrow(), vec!["preverb=matrix"]);
    }

    #[test]
    fn test_pre_verb_error_aborts_run() {
        let log: Log = Rc::default();
        let mut parser = Parser::new();
        parser
            .add_option(Opt::with_callback("bad", "fails", |_| Err("bad option".into())))
            .unwrap();
        parser.add_option(recording_option("good", &log)).unwrap();
        parser.add_verb(recording_verb("go", &log)).unwrap();

        let (handled, _) = parse_quiet(&mut parser, &["prog", "-bad", "-good", "go"]);
        assert!(handled);

        let err = parser.run_to(&mut Vec::new()).unwrap_err();
        assert!(matches!(err, Error::Callback { ref name, .. } if name == "bad"));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_post_verb_error_aborts_before_verb_callback() {
        let log: Log = Rc::default();
        let mut parser = Parser::new();
        let mut verb = recording_verb("go", &log);
        verb.add_option(Opt::with_callback("n", "fails", |_| Err("bad count".into())))
            .unwrap();
        verb.add_option(recording_option("m", &log)).unwrap();
        parser.add_verb(verb).unwrap();

        let (handled, _) = parse_quiet(&mut parser, &["prog", "go", "--n=5", "--m=1"]);
        assert!(handled);

        let err = parser.run_to(&mut Vec::new()).unwrap_err();
        assert!(matches!(err, Error::Callback { ref name, .. } if name == "n"));
        assert_eq!(err.to_string(), "callback for 'n' failed: bad count");
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_required_option_violation_skips_verb_callback() {
        let log: Log = Rc::default();
        let mut parser = Parser::new();
        let mut verb = recording_verb("push", &log);
        verb.add_option(Opt::new("remote", "where to push")).unwrap();
        verb.set_requires_option();
        parser.add_verb(verb).unwrap();

        let (handled, _) = parse_quiet(&mut parser, &["prog", "push"]);
        assert!(handled);

        let mut out = Vec::new();
        let outcome = parser.run_to(&mut out).unwrap();
        assert_eq!(
            outcome,
            RunOutcome::MissingRequiredOption {
                verb: "push".to_string()
            }
        );
        assert!(log.borrow().is_empty());
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "push records itself\n     --remote     where to push\n"
        );
    }

    #[test]
    fn test_required_option_satisfied_runs_verb() {
        let log: Log = Rc::default();
        let mut parser = Parser::new();
        let mut verb = recording_verb("push", &log);
        verb.add_option(Opt::new("remote", "where to push")).unwrap();
        verb.set_requires_option();
        parser.add_verb(verb).unwrap();

        let (handled, _) = parse_quiet(&mut parser, &["prog", "push", "--remote=origin"]);
        assert!(handled);
        assert_eq!(parser.run_to(&mut Vec::new()).unwrap(), RunOutcome::Completed);
        assert_eq!(*log.borrow(), vec!["verb:push"]);
    }

    #[test]
    fn test_run_requires_successful_parse() {
        let mut parser = Parser::new();
        parser.add_verb(Verb::without_callback("go", "move")).unwrap();
        assert!(matches!(parser.run_to(&mut Vec::new()), Err(Error::NotParsed)));

        let (handled, _) = parse_quiet(&mut parser, &["prog", "nope"]);
        assert!(!handled);
        assert!(matches!(parser.run_to(&mut Vec::new()), Err(Error::NotParsed)));
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut parser = Parser::new();
        parser.add_option(Opt::new("v", "first")).unwrap();
        assert!(matches!(
            parser.add_option(Opt::new("v", "second")),
            Err(Error::DuplicateOption(ref name)) if name == "v"
        ));

        parser.add_verb(Verb::without_callback("go", "first")).unwrap();
        assert!(matches!(
            parser.add_verb(Verb::without_callback("go", "second")),
            Err(Error::DuplicateVerb(ref name)) if name == "go"
        ));
        assert!(matches!(
            parser.add_verb(Verb::without_callback("", "blank")),
            Err(Error::EmptyName)
        ));

        assert_eq!(parser.options().count(), 1);
        assert_eq!(parser.verbs().count(), 1);
        assert_eq!(parser.get_verb("go").unwrap().description(), "first");
    }

    #[test]
    fn test_option_and_verb_may_share_a_name() {
        let mut parser = Parser::new();
        parser.add_option(Opt::new("go", "global go")).unwrap();
        parser.add_verb(Verb::without_callback("go", "verb go")).unwrap();

        let (handled, _) = parse_quiet(&mut parser, &["prog", "-go", "go"]);
        assert!(handled);
        assert_eq!(parser.matched_options().count(), 1);
        assert_eq!(parser.active_verb().unwrap().name(), "go");
    }
}
