//! Usage text rendering.
//!
//! Output shape:
//!
//! ```text
//! usage: prog  [-options] [command] [--command_option=value]
//! options:
//!   -v          Show version of program
//! commands:
//!   get Retrieve information about the node
//!        --test       Select the test option
//! ```
//!
//! The `options:` and `commands:` blocks are omitted when empty.

use crate::parser::Parser;

const BLOCK_INDENT: &str = "  ";

/// Renders the usage line for `program`.
pub fn usage_line(program: &str) -> String {
    format!("usage: {program}  [-options] [command] [--command_option=value]")
}

/// Renders the full help text for a parser, newline-terminated.
///
/// # Examples
///
/// ```
/// use verbopt_core::{Parser, render_help};
///
/// let parser = Parser::with_program_name("test");
/// assert_eq!(
///     render_help(&parser),
///     "usage: test  [-options] [command] [--command_option=value]\n"
/// );
/// ```
pub fn render_help(parser: &Parser) -> String {
    let mut out = usage_line(parser.program_name());
    out.push('\n');

    let mut options = parser.options().peekable();
    if options.peek().is_some() {
        out.push_str("options:\n");
        for option in options {
            out.push_str(&format!("{BLOCK_INDENT}{option}\n"));
        }
    }

    let mut verbs = parser.verbs().peekable();
    if verbs.peek().is_some() {
        out.push_str("commands:\n");
        for verb in verbs {
            for line in verb.to_string().lines() {
                out.push_str(&format!("{BLOCK_INDENT}{line}\n"));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Opt, Verb};

    #[test]
    fn test_usage_line_format() {
        assert_eq!(
            usage_line("test"),
            "usage: test  [-options] [command] [--command_option=value]"
        );
    }

    #[test]
    fn test_render_help_lists_options_and_commands() {
        let mut parser = Parser::with_program_name("test.exe");
        parser
            .add_option(Opt::new("v", "Show version of program"))
            .unwrap();
        parser
            .add_verb(
                Verb::without_callback("get", "Retrieve information about the node")
                    .with_option(Opt::new("test", "Select the test option"))
                    .unwrap(),
            )
            .unwrap();

        let help = render_help(&parser);
        let lines: Vec<&str> = help.lines().collect();
        assert_eq!(
            lines,
            vec![
                "usage: test.exe  [-options] [command] [--command_option=value]",
                "options:",
                "  -v          Show version of program",
                "commands:",
                "  get Retrieve information about the node",
                "       --test       Select the test option",
            ]
        );
    }

    #[test]
    fn test_render_help_skips_empty_option_block() {
        let mut parser = Parser::with_program_name("test");
        parser
            .add_verb(Verb::without_callback("go", "move along"))
            .unwrap();

        let help = render_help(&parser);
        assert!(!help.contains("options:"));
        assert!(help.contains("commands:\n  go move along\n"));
    }

    #[test]
    fn test_render_help_indents_every_verb_line() {
        let mut parser = Parser::with_program_name("test");
        parser.add_option(Opt::new("q", "quiet")).unwrap();
        parser
            .add_verb(
                Verb::without_callback("push", "send changes")
                    .with_option(Opt::new("remote", "where to push"))
                    .unwrap()
                    .with_option(Opt::new("force", "overwrite"))
                    .unwrap(),
            )
            .unwrap();

        let help = render_help(&parser);
        let lines: Vec<&str> = help.lines().collect();
        assert_eq!(
            lines,
            vec![
                "usage: test  [-options] [command] [--command_option=value]",
                "options:",
                "  -q          quiet",
                "commands:",
                "  push send changes",
                "       --remote     where to push",
                "       --force      overwrite",
            ]
        );
        assert!(help.ends_with("overwrite\n"));
    }
}
