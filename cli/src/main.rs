use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use verbopt_core::{
    HelpStream, Opt, OptionDefinition, ParserDefinition, RunOutcome, Verb, VerbDefinition,
    render_help,
};

const DEFAULT_PROGRAM: &str = "verbopt";

/// Exit code when a token was not handled.
const EXIT_PARSE_FAILURE: u8 = 2;
/// Exit code when the active verb required an option and got none.
const EXIT_MISSING_OPTION: u8 = 3;

#[derive(Debug, Parser)]
#[command(name = "verbopt", disable_help_subcommand = true)]
#[command(about = "Try verb/option registrations against argument vectors")]
struct Cli {
    /// Log filter used when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse the arguments after `--` and run the matched callbacks.
    Parse(ParseArgs),
    /// Print the usage text for a definition.
    Help(HelpArgs),
    /// Validate a definition file and summarize it.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// YAML or JSON definition (default: the built-in demo registration).
    #[arg(long)]
    definition: Option<PathBuf>,
    /// Program name placed before the arguments.
    #[arg(long)]
    program: Option<String>,
    /// Log every token decision and callback.
    #[arg(long)]
    debug: bool,
    /// Write usage text to stderr instead of stdout.
    #[arg(long)]
    stderr: bool,
    /// Print a JSON summary instead of per-callback lines.
    #[arg(long)]
    json: bool,
    /// Arguments to parse, without the program name.
    #[arg(last = true)]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct HelpArgs {
    /// YAML or JSON definition (default: the built-in demo registration).
    #[arg(long)]
    definition: Option<PathBuf>,
    /// Program name shown in the usage line.
    #[arg(long)]
    program: Option<String>,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// YAML or JSON definition file.
    definition: PathBuf,
}

#[derive(Debug, Serialize)]
struct MatchedValue {
    name: String,
    /// Value carried by this token; `None` for a bare flag.
    value: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum OutcomeKind {
    Completed,
    NoVerb,
    MissingRequiredOption,
}

#[derive(Debug, Serialize)]
struct RunSummary {
    program: String,
    verb: Option<String>,
    options: Vec<MatchedValue>,
    verb_options: Vec<MatchedValue>,
    outcome: OutcomeKind,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let debug_requested = matches!(&cli.command, Command::Parse(args) if args.debug);
    init_tracing(&cli.log_level, debug_requested);

    let result = match cli.command {
        Command::Parse(args) => run_parse(args),
        Command::Help(args) => run_help(args).map(|()| ExitCode::SUCCESS),
        Command::Check(args) => run_check(args).map(|()| ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(log_level: &str, debug: bool) {
    let fallback = if debug { "verbopt_core=debug" } else { log_level };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .init();
}

fn run_parse(args: ParseArgs) -> Result<ExitCode, String> {
    let mut definition = load_definition(args.definition.as_deref())?;
    definition.config.debug |= args.debug;
    if args.stderr {
        definition.config.help_stream = HelpStream::Stderr;
    }

    let built = if args.json {
        definition.build()
    } else {
        definition.build_with(printing_option, printing_verb)
    };
    let mut parser = built.map_err(|err| format!("Invalid definition: {err}"))?;

    let program = args
        .program
        .or_else(|| definition.program.clone())
        .unwrap_or_else(|| DEFAULT_PROGRAM.to_string());
    let mut argv = Vec::with_capacity(args.args.len() + 1);
    argv.push(program);
    argv.extend(args.args);
    debug!(argv = ?argv, "Parsing argument vector");

    if !parser.parse(argv.as_slice()) {
        return Ok(ExitCode::from(EXIT_PARSE_FAILURE));
    }

    let outcome = parser.run().map_err(|err| err.to_string())?;
    info!(outcome = ?outcome, "Run finished");

    if args.json {
        let summary = RunSummary {
            program: parser.program_name().to_string(),
            verb: parser.active_verb().map(|verb| verb.name().to_string()),
            options: parser.matched_option_values().map(matched_value).collect(),
            verb_options: parser
                .matched_verb_option_values()
                .map(matched_value)
                .collect(),
            outcome: match outcome {
                RunOutcome::Completed => OutcomeKind::Completed,
                RunOutcome::NoVerb => OutcomeKind::NoVerb,
                RunOutcome::MissingRequiredOption { .. } => OutcomeKind::MissingRequiredOption,
            },
        };
        let raw = serde_json::to_string_pretty(&summary)
            .map_err(|err| format!("Failed to serialize run summary: {err}"))?;
        println!("{raw}");
    }

    Ok(match outcome {
        RunOutcome::MissingRequiredOption { .. } => ExitCode::from(EXIT_MISSING_OPTION),
        RunOutcome::Completed | RunOutcome::NoVerb => ExitCode::SUCCESS,
    })
}

fn run_help(args: HelpArgs) -> Result<(), String> {
    let mut definition = load_definition(args.definition.as_deref())?;
    if args.program.is_some() {
        definition.program = args.program;
    }
    let parser = definition
        .build()
        .map_err(|err| format!("Invalid definition: {err}"))?;
    print!("{}", render_help(&parser));
    Ok(())
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let definition = load_definition(Some(args.definition.as_path()))?;
    let parser = definition
        .build()
        .map_err(|err| format!("Invalid definition '{}': {err}", args.definition.display()))?;

    let sub_options: usize = parser.verbs().map(Verb::option_count).sum();
    println!(
        "Validated '{}': {} option(s), {} verb(s), {} verb option(s).",
        args.definition.display(),
        parser.options().count(),
        parser.verbs().count(),
        sub_options
    );
    Ok(())
}

fn load_definition(path: Option<&Path>) -> Result<ParserDefinition, String> {
    match path {
        Some(path) => ParserDefinition::load(path)
            .map_err(|err| format!("Failed to load '{}': {err}", path.display())),
        None => Ok(demo_definition()),
    }
}

fn demo_definition() -> ParserDefinition {
    ParserDefinition {
        program: Some("test.exe".to_string()),
        options: vec![OptionDefinition {
            name: "v".to_string(),
            description: "Show version of program".to_string(),
        }],
        verbs: vec![VerbDefinition {
            name: "get".to_string(),
            description: "Retrieve information about the node".to_string(),
            requires_option: false,
            options: vec![OptionDefinition {
                name: "test".to_string(),
                description: "Select the test option".to_string(),
            }],
        }],
        ..ParserDefinition::default()
    }
}

fn printing_option(option: &OptionDefinition) -> Opt {
    Opt::with_callback(&option.name, &option.description, |opt| {
        if opt.has_data() {
            println!("option {}={}", opt.text(), opt.data());
        } else {
            println!("option {}", opt.text());
        }
        Ok(true)
    })
}

fn printing_verb(verb: &VerbDefinition) -> Verb {
    Verb::new(&verb.name, &verb.description, |active| {
        let values: Vec<String> = active
            .options()
            .filter(|opt| opt.has_data())
            .map(|opt| format!(" {}={}", opt.text(), opt.data()))
            .collect();
        println!("verb {}{}", active.name(), values.concat());
        Ok(true)
    })
}

fn matched_value((option, value): (&Opt, Option<&str>)) -> MatchedValue {
    MatchedValue {
        name: option.text().to_string(),
        value: value.map(str::to_string),
    }
}
