//! Declarative parser registration.
//!
//! A [`ParserDefinition`] lists pre-verb options and verbs in YAML or JSON
//! and builds a [`Parser`] from them. Callbacks cannot be expressed in a
//! file, so [`ParserDefinition::build_with`] lets the host attach them
//! while the registry is built.
//!
//! # Example YAML
//!
//! ```yaml
//! program: test.exe
//! config:
//!   debug: false
//!   help_stream: stdout
//! options:
//!   - name: v
//!     description: Show version of program
//! verbs:
//!   - name: get
//!     description: Retrieve information about the node
//!     requires_option: true
//!     options:
//!       - name: test
//!         description: Select the test option
//! ```

use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::ParserConfig;
use crate::error::{Error, Result};
use crate::option::Opt;
use crate::parser::Parser;
use crate::verb::Verb;

/// A pre-verb option or verb option in a definition file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A verb in a definition file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerbDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// At least one of `options` must be given for the verb to run.
    #[serde(default)]
    pub requires_option: bool,
    #[serde(default)]
    pub options: Vec<OptionDefinition>,
}

/// Options and verbs to register on a [`Parser`].
///
/// # Examples
///
/// ```
/// use verbopt_core::ParserDefinition;
///
/// let definition = ParserDefinition::from_yaml_str(
///     "options:\n  - name: v\nverbs:\n  - name: go\n    options:\n      - name: n\n",
/// )
/// .unwrap();
///
/// let mut parser = definition.build().unwrap();
/// assert!(parser.parse(&["prog", "-v", "go", "--n=5"]));
/// assert_eq!(parser.active_verb().unwrap().name(), "go");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserDefinition {
    /// Program name shown in help before the first parse.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(default)]
    pub config: ParserConfig,
    #[serde(default)]
    pub options: Vec<OptionDefinition>,
    #[serde(default)]
    pub verbs: Vec<VerbDefinition>,
}

impl ParserDefinition {
    /// Loads a definition, choosing the format from the file extension
    /// (`.json`, `.yml` or `.yaml`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedDefinitionFormat`] for other extensions,
    /// [`Error::Io`] if the file cannot be read, and [`Error::Json`] or
    /// [`Error::Yaml`] if it does not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("json") => {
                let reader = BufReader::new(std::fs::File::open(path)?);
                Ok(serde_json::from_reader(reader)?)
            }
            Some("yml" | "yaml") => {
                let reader = BufReader::new(std::fs::File::open(path)?);
                Ok(serde_yaml::from_reader(reader)?)
            }
            _ => Err(Error::UnsupportedDefinitionFormat(
                path.display().to_string(),
            )),
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds a parser with no callbacks attached.
    pub fn build(&self) -> Result<Parser> {
        self.build_with(
            |option| Opt::new(&option.name, &option.description),
            |verb| Verb::without_callback(&verb.name, &verb.description),
        )
    }

    /// Builds a parser, creating every option and verb through the given
    /// factories so the host can attach callbacks.
    ///
    /// The verb factory only creates the verb itself; its options come from
    /// `make_option` and the required-option flag from the definition.
    ///
    /// # Errors
    ///
    /// Propagates registration errors such as duplicate or empty names.
    pub fn build_with<O, V>(&self, mut make_option: O, mut make_verb: V) -> Result<Parser>
    where
        O: FnMut(&OptionDefinition) -> Opt,
        V: FnMut(&VerbDefinition) -> Verb,
    {
        let mut parser = match &self.program {
            Some(program) => Parser::with_program_name(program),
            None => Parser::new(),
        };
        parser.set_config(self.config);

        for option in &self.options {
            parser.add_option(make_option(option))?;
        }

        for definition in &self.verbs {
            let mut verb = make_verb(definition);
            for option in &definition.options {
                verb.add_option(make_option(option))?;
            }
            if definition.requires_option {
                verb.set_requires_option();
            }
            parser.add_verb(verb)?;
        }

        Ok(parser)
    }
}
