//! Verbs (subcommands) and their scoped options.

use std::collections::HashMap;
use std::fmt;

use crate::error::{CallbackResult, Error, Result};
use crate::option::Opt;

/// Callback invoked with the active verb during [`Parser::run`](crate::Parser::run).
pub type VerbCallback = Box<dyn Fn(&Verb) -> CallbackResult>;

/// Indentation of sub-option lines under a verb header.
const SUB_OPTION_INDENT: &str = "     ";

/// A named subcommand with its own options and callback.
///
/// Sub-options keep their registration order for rendering and are indexed
/// by name for lookup.
///
/// # Examples
///
/// ```
/// use verbopt_core::{Opt, Verb};
///
/// let mut verb = Verb::new("drink", "consume a liquid", |v| {
///     Ok(v.get_option("flavor").is_some_and(|o| o.has_data()))
/// });
/// verb.add_option(Opt::new("flavor", "one word delight")).unwrap();
///
/// assert!(verb.get_option("flavor").is_some());
/// assert!(verb.get_option("size").is_none());
/// assert_eq!(verb.to_string().lines().count(), 2);
/// ```
pub struct Verb {
    main: Opt,
    options: Vec<Opt>,
    index: HashMap<String, usize>,
    callback: Option<VerbCallback>,
    requires_option: bool,
}

impl Verb {
    /// Creates a verb whose callback fires when it is the active verb.
    pub fn new<F>(name: &str, description: &str, callback: F) -> Self
    where
        F: Fn(&Verb) -> CallbackResult + 'static,
    {
        Self {
            callback: Some(Box::new(callback)),
            ..Self::without_callback(name, description)
        }
    }

    /// Creates a verb with no callback; matching it always succeeds.
    pub fn without_callback(name: &str, description: &str) -> Self {
        Self {
            main: Opt::new(name, description),
            options: Vec::new(),
            index: HashMap::new(),
            callback: None,
            requires_option: false,
        }
    }

    pub fn name(&self) -> &str {
        self.main.text()
    }

    pub fn description(&self) -> &str {
        self.main.description()
    }

    /// Registers a sub-option.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyName`] for a blank name and
    /// [`Error::DuplicateSubOption`] if this verb already has an option with
    /// the same name.
    pub fn add_option(&mut self, option: Opt) -> Result<()> {
        if option.text().trim().is_empty() {
            return Err(Error::EmptyName);
        }
        if self.index.contains_key(option.text()) {
            return Err(Error::DuplicateSubOption {
                verb: self.name().to_string(),
                option: option.text().to_string(),
            });
        }
        self.index
            .insert(option.text().to_string(), self.options.len());
        self.options.push(option);
        Ok(())
    }

    /// Builder form of [`add_option`](Verb::add_option).
    pub fn with_option(mut self, option: Opt) -> Result<Self> {
        self.add_option(option)?;
        Ok(self)
    }

    /// Looks up a sub-option by name.
    pub fn get_option(&self, name: &str) -> Option<&Opt> {
        self.index.get(name).map(|&i| &self.options[i])
    }

    /// Sub-options in registration order.
    pub fn options(&self) -> impl Iterator<Item = &Opt> {
        self.options.iter()
    }

    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    /// Marks this verb as needing at least one matched sub-option to run.
    pub fn set_requires_option(&mut self) {
        self.requires_option = true;
    }

    pub fn is_option_required(&self) -> bool {
        self.requires_option
    }

    /// Invokes the callback with `self`; a verb without one reports `Ok(true)`.
    pub fn on_match(&self) -> CallbackResult {
        match &self.callback {
            Some(callback) => callback(self),
            None => Ok(true),
        }
    }

    pub(crate) fn option_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub(crate) fn option_at(&self, index: usize) -> &Opt {
        &self.options[index]
    }

    pub(crate) fn option_at_mut(&mut self, index: usize) -> &mut Opt {
        &mut self.options[index]
    }

    pub(crate) fn clear_option_data(&mut self) {
        for option in &mut self.options {
            option.clear_data();
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name(), self.description())?;
        for option in &self.options {
            write!(f, "\n{SUB_OPTION_INDENT}-{option}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verb")
            .field("main", &self.main)
            .field("options", &self.options)
            .field("has_callback", &self.callback.is_some())
            .field("requires_option", &self.requires_option)
            .finish()
    }
}
