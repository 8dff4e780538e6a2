//! Named options and their value slots.
//!
//! An [`Opt`] is matched verbatim against a token's name part. Pre-verb
//! options are written `-name` or `-name=value`; options scoped to a verb
//! are written `--name` or `--name=value`. The value is an opaque string.

use std::fmt;

use crate::error::CallbackResult;

/// Callback invoked with the matched option during [`Parser::run`](crate::Parser::run).
pub type OptionCallback = Box<dyn Fn(&Opt) -> CallbackResult>;

/// Width of the name column in option renderings.
pub const NAME_COLUMN_WIDTH: usize = 10;

/// A named flag with an optional value and an optional callback.
///
/// # Examples
///
/// ```
/// use verbopt_core::Opt;
///
/// let opt = Opt::new("Test", "Description");
/// assert!(!opt.has_callback());
/// assert_eq!(opt.data(), "");
/// assert_eq!(opt.to_string(), "-Test       Description");
/// ```
pub struct Opt {
    text: String,
    description: String,
    callback: Option<OptionCallback>,
    data: String,
}

impl Opt {
    /// Creates an option without a callback.
    pub fn new(text: &str, description: &str) -> Self {
        Self {
            text: text.to_string(),
            description: description.to_string(),
            callback: None,
            data: String::new(),
        }
    }

    /// Creates an option whose callback fires when it was matched.
    ///
    /// # Examples
    ///
    /// ```
    /// use verbopt_core::Opt;
    ///
    /// let mut opt = Opt::with_callback("level", "Set the level", |o| Ok(o.data() == "3"));
    /// opt.set_data("3");
    /// assert!(opt.on_match().unwrap());
    /// ```
    pub fn with_callback<F>(text: &str, description: &str, callback: F) -> Self
    where
        F: Fn(&Opt) -> CallbackResult + 'static,
    {
        Self {
            callback: Some(Box::new(callback)),
            ..Self::new(text, description)
        }
    }

    /// Name matched against tokens.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Value captured from a `name=value` token, empty if none.
    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn has_data(&self) -> bool {
        !self.data.is_empty()
    }

    pub fn set_data(&mut self, value: &str) {
        self.data.clear();
        self.data.push_str(value);
    }

    pub fn clear_data(&mut self) {
        self.data.clear();
    }

    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Invokes the callback with `self`.
    ///
    /// An option without a callback reports `Ok(true)`.
    pub fn on_match(&self) -> CallbackResult {
        match &self.callback {
            Some(callback) => callback(self),
            None => Ok(true),
        }
    }
}

impl fmt::Display for Opt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "-{:<width$} {}",
            self.text,
            self.description,
            width = NAME_COLUMN_WIDTH
        )?;
        if self.has_data() {
            write!(f, " Data='{}'", self.data)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Opt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Opt")
            .field("text", &self.text)
            .field("description", &self.description)
            .field("has_callback", &self.callback.is_some())
            .field("data", &self.data)
            .finish()
    }
}
