//! Command handler types.
//!
//! A handler is a constructible unit that exposes named, argument-less
//! actions. One instance is built per invocation from a [`CommandContext`]
//! holding the positional arguments and parsed flags, then asked whether it
//! responds to the requested action before that action is invoked.
//!
//! # Core Types
//!
//! - [`CommandContext`]: arguments, flags and shared app state for one invocation
//! - [`Extensions`]: type-safe container for shared state (settings, API clients)
//! - [`Output`]: what an action produces (text or nothing)
//! - [`HandlerResult`]: the result type for actions
//! - [`Handler`]: action lookup and invocation by name
//! - [`CommandSet`]: a handler that knows its namespace and registers its actions
//!
//! `Handler` and `CommandSet` are normally generated by the `#[commands]`
//! attribute:
//!
//! ```rust,ignore
//! use heroku_dispatch::{commands, CommandContext, HandlerResult, Output};
//!
//! pub struct Ssl {
//!     ctx: CommandContext,
//! }
//!
//! impl From<CommandContext> for Ssl {
//!     fn from(ctx: CommandContext) -> Self {
//!         Self { ctx }
//!     }
//! }
//!
//! #[commands]
//! impl Ssl {
//!     /// ssl:clear
//!     ///
//!     /// remove all ssl certificates from an app
//!     pub fn clear(&mut self) -> HandlerResult {
//!         let app = self.ctx.app()?;
//!         Ok(Output::text(format!("Cleared certificates for {}", app)))
//!     }
//! }
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::CommandError;
use crate::options::Options;
use crate::registry::Registry;

/// Message raised by [`CommandContext::app`] when no app was given.
pub const NO_APP_SPECIFIED: &str = "No app specified.\nRun this command from an app folder or specify which app to use with --app <app name>";

/// Type-safe container for state shared with handlers.
///
/// The dispatcher owns one `Extensions` as its app state and hands every
/// [`CommandContext`] a shared reference to it. Typical contents are host
/// settings and the API client.
///
/// ```rust
/// use heroku_dispatch::Extensions;
///
/// struct Settings { host: String }
///
/// let mut state = Extensions::new();
/// state.insert(Settings { host: "heroku.com".into() });
/// assert_eq!(state.get::<Settings>().unwrap().host, "heroku.com");
/// ```
#[derive(Default)]
pub struct Extensions {
    map: HashMap<TypeId, Box<dyn Any>>,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, returning the one it replaced.
    pub fn insert<T: 'static>(&mut self, val: T) -> Option<T> {
        self.map
            .insert(TypeId::of::<T>(), Box::new(val))
            .and_then(|boxed| boxed.downcast().ok().map(|b| *b))
    }

    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.map
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref())
    }

    /// Gets a value that must be present.
    ///
    /// A missing value is a wiring bug, reported as an unclassified error.
    pub fn get_required<T: 'static>(&self) -> Result<&T, CommandError> {
        self.get::<T>().ok_or_else(|| {
            CommandError::Other(anyhow::anyhow!(
                "Extension missing: type {} not found in app state",
                std::any::type_name::<T>()
            ))
        })
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.map.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl fmt::Debug for Extensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extensions")
            .field("len", &self.map.len())
            .finish_non_exhaustive()
    }
}

/// Everything a handler is built from.
#[derive(Debug)]
pub struct CommandContext {
    /// Canonical command key being executed (e.g. `apps:create`).
    pub command: String,
    /// Positional arguments, in order.
    pub args: Vec<String>,
    /// Flags given on the command line.
    pub options: Options,
    /// State shared by every invocation of this dispatcher.
    pub app_state: Rc<Extensions>,
}

impl CommandContext {
    pub fn new(
        command: impl Into<String>,
        args: Vec<String>,
        options: Options,
        app_state: Rc<Extensions>,
    ) -> Self {
        Self {
            command: command.into(),
            args,
            options,
            app_state,
        }
    }

    /// A context with no arguments, flags or state.
    pub fn for_command(command: impl Into<String>) -> Self {
        Self::new(command, Vec::new(), Options::default(), Rc::default())
    }

    /// Removes and returns the first positional argument.
    pub fn shift_arg(&mut self) -> Option<String> {
        if self.args.is_empty() {
            None
        } else {
            Some(self.args.remove(0))
        }
    }

    /// Value of a flag given as `--name VALUE` or `--name=VALUE`.
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options.value(name)
    }

    /// Returns true if the flag was given, with or without a value.
    pub fn flag(&self, name: &str) -> bool {
        self.options.contains(name)
    }

    /// Reads an optional flag: `None` when absent, `default` when given
    /// bare, its value otherwise. Leading dashes in `name` are ignored.
    pub fn extract_option(&self, name: &str, default: &str) -> Option<String> {
        let key = name.trim_start_matches('-');
        if !self.options.contains(key) {
            return None;
        }
        Some(
            self.options
                .value(key)
                .map(String::from)
                .unwrap_or_else(|| default.to_string()),
        )
    }

    /// The app this command targets, taken from `--app`.
    pub fn app(&self) -> Result<String, CommandError> {
        self.option("app")
            .map(String::from)
            .ok_or_else(|| CommandError::failed(NO_APP_SPECIFIED))
    }
}

/// What an action produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Text to display, one or more lines.
    Text(String),
    /// Nothing to display.
    Silent,
}

impl Output {
    pub fn text(text: impl Into<String>) -> Self {
        Output::Text(text.into())
    }

    /// Joins display lines into one text output.
    pub fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines: Vec<String> = lines.into_iter().map(|l| l.as_ref().to_string()).collect();
        Output::Text(lines.join("\n"))
    }

    pub fn is_silent(&self) -> bool {
        matches!(self, Output::Silent)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Output::Text(text) => Some(text),
            Output::Silent => None,
        }
    }
}

/// The result type for actions.
pub type HandlerResult = Result<Output, CommandError>;

/// Action lookup and invocation by name.
pub trait Handler {
    /// Returns true if `action` names a callable action.
    fn responds_to(&self, action: &str) -> bool;

    /// Runs `action`. Unknown names fail with [`CommandError::InvalidCommand`].
    fn invoke(&mut self, action: &str) -> HandlerResult;
}

/// A handler type that declares a namespace of actions.
pub trait CommandSet: Handler + From<CommandContext> + 'static {
    /// Namespace the actions register under.
    const NAMESPACE: &'static str;

    /// Registers the namespace and every action into `registry`.
    fn register(registry: &mut Registry);
}
