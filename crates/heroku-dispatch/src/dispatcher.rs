//! Command dispatch.
//!
//! The [`Dispatcher`] is the single entry point the binary calls. For one
//! invocation it:
//!
//! 1. resolves aliases,
//! 2. parses the command token into a namespace and action,
//! 3. loads the namespace's module on first use,
//! 4. splits the remaining tokens into arguments and flags,
//! 5. builds the handler and invokes the action.
//!
//! Every failure that carries a classification ([`CommandError::InvalidCommand`],
//! [`CommandError::Failed`], [`CommandError::Api`]) is recovered here into a
//! fixed user-facing message and a [`RunResult::Failed`]. Anything else is
//! returned as an error for the caller to treat as fatal.
//!
//! ```rust
//! use heroku_dispatch::{
//!     CommandContext, CommandEntry, Dispatcher, Handler, HandlerRef, HandlerResult, Output,
//!     Registry, RunResult,
//! };
//!
//! struct Version;
//!
//! impl From<CommandContext> for Version {
//!     fn from(_: CommandContext) -> Self {
//!         Version
//!     }
//! }
//!
//! impl Handler for Version {
//!     fn responds_to(&self, action: &str) -> bool {
//!         action == "index"
//!     }
//!
//!     fn invoke(&mut self, _action: &str) -> HandlerResult {
//!         Ok(Output::text("heroku-rs/0.1.0"))
//!     }
//! }
//!
//! fn register(registry: &mut Registry) {
//!     registry.register_command(CommandEntry::new(
//!         "version",
//!         None,
//!         HandlerRef::of::<Version>("index"),
//!         "version\n\ndisplay version",
//!     ));
//! }
//!
//! let mut dispatcher = Dispatcher::builder()
//!     .default_namespace("version")
//!     .module("version", register)
//!     .build()
//!     .unwrap();
//!
//! let result = dispatcher.dispatch::<&str>("version", &[]).unwrap();
//! assert_eq!(result, RunResult::Handled("heroku-rs/0.1.0".into()));
//! ```

use std::io::Write;
use std::rc::Rc;

use crate::error::{ApiError, CommandError, SetupError, UNKNOWN_COMMAND};
use crate::handler::{CommandContext, CommandSet, Extensions, HandlerResult, Output};
use crate::loader::{ModuleLoader, RegisterFn};
use crate::options::split_arguments;
use crate::parser::{self, CommandName};
use crate::registry::Registry;
use crate::usage;

/// Token that triggers the built-in help.
pub const HELP_COMMAND: &str = "help";

/// Namespace used for unqualified actions unless configured otherwise.
pub const DEFAULT_NAMESPACE: &str = "app";

/// Classification of a recovered failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidCommand,
    CommandFailed,
    Unauthorized,
    NotFound,
    RequestFailed,
}

impl FailureKind {
    fn of_api(err: &ApiError) -> Self {
        match err {
            ApiError::Unauthorized => FailureKind::Unauthorized,
            ApiError::NotFound => FailureKind::NotFound,
            ApiError::RequestFailed { .. } => FailureKind::RequestFailed,
        }
    }
}

/// Outcome of one dispatched command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunResult {
    /// The action ran and produced text to display.
    Handled(String),
    /// The action ran and produced nothing.
    Silent,
    /// The command failed with a known classification.
    Failed { kind: FailureKind, message: String },
}

impl RunResult {
    pub fn is_success(&self) -> bool {
        !matches!(self, RunResult::Failed { .. })
    }

    /// Text to display, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            RunResult::Handled(text) => Some(text),
            RunResult::Silent => None,
            RunResult::Failed { message, .. } => Some(message),
        }
    }

    /// Process exit code: 0 on success, 1 for recovered failures.
    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

/// Recovers a classified command error into a [`RunResult`].
///
/// Unclassified errors pass through unchanged.
pub fn recover(err: CommandError) -> Result<RunResult, anyhow::Error> {
    let (kind, message) = match err {
        CommandError::InvalidCommand(token) => {
            tracing::debug!(token = %token, "unknown command");
            (FailureKind::InvalidCommand, UNKNOWN_COMMAND.to_string())
        }
        CommandError::Failed(message) => (FailureKind::CommandFailed, message),
        CommandError::Api(api) => (FailureKind::of_api(&api), api.user_message()),
        CommandError::Other(err) => return Err(err),
    };
    tracing::debug!(?kind, %message, "command failed");
    Ok(RunResult::Failed { kind, message })
}

/// Builder for [`Dispatcher`].
///
/// Module declarations are checked when [`build`](Self::build) runs, so
/// setup mistakes surface as one [`SetupError`].
pub struct DispatcherBuilder {
    default_namespace: String,
    modules: Vec<(String, RegisterFn)>,
    preload: Vec<String>,
    app_state: Extensions,
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self {
            default_namespace: DEFAULT_NAMESPACE.to_string(),
            modules: Vec::new(),
            preload: Vec::new(),
            app_state: Extensions::new(),
        }
    }
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Namespace used for tokens without an explicit namespace.
    pub fn default_namespace(mut self, namespace: &str) -> Self {
        self.default_namespace = namespace.to_string();
        self
    }

    /// Declares a module by namespace and registration function.
    pub fn module(mut self, namespace: &str, register: RegisterFn) -> Self {
        self.modules.push((namespace.to_string(), register));
        self
    }

    /// Declares the module of a [`CommandSet`].
    pub fn commands<T: CommandSet>(self) -> Self {
        self.module(T::NAMESPACE, T::register)
    }

    /// Loads a namespace's module at build time instead of on first use.
    pub fn preload(mut self, namespace: &str) -> Self {
        self.preload.push(namespace.to_string());
        self
    }

    /// Adds shared state available to every handler through
    /// [`CommandContext::app_state`].
    pub fn app_state<T: 'static>(mut self, value: T) -> Self {
        self.app_state.insert(value);
        self
    }

    pub fn build(self) -> Result<Dispatcher, SetupError> {
        let mut loader = ModuleLoader::new();
        for (namespace, register) in self.modules {
            loader.declare(&namespace, register)?;
        }

        if !loader.contains(&self.default_namespace) {
            return Err(SetupError::UnknownDefaultNamespace(self.default_namespace));
        }
        if let Some(missing) = self.preload.iter().find(|ns| !loader.contains(ns)) {
            return Err(SetupError::UnknownModule(missing.clone()));
        }

        let mut registry = Registry::new();
        for namespace in &self.preload {
            loader.load(namespace, &mut registry);
        }

        tracing::debug!(
            default_namespace = %self.default_namespace,
            modules = loader.available().count(),
            "dispatcher ready"
        );

        Ok(Dispatcher {
            registry,
            loader,
            default_namespace: self.default_namespace,
            app_state: Rc::new(self.app_state),
        })
    }
}

/// Resolves and runs commands.
///
/// A dispatcher is single-threaded: dispatch takes `&mut self` because it
/// may load modules into the registry.
#[derive(Debug)]
pub struct Dispatcher {
    registry: Registry,
    loader: ModuleLoader,
    default_namespace: String,
    app_state: Rc<Extensions>,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn loader(&self) -> &ModuleLoader {
        &self.loader
    }

    pub fn default_namespace(&self) -> &str {
        &self.default_namespace
    }

    pub fn app_state(&self) -> &Extensions {
        &self.app_state
    }

    /// Loads one namespace's module. See [`ModuleLoader::load`].
    pub fn load(&mut self, namespace: &str) -> bool {
        self.loader.load(namespace, &mut self.registry)
    }

    /// Loads every declared module.
    pub fn load_all(&mut self) {
        self.loader.load_all(&mut self.registry);
    }

    /// Parses a command token against the namespaces known so far,
    /// registered or declared.
    pub fn parse(&self, token: &str) -> Result<CommandName, CommandError> {
        parser::parse(
            token,
            |ns| self.registry.has_namespace(ns) || self.loader.contains(ns),
            &self.default_namespace,
        )
    }

    /// Resolves a token to a command name, loading its module.
    ///
    /// Aliases are checked before parsing. Aliases registered by the module
    /// that just loaded are checked once more if the parsed name is not a
    /// registered command.
    pub fn resolve(&mut self, token: &str) -> Result<CommandName, CommandError> {
        let aliased = self.registry.resolve_alias(token).map(String::from);
        let canonical = aliased.as_deref().unwrap_or(token);

        let name = self.parse(canonical)?;
        self.load(&name.namespace);
        if self.registry.lookup(&name.key()).is_some() || aliased.is_some() {
            return Ok(name);
        }

        match self.registry.resolve_alias(token).map(String::from) {
            Some(target) => {
                tracing::debug!(alias = token, target = %target, "resolved alias after load");
                let name = self.parse(&target)?;
                self.load(&name.namespace);
                Ok(name)
            }
            None => Ok(name),
        }
    }

    fn execute<S: AsRef<str>>(&mut self, token: &str, tokens: &[S]) -> HandlerResult {
        let name = self.resolve(token)?;
        let key = name.key();
        let entry = self
            .registry
            .lookup(&key)
            .ok_or_else(|| CommandError::invalid(token))?;

        let (args, options) = split_arguments(tokens, &entry.options);
        let ctx = CommandContext::new(key.as_str(), args, options, Rc::clone(&self.app_state));
        let mut handler = entry.handler.instantiate(ctx);

        let method = name.method();
        if !handler.responds_to(method) {
            tracing::debug!(command = %key, method, "handler does not respond to action");
            return Err(CommandError::invalid(token));
        }

        tracing::debug!(command = %key, handler = ?entry.handler, "invoking");
        handler.invoke(method)
    }

    /// Runs one command.
    ///
    /// `token` is the command token (`apps:create`, `list`, `help`), `tokens`
    /// are the words that followed it. Returns `Err` only for failures that
    /// carry no classification.
    pub fn dispatch<S: AsRef<str>>(
        &mut self,
        token: &str,
        tokens: &[S],
    ) -> Result<RunResult, anyhow::Error> {
        let _span = tracing::debug_span!("dispatch", command = token).entered();

        if token == HELP_COMMAND {
            let topic = tokens.first().map(|t| t.as_ref().to_string());
            return Ok(self.help(topic.as_deref()));
        }

        match self.execute(token, tokens) {
            Ok(Output::Text(text)) => Ok(RunResult::Handled(text)),
            Ok(Output::Silent) => Ok(RunResult::Silent),
            Err(err) => recover(err),
        }
    }

    /// Renders help: the full command index, or the help of one namespace or
    /// command.
    pub fn help(&mut self, topic: Option<&str>) -> RunResult {
        self.load_all();

        let Some(topic) = topic else {
            return RunResult::Handled(usage::render_index(
                &self.registry,
                &self.default_namespace,
            ));
        };

        if let Some(namespace) = self.registry.namespace(topic) {
            if self.registry.lookup(topic).is_none()
                || self.registry.commands_in(topic).count() > 1
            {
                return RunResult::Handled(usage::render_namespace(&self.registry, namespace));
            }
        }

        let canonical = self.registry.resolve_alias(topic).unwrap_or(topic);
        let entry = self.registry.lookup(canonical).or_else(|| {
            self.parse(canonical)
                .ok()
                .and_then(|name| self.registry.lookup(&name.key()))
        });

        match entry {
            Some(entry) => {
                let aliases: Vec<&str> = self.registry.aliases_of(&entry.command).collect();
                RunResult::Handled(usage::render_command(entry, &aliases))
            }
            None => RunResult::Failed {
                kind: FailureKind::InvalidCommand,
                message: UNKNOWN_COMMAND.to_string(),
            },
        }
    }

    /// Runs one command and writes its message to `out`.
    ///
    /// Returns the process exit code for recovered outcomes.
    pub fn run<S: AsRef<str>, W: Write>(
        &mut self,
        token: &str,
        tokens: &[S],
        out: &mut W,
    ) -> Result<u8, anyhow::Error> {
        let result = self.dispatch(token, tokens)?;
        if let Some(message) = result.message() {
            writeln!(out, "{}", message)?;
        }
        Ok(result.exit_code())
    }
}
