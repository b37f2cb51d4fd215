//! Command registration and dispatch for the heroku CLI.
//!
//! `heroku-dispatch` turns a command token such as `apps:create` into a call
//! on a handler type. Commands are grouped in namespaces, documented by
//! their own doc comments, registered when their module first loads, and
//! resolved through one dispatcher that also owns error recovery.
//!
//! # Features
//!
//! - **Self-documenting commands**: banner, summary and flags are parsed from
//!   each action's doc comment ([`HelpBlock`])
//! - **Lazy loading**: a namespace's commands register on first use
//!   ([`ModuleLoader`])
//! - **Flexible tokens**: `ns:action`, bare namespaces (default action) and
//!   bare actions of the default namespace ([`parse`])
//! - **Single recovery boundary**: classified failures become fixed messages,
//!   everything else is fatal ([`Dispatcher::dispatch`])
//!
//! # Defining commands
//!
//! ```rust,ignore
//! use heroku_dispatch::{commands, CommandContext, Dispatcher, HandlerResult, Output};
//!
//! pub struct Version {
//!     ctx: CommandContext,
//! }
//!
//! impl From<CommandContext> for Version {
//!     fn from(ctx: CommandContext) -> Self {
//!         Self { ctx }
//!     }
//! }
//!
//! #[commands]
//! impl Version {
//!     /// version
//!     ///
//!     /// display version
//!     pub fn index(&self) -> HandlerResult {
//!         Ok(Output::text("heroku-rs/0.1.0"))
//!     }
//! }
//!
//! let mut dispatcher = Dispatcher::builder()
//!     .default_namespace("version")
//!     .commands::<Version>()
//!     .build()?;
//!
//! let code = dispatcher.run("version", &args, &mut std::io::stdout())?;
//! ```

mod dispatcher;
mod error;
mod handler;
mod help;
mod loader;
mod options;
mod parser;
mod registry;
mod usage;

pub use dispatcher::{
    recover, Dispatcher, DispatcherBuilder, FailureKind, RunResult, DEFAULT_NAMESPACE,
    HELP_COMMAND,
};

pub use error::{
    extract_error, parse_error_xml, ApiError, CommandError, SetupError, AUTHENTICATION_FAILURE,
    INTERNAL_SERVER_ERROR, RESOURCE_NOT_FOUND, UNKNOWN_COMMAND,
};

pub use handler::{
    CommandContext, CommandSet, Extensions, Handler, HandlerResult, Output, NO_APP_SPECIFIED,
};

pub use help::{is_option_line, HelpBlock, OptionSpec, COMMENT_MARKER};

pub use loader::{ModuleLoader, RegisterFn};

pub use options::{split_arguments, OptionValue, Options};

pub use parser::{parse, CommandName, INDEX_ACTION};

pub use registry::{command_key, CommandEntry, HandlerFactory, HandlerRef, Namespace, Registry};

pub use usage::{render_command, render_index, render_namespace, PROGRAM};

// Re-export the attribute macro so users depend on one crate.
pub use heroku_macros::commands;
