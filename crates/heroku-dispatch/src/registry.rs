//! The process-wide command table.
//!
//! A [`Registry`] maps namespace names to [`Namespace`] metadata and command
//! keys (`namespace` or `namespace:action`) to [`CommandEntry`] values. It is
//! populated while command modules load and read for the rest of the
//! process.
//!
//! # Overwrites
//!
//! Registering a command under a key that already exists replaces the
//! previous entry: the last registration wins. Namespaces behave the other
//! way around: the first non-empty description is kept.

use std::collections::BTreeMap;
use std::fmt;

use crate::handler::{CommandContext, Handler};
use crate::help::{HelpBlock, OptionSpec};

/// Builds a handler instance bound to one invocation.
pub type HandlerFactory = fn(CommandContext) -> Box<dyn Handler>;

/// Non-owning reference to the code implementing an action.
#[derive(Clone, Copy)]
pub struct HandlerRef {
    /// Type name of the handler.
    pub handler: &'static str,
    /// Method implementing the action (`index` for the default action).
    pub method: &'static str,
    factory: HandlerFactory,
}

fn build<T>(ctx: CommandContext) -> Box<dyn Handler>
where
    T: Handler + From<CommandContext> + 'static,
{
    Box::new(T::from(ctx))
}

impl HandlerRef {
    /// Reference to `method` on handler type `T`.
    pub fn of<T>(method: &'static str) -> Self
    where
        T: Handler + From<CommandContext> + 'static,
    {
        Self {
            handler: std::any::type_name::<T>(),
            method,
            factory: build::<T>,
        }
    }

    /// Constructs the handler for one invocation.
    pub fn instantiate(&self, ctx: CommandContext) -> Box<dyn Handler> {
        (self.factory)(ctx)
    }
}

impl PartialEq for HandlerRef {
    fn eq(&self, other: &Self) -> bool {
        self.handler == other.handler && self.method == other.method
    }
}

impl Eq for HandlerRef {}

impl fmt::Debug for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.handler, self.method)
    }
}

/// A group of related actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    pub name: String,
    pub description: Option<String>,
}

/// Computes the command key for a namespace and optional action.
pub fn command_key(namespace: &str, action: Option<&str>) -> String {
    match action {
        Some(action) => format!("{}:{}", namespace, action),
        None => namespace.to_string(),
    }
}

/// Everything known about one registered command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEntry {
    pub namespace: String,
    /// `None` for the namespace's default (index) action.
    pub action: Option<String>,
    /// Canonical key: `namespace` or `namespace:action`.
    pub command: String,
    pub handler: HandlerRef,
    /// One-line usage; the command key when undocumented.
    pub banner: String,
    /// Full help text as written.
    pub help: String,
    pub summary: Option<String>,
    pub description: String,
    /// Documented flags keyed by long-flag name.
    pub options: BTreeMap<String, OptionSpec>,
}

impl CommandEntry {
    /// Builds an entry, deriving banner, summary, description and options
    /// from the action's help text.
    pub fn new(namespace: &str, action: Option<&str>, handler: HandlerRef, help: &str) -> Self {
        Self::from_help(namespace, action, handler, &HelpBlock::parse(help))
    }

    /// Builds an entry from an already-extracted help block.
    pub fn from_help(
        namespace: &str,
        action: Option<&str>,
        handler: HandlerRef,
        help: &HelpBlock,
    ) -> Self {
        let command = command_key(namespace, action);
        Self {
            namespace: namespace.to_string(),
            action: action.map(String::from),
            banner: help.banner().map(String::from).unwrap_or_else(|| command.clone()),
            help: help.text().to_string(),
            summary: help.summary(),
            description: help.description(),
            options: help.options(),
            handler,
            command,
        }
    }

    /// Finds the documented option for a single-letter flag.
    pub fn option_for_short(&self, short: char) -> Option<&OptionSpec> {
        self.options.values().find(|spec| spec.short == Some(short))
    }
}

/// The command table.
#[derive(Debug, Default)]
pub struct Registry {
    namespaces: BTreeMap<String, Namespace>,
    commands: BTreeMap<String, CommandEntry>,
    aliases: BTreeMap<String, String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a namespace, or attaches a description to an existing one
    /// that has none.
    pub fn register_namespace(&mut self, name: &str, description: Option<&str>) {
        let description = description.map(str::trim).filter(|d| !d.is_empty());
        match self.namespaces.get_mut(name) {
            Some(existing) => {
                if existing.description.is_none() {
                    existing.description = description.map(String::from);
                }
            }
            None => {
                self.namespaces.insert(
                    name.to_string(),
                    Namespace {
                        name: name.to_string(),
                        description: description.map(String::from),
                    },
                );
            }
        }
    }

    /// Registers a command, replacing any entry under the same key.
    ///
    /// The owning namespace is created if needed. Returns the replaced entry.
    pub fn register_command(&mut self, entry: CommandEntry) -> Option<CommandEntry> {
        self.register_namespace(&entry.namespace, None);
        let previous = self.commands.insert(entry.command.clone(), entry);
        if let Some(previous) = &previous {
            tracing::debug!(command = %previous.command, "command registration replaced");
        }
        previous
    }

    /// Points `alias` at the command registered (or to be registered) under
    /// `target`.
    pub fn alias(&mut self, alias: &str, target: &str) {
        self.aliases.insert(alias.to_string(), target.to_string());
    }

    /// Canonical key for an alias.
    pub fn resolve_alias(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }

    pub fn lookup(&self, command: &str) -> Option<&CommandEntry> {
        self.commands.get(command)
    }

    pub fn namespace(&self, name: &str) -> Option<&Namespace> {
        self.namespaces.get(name)
    }

    pub fn has_namespace(&self, name: &str) -> bool {
        self.namespaces.contains_key(name)
    }

    /// All namespaces, ordered by name.
    pub fn namespaces(&self) -> impl Iterator<Item = &Namespace> {
        self.namespaces.values()
    }

    /// All commands, ordered by key.
    pub fn commands(&self) -> impl Iterator<Item = &CommandEntry> {
        self.commands.values()
    }

    /// Commands of one namespace, default action first.
    pub fn commands_in<'a>(&'a self, namespace: &'a str) -> impl Iterator<Item = &'a CommandEntry> {
        self.commands
            .values()
            .filter(move |entry| entry.namespace == namespace)
    }

    /// Aliases pointing at `command`.
    pub fn aliases_of<'a>(&'a self, command: &'a str) -> impl Iterator<Item = &'a str> {
        self.aliases
            .iter()
            .filter(move |(_, target)| target.as_str() == command)
            .map(|(alias, _)| alias.as_str())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{HandlerResult, Output};

    struct First(CommandContext);
    struct Second(CommandContext);

    impl From<CommandContext> for First {
        fn from(ctx: CommandContext) -> Self {
            First(ctx)
        }
    }

    impl From<CommandContext> for Second {
        fn from(ctx: CommandContext) -> Self {
            Second(ctx)
        }
    }

    impl Handler for First {
        fn responds_to(&self, action: &str) -> bool {
            action == "create"
        }

        fn invoke(&mut self, _action: &str) -> HandlerResult {
            Ok(Output::text(format!("first {}", self.0.command)))
        }
    }

    impl Handler for Second {
        fn responds_to(&self, action: &str) -> bool {
            action == "create"
        }

        fn invoke(&mut self, _action: &str) -> HandlerResult {
            Ok(Output::text(format!("second {}", self.0.command)))
        }
    }

    #[test]
    fn test_namespace_description_attached_later() {
        let mut registry = Registry::new();
        registry.register_namespace("apps", None);
        registry.register_namespace("apps", Some("desc"));
        assert_eq!(
            registry.namespace("apps").unwrap().description.as_deref(),
            Some("desc")
        );
    }

    #[test]
    fn test_namespace_first_description_wins() {
        let mut registry = Registry::new();
        registry.register_namespace("apps", Some("desc1"));
        registry.register_namespace("apps", Some("desc2"));
        assert_eq!(
            registry.namespace("apps").unwrap().description.as_deref(),
            Some("desc1")
        );
    }

    #[test]
    fn test_blank_description_counts_as_absent() {
        let mut registry = Registry::new();
        registry.register_namespace("apps", Some("  "));
        registry.register_namespace("apps", Some("manage apps"));
        assert_eq!(
            registry.namespace("apps").unwrap().description.as_deref(),
            Some("manage apps")
        );
    }

    #[test]
    fn test_register_command_last_wins() {
        let mut registry = Registry::new();
        let first =
            CommandEntry::new("apps", Some("create"), HandlerRef::of::<First>("create"), "");
        let second =
            CommandEntry::new("apps", Some("create"), HandlerRef::of::<Second>("create"), "");

        assert!(registry.register_command(first).is_none());
        let replaced = registry.register_command(second).unwrap();

        assert_eq!(replaced.handler, HandlerRef::of::<First>("create"));
        let entry = registry.lookup("apps:create").unwrap();
        assert_eq!(entry.handler, HandlerRef::of::<Second>("create"));
        assert_ne!(entry.handler, HandlerRef::of::<First>("create"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_command_creates_namespace() {
        let mut registry = Registry::new();
        registry.register_command(CommandEntry::new(
            "ssl",
            None,
            HandlerRef::of::<First>("index"),
            "",
        ));
        assert!(registry.has_namespace("ssl"));
        assert_eq!(registry.namespace("ssl").unwrap().description, None);
        assert!(registry.lookup("ssl").is_some());
    }

    #[test]
    fn test_entry_from_documented_help() {
        let entry = CommandEntry::new(
            "apps",
            Some("create"),
            HandlerRef::of::<First>("create"),
            concat!(
                " apps:create [NAME]\n\n create a new app\n\n",
                " -b, --buildpack BUILDPACK  # a buildpack url\n",
            ),
        );
        assert_eq!(entry.command, "apps:create");
        assert_eq!(entry.banner, "apps:create [NAME]");
        assert_eq!(entry.summary.as_deref(), Some("create a new app"));
        assert_eq!(entry.options["buildpack"].short, Some('b'));
        assert_eq!(entry.option_for_short('b').unwrap().name(), "buildpack");
        assert!(entry.option_for_short('x').is_none());
    }

    #[test]
    fn test_entry_without_help_falls_back_to_command() {
        let entry = CommandEntry::new("apps", Some("info"), HandlerRef::of::<First>("info"), "");
        assert_eq!(entry.banner, "apps:info");
        assert_eq!(entry.summary, None);
        assert_eq!(entry.description, "");
        assert!(entry.options.is_empty());

        let index = CommandEntry::new("apps", None, HandlerRef::of::<First>("index"), "  \n ");
        assert_eq!(index.command, "apps");
        assert_eq!(index.banner, "apps");
    }

    #[test]
    fn test_aliases() {
        let mut registry = Registry::new();
        registry.alias("list", "apps");
        registry.alias("ls", "apps");
        assert_eq!(registry.resolve_alias("list"), Some("apps"));
        assert_eq!(registry.resolve_alias("apps"), None);
        let aliases: Vec<_> = registry.aliases_of("apps").collect();
        assert_eq!(aliases, vec!["list", "ls"]);
    }

    #[test]
    fn test_commands_in_namespace() {
        let mut registry = Registry::new();
        for (ns, action) in [("apps", None), ("apps", Some("create")), ("ssl", None)] {
            registry.register_command(CommandEntry::new(
                ns,
                action,
                HandlerRef::of::<First>("x"),
                "",
            ));
        }
        let keys: Vec<_> = registry.commands_in("apps").map(|e| e.command.as_str()).collect();
        assert_eq!(keys, vec!["apps", "apps:create"]);
        let names: Vec<_> = registry.namespaces().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["apps", "ssl"]);
    }

    #[test]
    fn test_handler_ref_instantiates_handler() {
        let handler_ref = HandlerRef::of::<Second>("create");
        let mut handler = handler_ref.instantiate(CommandContext::for_command("apps:create"));
        assert!(handler.responds_to("create"));
        let output = handler.invoke("create").unwrap();
        assert_eq!(output.as_text(), Some("second apps:create"));
    }
}
