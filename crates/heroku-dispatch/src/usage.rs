//! Rendering of the built-in `help` command.
//!
//! Everything is derived from the registry: banners, summaries and option
//! tables come from each action's own documentation.

use console::style;

use crate::help::OptionSpec;
use crate::registry::{CommandEntry, Namespace, Registry};

/// Minimum width of the banner column.
pub(crate) const NAME_COLUMN_WIDTH: usize = 14;

/// Program name shown in usage lines.
pub const PROGRAM: &str = "heroku";

fn banner_width<'a>(entries: impl Iterator<Item = &'a CommandEntry>) -> usize {
    entries
        .map(|e| e.banner.len())
        .max()
        .unwrap_or(0)
        .max(NAME_COLUMN_WIDTH)
}

fn command_line(entry: &CommandEntry, width: usize) -> String {
    match &entry.summary {
        Some(summary) => format!("  {:<width$}  # {}", entry.banner, summary, width = width),
        None => format!("  {}", entry.banner),
    }
}

fn flag_column(spec: &OptionSpec) -> String {
    let short = spec
        .short
        .map(|s| format!("-{}, ", s))
        .unwrap_or_else(|| "    ".to_string());
    if spec.long.chars().count() == 1 && spec.short.is_some() {
        short.trim_end_matches([',', ' ']).to_string()
    } else {
        format!("{}--{}", short, spec.long)
    }
}

fn namespace_block(registry: &Registry, namespace: &Namespace, width: usize) -> Vec<String> {
    let mut lines = vec![style(format!("=== {}", namespace.name)).bold().to_string()];
    if let Some(description) = &namespace.description {
        lines.push(description.clone());
    }
    lines.push(String::new());
    lines.extend(
        registry
            .commands_in(&namespace.name)
            .map(|entry| command_line(entry, width)),
    );
    lines
}

/// Lists every namespace and command.
pub fn render_index(registry: &Registry, default_namespace: &str) -> String {
    let width = banner_width(registry.commands());
    let mut lines = vec![
        format!(
            "{} {} COMMAND [--app APP] [command-specific-options]",
            style("Usage:").bold(),
            PROGRAM
        ),
        String::new(),
        format!(
            "Type \"{} help COMMAND\" for details on a command.",
            PROGRAM
        ),
    ];

    // Default namespace first: its commands are the unqualified ones.
    let namespaces = registry
        .namespace(default_namespace)
        .into_iter()
        .chain(registry.namespaces().filter(|ns| ns.name != default_namespace));

    for namespace in namespaces {
        lines.push(String::new());
        lines.extend(namespace_block(registry, namespace, width));
    }

    lines.join("\n")
}

/// Lists the commands of one namespace.
pub fn render_namespace(registry: &Registry, namespace: &Namespace) -> String {
    let width = banner_width(registry.commands_in(&namespace.name));
    namespace_block(registry, namespace, width).join("\n")
}

/// Full help for one command.
pub fn render_command(entry: &CommandEntry, aliases: &[&str]) -> String {
    let mut lines = vec![format!(
        "{} {} {}",
        style("Usage:").bold(),
        PROGRAM,
        entry.banner
    )];

    if !entry.description.is_empty() {
        lines.push(String::new());
        lines.extend(entry.description.lines().map(|l| format!(" {}", l).trim_end().to_string()));
    }

    if !entry.options.is_empty() {
        let flags: Vec<(String, &OptionSpec)> = entry
            .options
            .values()
            .map(|spec| (flag_column(spec), spec))
            .collect();
        let width = flags.iter().map(|(f, _)| f.len()).max().unwrap_or(0);

        lines.push(String::new());
        for (flag, spec) in flags {
            lines.push(format!(" {:<width$}  # {}", flag, spec.description, width = width));
        }
    }

    if !aliases.is_empty() {
        lines.push(String::new());
        lines.push(format!("Aliases: {}", aliases.join(", ")));
    }

    lines.join("\n")
}
