//! Splitting command-line tokens into positional arguments and flags.
//!
//! Commands declare their flags in their help text, so the splitter is
//! driven by the resolved command's option table:
//!
//! - `--name=value` always carries its value inline.
//! - `--name` consumes the next token only if the documented option has a
//!   value placeholder (`--remote REMOTE`). Undocumented flags consume the
//!   next token when it does not look like a flag.
//! - `-x` is mapped to the documented option with that short flag.
//! - `--` ends flag parsing.

use std::collections::BTreeMap;

use crate::help::OptionSpec;

/// A flag as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// Given bare, e.g. `--raw`.
    Flag,
    /// Given with a value, e.g. `--app myapp`.
    Value(String),
}

/// Flags of one invocation, keyed by long-flag name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    values: BTreeMap<String, OptionValue>,
}

impl Options {
    pub fn insert(&mut self, name: &str, value: OptionValue) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    /// The flag's value, if it was given with one.
    pub fn value(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(OptionValue::Value(value)) => Some(value),
            _ => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn looks_like_flag(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-')
}

/// Splits `tokens` into positional arguments and flags.
pub fn split_arguments<S: AsRef<str>>(
    tokens: &[S],
    specs: &BTreeMap<String, OptionSpec>,
) -> (Vec<String>, Options) {
    let mut args = Vec::new();
    let mut options = Options::default();
    let mut tokens = tokens.iter().map(AsRef::as_ref).peekable();

    while let Some(token) = tokens.next() {
        if token == "--" {
            args.extend(tokens.by_ref().map(String::from));
            break;
        }

        let name = if let Some(long) = token.strip_prefix("--") {
            if let Some((name, value)) = long.split_once('=') {
                options.insert(name, OptionValue::Value(value.to_string()));
                continue;
            }
            long.to_string()
        } else if looks_like_flag(token) && token.chars().count() == 2 {
            let short = token.chars().nth(1).unwrap_or_default();
            specs
                .values()
                .find(|spec| spec.short == Some(short))
                .map(|spec| spec.name().to_string())
                .unwrap_or_else(|| short.to_string())
        } else {
            args.push(token.to_string());
            continue;
        };

        let takes_value = match specs.get(&name) {
            Some(spec) => spec.takes_value(),
            None => tokens.peek().is_some_and(|next| !looks_like_flag(next)),
        };

        let value = if takes_value {
            tokens.next().map(|v| OptionValue::Value(v.to_string()))
        } else {
            None
        };
        options.insert(&name, value.unwrap_or(OptionValue::Flag));
    }

    (args, options)
}
