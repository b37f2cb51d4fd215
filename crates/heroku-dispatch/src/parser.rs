//! Command token parsing.
//!
//! A command token is either `namespace:action` or a single bare word. Bare
//! words naming a known namespace select that namespace's default action;
//! any other bare word is an action of the default namespace, so `list`
//! means `app:list` when `app` is the default.

use crate::error::CommandError;
use crate::registry::command_key;

/// Action name used for a namespace's default action.
pub const INDEX_ACTION: &str = "index";

/// A resolved `(namespace, action)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandName {
    pub namespace: String,
    /// `None` selects the default (index) action.
    pub action: Option<String>,
}

impl CommandName {
    pub fn new(namespace: impl Into<String>, action: Option<&str>) -> Self {
        Self {
            namespace: namespace.into(),
            action: action.filter(|a| *a != INDEX_ACTION).map(String::from),
        }
    }

    /// Canonical registry key.
    pub fn key(&self) -> String {
        command_key(&self.namespace, self.action.as_deref())
    }

    /// Name of the handler method implementing the action.
    pub fn method(&self) -> &str {
        self.action.as_deref().unwrap_or(INDEX_ACTION)
    }
}

/// Parses a command token.
///
/// `is_namespace` answers whether a name is a known namespace, loaded or
/// not. Fails with [`CommandError::InvalidCommand`] on empty segments, more
/// than one `:`, or an unknown namespace in the `ns:action` form.
pub fn parse<F>(
    token: &str,
    is_namespace: F,
    default_namespace: &str,
) -> Result<CommandName, CommandError>
where
    F: Fn(&str) -> bool,
{
    let parts: Vec<&str> = token.split(':').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(CommandError::invalid(token));
    }

    match parts.as_slice() {
        &[single] if is_namespace(single) => Ok(CommandName::new(single, None)),
        &[single] => Ok(CommandName::new(default_namespace, Some(single))),
        &[namespace, action] if is_namespace(namespace) => {
            Ok(CommandName::new(namespace, Some(action)))
        }
        _ => Err(CommandError::invalid(token)),
    }
}
