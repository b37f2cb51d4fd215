//! Error taxonomy for command dispatch.
//!
//! Every failure that can reach the dispatcher falls in one of four groups:
//!
//! | Variant | Raised by | Recovered as |
//! |---------|-----------|--------------|
//! | [`CommandError::InvalidCommand`] | parser, registry lookup, handler | fixed usage hint |
//! | [`CommandError::Failed`] | handlers (precondition/business rule) | its own message |
//! | [`CommandError::Api`] | the API client collaborator | per-category message |
//! | [`CommandError::Other`] | anything else | not recovered (fatal) |
//!
//! Nothing below the dispatcher recovers errors; they propagate with `?`
//! and are classified in exactly one place, [`Dispatcher::dispatch`].
//!
//! [`Dispatcher::dispatch`]: crate::Dispatcher::dispatch

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

/// Message shown for any unresolvable command.
pub const UNKNOWN_COMMAND: &str = "Unknown command. Run 'heroku help' for usage information.";

/// Message shown when the API rejects the stored credentials.
pub const AUTHENTICATION_FAILURE: &str = "Authentication failure";

/// Message shown when the API reports a missing resource.
pub const RESOURCE_NOT_FOUND: &str = "Resource not found.  (Did you mistype the app name?)";

/// Fallback for request failures whose body carries no error strings.
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";

/// Errors produced while resolving or running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The token could not be resolved, or the handler lacks the action.
    ///
    /// Carries the offending token for logging; the display text is fixed.
    #[error("Unknown command. Run 'heroku help' for usage information.")]
    InvalidCommand(String),

    /// A handler refused to run; the message is shown verbatim.
    #[error("{0}")]
    Failed(String),

    /// A failure reported by the API client.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Anything not covered above.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CommandError {
    /// Creates an [`CommandError::InvalidCommand`] for the given token.
    pub fn invalid(token: impl Into<String>) -> Self {
        CommandError::InvalidCommand(token.into())
    }

    /// Creates a [`CommandError::Failed`] with the given message.
    pub fn failed(message: impl Into<String>) -> Self {
        CommandError::Failed(message.into())
    }
}

/// Failures surfaced by the API client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The API rejected the credentials (HTTP 401).
    #[error("Authentication failure")]
    Unauthorized,

    /// The requested resource does not exist.
    #[error("Resource not found.  (Did you mistype the app name?)")]
    NotFound,

    /// Any other unsuccessful response.
    #[error("request failed with status {status}")]
    RequestFailed {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },
}

impl ApiError {
    /// The single line shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized => AUTHENTICATION_FAILURE.to_string(),
            ApiError::NotFound => RESOURCE_NOT_FOUND.to_string(),
            ApiError::RequestFailed { status, body } => extract_error(*status, body),
        }
    }
}

/// Builds the message for a failed request.
///
/// A 404 reads "Not found"; otherwise the body's error strings are joined,
/// falling back to [`INTERNAL_SERVER_ERROR`].
pub fn extract_error(status: u16, body: &str) -> String {
    if status == 404 {
        return "Not found".to_string();
    }

    match parse_error_xml(body) {
        Some(message) if !message.is_empty() => message,
        _ => INTERNAL_SERVER_ERROR.to_string(),
    }
}

/// Joins the text of every `<error>` directly under an `<errors>` element,
/// at any depth, with ` / `.
///
/// Returns `None` if the body is not well-formed.
pub fn parse_error_xml(body: &str) -> Option<String> {
    let mut reader = Reader::from_str(body);
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut current: Option<String> = None;
    let mut errors = Vec::new();

    loop {
        match reader.read_event().ok()? {
            Event::Start(start) => {
                let name = start.name().as_ref().to_vec();
                if current.is_none() && is_error_element(&name, &path) {
                    current = Some(String::new());
                }
                path.push(name);
            }
            Event::Empty(empty) => {
                if current.is_none() && is_error_element(empty.name().as_ref(), &path) {
                    errors.push(String::new());
                }
            }
            Event::Text(text) => {
                if let Some(message) = current.as_mut() {
                    message.push_str(&text.unescape().ok()?);
                }
            }
            Event::CData(data) => {
                if let Some(message) = current.as_mut() {
                    message.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::End(_) => {
                let name = path.pop();
                if current.is_some() && name.is_some_and(|n| is_error_element(&n, &path)) {
                    if let Some(message) = current.take() {
                        errors.push(message.trim().to_string());
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Some(errors.join(" / "))
}

fn is_error_element(name: &[u8], parents: &[Vec<u8>]) -> bool {
    name == b"error" && parents.last().is_some_and(|p| p.as_slice() == b"errors")
}

/// Errors raised while configuring a dispatcher.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SetupError {
    /// The default namespace is not among the declared modules.
    #[error("default namespace `{0}` has no command module")]
    UnknownDefaultNamespace(String),

    /// A preloaded namespace is not among the declared modules.
    #[error("cannot preload `{0}`: no such command module")]
    UnknownModule(String),

    /// Two modules were declared under the same namespace.
    #[error("duplicate command module: {0}")]
    DuplicateModule(String),
}
