//! The heroku command-line client.
//!
//! This crate wires the shipped command namespaces into a
//! [`heroku_dispatch::Dispatcher`]. The binary in `main.rs` is a thin clap
//! front end over [`dispatcher`].
//!
//! ```rust,ignore
//! use heroku::{dispatcher, Settings};
//!
//! let mut dispatcher = dispatcher(Settings::from_env(), None)?;
//! let code = dispatcher.run("version", &Vec::<String>::new(), &mut std::io::stdout())?;
//! ```

pub mod client;
pub mod commands;
pub mod settings;

use heroku_dispatch::{CommandSet, Dispatcher, SetupError};

pub use client::{ApiClient, AppInfo, AppsApi, Collaborator};
pub use settings::Settings;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "HEROKU_LOG";

/// Log filter used when [`LOG_ENV`] is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Builds the dispatcher with every shipped namespace.
///
/// `app` is the default namespace. Both namespaces are preloaded so their
/// aliases (`apps`, `--version`) resolve on first use.
pub fn dispatcher(
    settings: Settings,
    client: Option<Box<dyn AppsApi>>,
) -> Result<Dispatcher, SetupError> {
    let mut builder = Dispatcher::builder()
        .default_namespace(commands::App::NAMESPACE)
        .commands::<commands::App>()
        .commands::<commands::Version>()
        .preload(commands::App::NAMESPACE)
        .preload(commands::Version::NAMESPACE)
        .app_state(settings);

    if let Some(client) = client {
        builder = builder.app_state(ApiClient(client));
    }

    builder.build()
}
