use heroku_dispatch::{commands, CommandContext, HandlerResult, Output};

/// Client identification string.
pub const VERSION: &str = concat!("heroku-rs/", env!("CARGO_PKG_VERSION"));

pub struct Version;

impl From<CommandContext> for Version {
    fn from(_: CommandContext) -> Self {
        Version
    }
}

/// display the client version
#[commands]
impl Version {
    /// version
    ///
    /// show the client version
    #[alias("--version")]
    pub fn index(&self) -> HandlerResult {
        Ok(Output::text(VERSION))
    }
}
