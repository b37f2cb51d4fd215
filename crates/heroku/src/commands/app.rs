//! The `app` namespace: listing, creating and managing apps.
//!
//! This is the default namespace, so its actions are invoked without a
//! prefix (`heroku create`, `heroku info --app myapp`).

use heroku_dispatch::{commands, CommandContext, CommandError, HandlerResult, Output};

use crate::client::{ApiClient, AppInfo, AppsApi};
use crate::settings::Settings;

const KB: u64 = 1024;
const MB: u64 = 1024 * KB;
const GB: u64 = 1024 * MB;

/// Formats a byte count with a `k`, `M` or `G` suffix. Zero has no size.
pub fn format_bytes(amount: u64) -> Option<String> {
    match amount {
        0 => None,
        n if n < KB => Some(n.to_string()),
        n if n < MB => Some(format!("{}k", n / KB)),
        n if n < GB => Some(format!("{}M", n / MB)),
        n => Some(format!("{}G", n / GB)),
    }
}

/// Web URL and git remote of an app.
pub fn app_urls(name: &str, host: &str) -> String {
    format!("http://{name}.{host}/ | git@{host}:{name}.git")
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

fn info_lines(info: &AppInfo, host: &str) -> Vec<String> {
    let mut lines = vec![
        format!("=== {}", info.name),
        format!("Web URL:        http://{}.{}/", info.name, host),
    ];
    if let Some(domain) = &info.domain_name {
        lines.push(format!("Domain name:    http://{}/", domain));
    }
    lines.push(format!("Git Repo:       git@{}:{}.git", host, info.name));
    lines.push(format!(
        "Mode:           {}",
        if info.production { "production" } else { "development" }
    ));
    if let Some(size) = info.code_size.and_then(format_bytes) {
        lines.push(format!("Code size:      {}", size));
    }
    if let Some(size) = info.data_size.and_then(format_bytes) {
        lines.push(format!("Data size:      {}", size));
    }
    lines.push(format!("Public:         {}", info.share_public));

    let lead = "Collaborators:";
    for (i, collaborator) in info.collaborators.iter().enumerate() {
        let label = if i == 0 {
            lead.to_string()
        } else {
            " ".repeat(lead.len())
        };
        lines.push(format!(
            "{}  {} ({})",
            label, collaborator.email, collaborator.access
        ));
    }
    lines
}

pub struct App {
    ctx: CommandContext,
}

impl From<CommandContext> for App {
    fn from(ctx: CommandContext) -> Self {
        Self { ctx }
    }
}

impl App {
    fn api(&self) -> Result<&dyn AppsApi, CommandError> {
        match self.ctx.app_state.get::<ApiClient>() {
            Some(client) => Ok(client.api()),
            None => {
                let settings = self.ctx.app_state.get_required::<Settings>()?;
                Err(CommandError::failed(format!(
                    "No API client configured for {}.",
                    settings.host
                )))
            }
        }
    }
}

/// manage apps (create, destroy)
#[commands(namespace = "app")]
impl App {
    /// list
    ///
    /// list your apps
    #[alias("apps")]
    pub fn list(&self) -> HandlerResult {
        let apps = self.api()?.list()?;
        if apps.is_empty() {
            Ok(Output::text("You have no apps."))
        } else {
            Ok(Output::lines(apps))
        }
    }

    /// create [NAME]
    ///
    /// create a new app
    pub fn create(&mut self) -> HandlerResult {
        let name = self
            .ctx
            .shift_arg()
            .map(|n| normalize_name(&n))
            .filter(|n| !n.is_empty());
        let api = self.api()?;
        let name = api.create(name.as_deref())?;
        Ok(Output::text(format!("Created {}", app_urls(&name, api.host()))))
    }

    /// rename NEWNAME
    ///
    /// rename the app
    ///
    /// -a, --app APP  # the app to rename
    pub fn rename(&mut self) -> HandlerResult {
        let name = self.ctx.app()?;
        let new_name = self
            .ctx
            .shift_arg()
            .map(|n| normalize_name(&n))
            .unwrap_or_default();
        if new_name.is_empty() {
            return Err(CommandError::failed("Invalid name."));
        }

        let api = self.api()?;
        api.rename(&name, &new_name)?;
        Ok(Output::lines([
            app_urls(&new_name, api.host()),
            "Don't forget to update your Git remotes on any local checkouts.".to_string(),
        ]))
    }

    /// info
    ///
    /// show detailed app information
    ///
    /// -a, --app APP  # the app to show
    pub fn info(&self) -> HandlerResult {
        let name = self.ctx.app()?;
        let api = self.api()?;
        let info = api.info(&name)?;
        Ok(Output::lines(info_lines(&info, api.host())))
    }

    /// destroy
    ///
    /// permanently destroy an app
    ///
    /// -a, --app APP  # the app to destroy
    pub fn destroy(&self) -> HandlerResult {
        match self.ctx.option("app") {
            Some(name) => {
                self.api()?.destroy(name)?;
                Ok(Output::text(format!("Destroyed {}", name)))
            }
            None => Ok(Output::text(
                "Set the app you want to destroy adding --app <app name> to this command",
            )),
        }
    }
}
