//! The API collaborator used by the `app` commands.
//!
//! Commands only see the [`AppsApi`] trait. No transport ships with this
//! crate: a host embedding the dispatcher hands one in through
//! [`ApiClient`], and tests use in-memory fakes.

use heroku_dispatch::ApiError;

/// A user with access to an app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collaborator {
    pub email: String,
    /// Access level, e.g. `edit` or `view`.
    pub access: String,
}

/// Attributes returned by an app lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppInfo {
    pub name: String,
    pub domain_name: Option<String>,
    pub production: bool,
    /// Repository size in bytes.
    pub code_size: Option<u64>,
    /// Database size in bytes.
    pub data_size: Option<u64>,
    pub share_public: bool,
    pub collaborators: Vec<Collaborator>,
}

/// App management calls of the platform API.
pub trait AppsApi {
    /// Host the client talks to.
    fn host(&self) -> &str;

    /// Names of the user's apps.
    fn list(&self) -> Result<Vec<String>, ApiError>;

    /// Creates an app, returning its name (generated when `name` is `None`).
    fn create(&self, name: Option<&str>) -> Result<String, ApiError>;

    fn rename(&self, name: &str, new_name: &str) -> Result<(), ApiError>;

    fn info(&self, name: &str) -> Result<AppInfo, ApiError>;

    fn destroy(&self, name: &str) -> Result<(), ApiError>;
}

/// App-state slot holding the API client.
pub struct ApiClient(pub Box<dyn AppsApi>);

impl ApiClient {
    pub fn new(api: impl AppsApi + 'static) -> Self {
        Self(Box::new(api))
    }

    pub fn api(&self) -> &dyn AppsApi {
        self.0.as_ref()
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ApiClient").field(&self.0.host()).finish()
    }
}
