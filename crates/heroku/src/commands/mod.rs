//! Command namespaces shipped with the client.

mod app;
mod version;

pub use app::{app_urls, format_bytes, App};
pub use version::{Version, VERSION};
