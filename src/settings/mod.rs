//! User settings and their persistence.

mod config;
mod store;

pub use config::{Settings, Theme};
pub use store::SettingsStore;
