pub mod config_service;
pub mod http_backend;
pub mod paths;
pub mod settings_store;
pub mod storage;

pub use config_service::{AppConfig, ConfigService};
pub use http_backend::HttpBackend;
pub use paths::DevcmdPaths;
pub use settings_store::FileSettingsStore;
