//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, ClarificationConfig, DocumentQaConfig, DraftingConfig, LogFormat, LoggingConfig,
    SearchConfig,
};
