use miette::{Diagnostic, Result};
use thiserror::Error;

/// Everything that can go wrong while mounting or driving the calendar
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(
        code(calendar::environment),
        help("Set it in the shell or in a .env file next to the binary")
    )]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(calendar::config))]
    Config(String),

    #[error("Asset load error: {0}")]
    #[diagnostic(code(calendar::asset_load))]
    AssetLoad(String),

    #[error("Assignment service error: {0}")]
    #[diagnostic(code(calendar::assignment_service))]
    AssignmentService(String),

    #[error("Picklist service error: {0}")]
    #[diagnostic(code(calendar::picklist))]
    Picklist(String),

    #[error("Calendar widget error: {0}")]
    #[diagnostic(code(calendar::widget))]
    Widget(String),

    #[error("Filter '{0}' is not displayed on this page")]
    #[diagnostic(
        code(calendar::filter_hidden),
        help("Enable the filter in config/filters.toml")
    )]
    FilterHidden(String),

    #[error("Calendar is not ready: {0}")]
    #[diagnostic(
        code(calendar::not_ready),
        help("Filters can only be applied once the calendar assets have loaded")
    )]
    NotReady(String),

    #[error("Component error: {0}")]
    #[diagnostic(code(calendar::component))]
    Component(String),

    #[error(transparent)]
    #[diagnostic(code(calendar::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(calendar::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(calendar::other))]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type CalendarResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create asset load errors
pub fn asset_error(message: &str) -> Error {
    Error::AssetLoad(message.to_string())
}

/// Helper to create assignment service errors
pub fn service_error(message: &str) -> Error {
    Error::AssignmentService(message.to_string())
}

/// Helper to create picklist errors
pub fn picklist_error(message: &str) -> Error {
    Error::Picklist(message.to_string())
}

/// Helper to create widget errors
pub fn widget_error(message: &str) -> Error {
    Error::Widget(message.to_string())
}

/// Helper to create component errors
pub fn component_error(message: &str) -> Error {
    Error::Component(message.to_string())
}
