pub mod components;
pub mod config;
pub mod error;
pub mod startup;
pub mod shutdown;
