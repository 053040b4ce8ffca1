pub mod config;
pub mod context;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod search;
pub mod settings;
pub mod vault;
