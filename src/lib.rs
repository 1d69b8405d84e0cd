pub mod aggregate;
mod api;
pub mod args;
pub mod commands;
mod config;
mod error;
pub mod filter;
pub mod model;
mod utils;
pub mod view;


pub use api::Mode;
pub use config::Config;
pub use error::{Error, ErrorType, Result};
