//! Paginated, filterable record browsing over a typed schema.

pub mod broker;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod list;
pub mod logging;
pub mod mvi;
pub mod schema;
pub mod source;

pub use error::{Error, Result};
