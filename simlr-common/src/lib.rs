//! # simlr Common Library
//!
//! Shared code for the simlr crates:
//! - Error type and result alias
//! - Bootstrap TOML configuration and defaults
//! - Last.fm credential resolution

pub mod config;
pub mod error;

pub use error::{Error, Result};
