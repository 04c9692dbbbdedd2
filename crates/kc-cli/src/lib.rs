//! # kc-cli
//!
//! Command-line front end for `kc-admin-client`:
//! - User listing with role enrichment, creation and password resets
//! - Declarative realm role assignment (`user set-roles`)
//! - Realm role catalog
//! - Audit event listing

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::future_not_send)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod session;

pub use cli::Cli;
pub use config::CliConfig;
pub use error::{CliError, CliResult};
