pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::config::{cli::CliArgs, AppConfig};
pub use crate::core::etl::EtlEngine;
pub use crate::domain::model::{ExportedFile, Field, QueryWindow, Record, RunSummary, SlowLogReport};
pub use crate::utils::error::{EtlError, Result};
