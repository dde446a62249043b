pub mod builder;
pub mod cli;
pub mod commands;
pub mod compute;
pub mod error;
pub mod field_state;
pub mod inference;
pub mod io_utils;
pub mod path;
pub mod reconcile;
pub mod sanitize;
pub mod schema;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

pub use crate::{
    compute::{ComputeOptions, ComputedSchema, ComputedSchemaStatus, compute_schema},
    error::SchemaError,
    reconcile::parse,
    schema::{DataType, FieldType, Schema, SchemaItem},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("jsonform_schema", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Infer(args) => commands::infer(&args),
        Commands::Retype(args) => commands::retype(&args),
        Commands::SourcePath(args) => commands::source_path(&args),
        Commands::FieldState(args) => commands::field_state(&args),
    }
}
