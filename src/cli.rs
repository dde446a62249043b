use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{
    compute::{DEFAULT_FIELD_LIMIT, DEFAULT_WIDGET_NAME},
    schema::FieldType,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Infer and reconcile JSON form schemas", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Infer a form schema from a JSON sample, reconciling with a previous schema
    Infer(InferArgs),
    /// Change the field kind of one schema item
    Retype(RetypeArgs),
    /// Print the source-data path a schema item was inferred from
    SourcePath(SourcePathArgs),
    /// Project internal field state onto a schema
    FieldState(FieldStateArgs),
}

#[derive(Debug, Args)]
pub struct InferArgs {
    /// JSON (or YAML) sample data; `-` reads stdin
    #[arg(short, long)]
    pub input: PathBuf,
    /// Previously generated schema to reconcile against
    #[arg(short, long)]
    pub schema: Option<PathBuf>,
    /// Destination schema file (.json, .yaml); stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Widget name used in default-value bindings
    #[arg(long, default_value = DEFAULT_WIDGET_NAME)]
    pub widget_name: String,
    /// Maximum number of fields the sample may produce
    #[arg(long, default_value_t = DEFAULT_FIELD_LIMIT)]
    pub field_limit: usize,
    /// Also print the dynamic property path list
    #[arg(long)]
    pub print_paths: bool,
}

#[derive(Debug, Args)]
pub struct RetypeArgs {
    /// Schema file to update
    #[arg(short, long)]
    pub schema: PathBuf,
    /// Schema item path, e.g. `schema.__root_schema__.children.city`
    #[arg(long)]
    pub path: String,
    /// New field kind (`select`, `Text Input`, `NUMBER_INPUT`, ...)
    #[arg(long, value_parser = parse_field_type)]
    pub field_type: FieldType,
    /// Widget name used in default-value bindings
    #[arg(long, default_value = DEFAULT_WIDGET_NAME)]
    pub widget_name: String,
    /// Destination file; overwrites the input schema when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SourcePathArgs {
    /// Schema file
    #[arg(short, long)]
    pub schema: PathBuf,
    /// Schema item path
    #[arg(long)]
    pub path: String,
}

#[derive(Debug, Args)]
pub struct FieldStateArgs {
    /// Schema file
    #[arg(short, long)]
    pub schema: PathBuf,
    /// Internal field state keyed by identifier
    #[arg(long)]
    pub state: Option<PathBuf>,
}

pub fn parse_field_type(value: &str) -> Result<FieldType, String> {
    value.parse::<FieldType>().map_err(|_| {
        let known = FieldType::variants()
            .iter()
            .map(FieldType::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        format!("Unknown field type '{value}'. Expected one of: {known}")
    })
}
