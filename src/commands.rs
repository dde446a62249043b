use anyhow::{Context, Result, anyhow};
use log::{info, warn};

use crate::{
    builder::set_schema_item_field_type,
    cli::{FieldStateArgs, InferArgs, RetypeArgs, SourcePathArgs},
    compute::{ComputeOptions, ComputedSchemaStatus, compute_schema},
    field_state::generate_field_state,
    io_utils::{self, load_schema, read_field_state, read_sample, save_schema},
    path::get_source_data_path_from_schema_item_path,
    schema::{Schema, root_item},
};

pub fn infer(args: &InferArgs) -> Result<()> {
    let sample = read_sample(&args.input)?;
    let previous = match &args.schema {
        Some(path) => load_schema(path)?,
        None => Schema::new(),
    };
    let options = ComputeOptions {
        widget_name: args.widget_name.clone(),
        field_limit: args.field_limit,
    };
    info!(
        "Inferring schema for '{}' from {:?}",
        options.widget_name, args.input
    );

    let computed = compute_schema(&options, Some(&sample), &previous, &[])
        .with_context(|| format!("Inferring schema from {:?}", args.input))?;
    match computed.status {
        ComputedSchemaStatus::LimitExceeded => {
            warn!(
                "Field limit of {} exceeded; schema left untouched",
                options.field_limit
            );
            return Ok(());
        }
        ComputedSchemaStatus::Unchanged => info!("Sample unchanged; schema left as is"),
        ComputedSchemaStatus::Updated => {
            let fields = root_item(&computed.schema).map_or(0, |root| root.children.len());
            info!("Schema updated with {fields} top-level field(s)");
        }
    }

    save_schema(args.output.as_deref(), &computed.schema)?;
    if args.print_paths {
        for path in &computed.dynamic_property_path_list {
            println!("{}", path.key);
        }
    }
    Ok(())
}

pub fn retype(args: &RetypeArgs) -> Result<()> {
    let mut schema = load_schema(&args.schema)?;
    set_schema_item_field_type(args.field_type, &args.widget_name, &mut schema, &args.path)
        .with_context(|| format!("Changing field type of '{}'", args.path))?;
    let output = args.output.as_deref().unwrap_or(&args.schema);
    save_schema(Some(output), &schema)?;
    info!(
        "Item '{}' is now a {} field; schema written to {output:?}",
        args.path, args.field_type
    );
    Ok(())
}

pub fn source_path(args: &SourcePathArgs) -> Result<()> {
    let schema = load_schema(&args.schema)?;
    let path = get_source_data_path_from_schema_item_path(&schema, &args.path)
        .with_context(|| format!("Resolving '{}'", args.path))?;
    println!("{path}");
    Ok(())
}

pub fn field_state(args: &FieldStateArgs) -> Result<()> {
    let schema = load_schema(&args.schema)?;
    let root = root_item(&schema)
        .ok_or_else(|| anyhow!("Schema {:?} has no root entry", args.schema))?;
    let internal = args.state.as_deref().map(read_field_state).transpose()?;
    let state = generate_field_state(&root.children, internal.as_ref());
    io_utils::write_document(None, &state)
}
