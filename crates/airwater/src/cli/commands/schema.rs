use anyhow::Result;
use clap::Args;

use crate::models::json_schema;

#[derive(Debug, Clone, Args)]
pub struct SchemaArgs {
    #[arg(long, default_value_t = false)]
    pub compact: bool,
}

pub fn run(args: &SchemaArgs) -> Result<()> {
    let schema = json_schema();
    let encoded = if args.compact {
        serde_json::to_string(&schema)?
    } else {
        serde_json::to_string_pretty(&schema)?
    };
    println!("{encoded}");
    Ok(())
}
