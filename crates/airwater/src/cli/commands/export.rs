use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Error, Result};
use clap::Args;
use serde_json::json;

use crate::cli::app::{FilterArgs, OutputArgs};
use crate::cli::output::{emit, filters_meta, query_failure};
use crate::models::{Measurement, QueryEnvelope, QueryEnvelopeCommandFailure};
use crate::query::{ErrorKind, QueryEngine};

pub const CSV_HEADER: &str = "City,Region,Country,AirQuality,WaterPollution";

#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    #[command(flatten)]
    pub filters: FilterArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

pub fn run(args: &ExportArgs, engine: &QueryEngine) -> Result<()> {
    let filters = args.filters.to_filter_set();
    let rows = engine
        .list_rows(&filters)
        .map_err(|error| query_failure("export", &error))?;

    if rows.is_empty() {
        let envelope = QueryEnvelope::ok("export", json!({ "rows_written": 0 }))
            .with_meta("filters", filters_meta(&filters))
            .with_warning("nothing_to_export", "no rows match the current filters");
        return emit(args.output, envelope, || "Nothing to export.\n".to_string());
    }

    write_csv_file(&args.path, &rows).map_err(|error| {
        Error::new(QueryEnvelopeCommandFailure::new(
            ErrorKind::QueryExecution,
            QueryEnvelope::error("export", "export_write_failed", "failed to write CSV export")
                .with_error_details(json!({
                    "path": args.path.display().to_string(),
                    "cause": format!("{error:#}")
                })),
        ))
    })?;
    tracing::info!(path = %args.path.display(), rows = rows.len(), "csv export written");

    let envelope = QueryEnvelope::ok(
        "export",
        json!({
            "path": args.path.display().to_string(),
            "rows_written": rows.len(),
        }),
    )
    .with_meta("filters", filters_meta(&filters));
    emit(args.output, envelope, || {
        format!("Exported: {}\n", args.path.display())
    })
}

pub fn write_csv_file(path: &Path, rows: &[Measurement]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create export file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_csv(&mut writer, rows)
        .with_context(|| format!("failed to write export file: {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("failed to flush export file: {}", path.display()))
}

pub fn write_csv(writer: &mut impl Write, rows: &[Measurement]) -> std::io::Result<()> {
    writeln!(writer, "{CSV_HEADER}")?;
    for row in rows {
        writeln!(
            writer,
            "{},{},{},{},{}",
            csv_text(&row.city),
            csv_text(&row.region),
            csv_text(&row.country),
            csv_number(row.air_quality),
            csv_number(row.water_pollution)
        )?;
    }
    Ok(())
}

fn csv_text(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

// Plain decimal notation; a missing reading is an empty field.
fn csv_number(value: Option<f64>) -> String {
    value.map(|number| number.to_string()).unwrap_or_default()
}
