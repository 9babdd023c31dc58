use anyhow::Result;
use clap::Args;
use serde_json::json;

use crate::cli::app::{FilterArgs, OutputArgs};
use crate::cli::output::{
    emit, filters_meta, format_average, query_failure, render_table, to_data,
};
use crate::models::{Measurement, QueryEnvelope};
use crate::query::{QueryEngine, ROW_CAP};

pub const SCATTER_SAMPLE_SIZE: usize = 300;

#[derive(Debug, Clone, Args)]
pub struct CountriesArgs {
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Clone, Args)]
pub struct RegionsArgs {
    #[arg(value_name = "COUNTRY")]
    pub country: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Clone, Args)]
pub struct RowsArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

pub fn run_countries(args: &CountriesArgs, engine: &QueryEngine) -> Result<()> {
    let countries = engine
        .list_countries()
        .map_err(|error| query_failure("countries", &error))?;

    let envelope = QueryEnvelope::ok("countries", json!({ "countries": countries }))
        .with_meta("country_count", json!(countries.len()));
    emit(args.output, envelope, || lines(&countries))
}

pub fn run_regions(args: &RegionsArgs, engine: &QueryEngine) -> Result<()> {
    let regions = engine
        .list_regions(&args.country)
        .map_err(|error| query_failure("regions", &error))?;

    let mut envelope = QueryEnvelope::ok("regions", json!({ "regions": regions }))
        .with_meta("country", json!(args.country))
        .with_meta("region_count", json!(regions.len()));
    if regions.is_empty() {
        envelope = envelope.with_warning(
            "no_regions",
            format!("no regions found for country `{}`", args.country),
        );
    }
    emit(args.output, envelope, || lines(&regions))
}

pub fn run_rows(args: &RowsArgs, engine: &QueryEngine) -> Result<()> {
    let filters = args.filters.to_filter_set();
    let rows = engine
        .list_rows(&filters)
        .map_err(|error| query_failure("rows", &error))?;

    let capped = rows.len() >= ROW_CAP;
    let mut envelope = QueryEnvelope::ok("rows", json!({ "rows": to_data("rows", &rows)? }))
        .with_meta("filters", filters_meta(&filters))
        .with_meta("row_count", json!(rows.len()))
        .with_meta("row_cap", json!(ROW_CAP))
        .with_meta("scatter_sample", json!(scatter_sample(&rows)));
    if capped {
        envelope = envelope
            .with_warning("row_cap_reached", "result truncated to row_cap")
            .with_warning_details(json!({ "row_cap": ROW_CAP }));
    }

    emit(args.output, envelope, || {
        let mut text = render_rows(&rows);
        text.push_str(&format!("Loaded {} rows (max {ROW_CAP}).\n", rows.len()));
        text
    })
}

/// Air/water pairs of the leading rows, for plotting one against the other.
/// Rows missing either reading are skipped.
#[must_use]
pub fn scatter_sample(rows: &[Measurement]) -> Vec<[f64; 2]> {
    rows.iter()
        .take(SCATTER_SAMPLE_SIZE)
        .filter_map(|row| Some([row.air_quality?, row.water_pollution?]))
        .collect()
}

#[must_use]
pub fn render_rows(rows: &[Measurement]) -> String {
    let cells = rows
        .iter()
        .map(|row| {
            vec![
                row.city.clone(),
                row.region.clone(),
                row.country.clone(),
                format_average(row.air_quality),
                format_average(row.water_pollution),
            ]
        })
        .collect::<Vec<_>>();
    render_table(
        &["City", "Region", "Country", "AirQuality", "WaterPollution"],
        &cells,
    )
}

fn lines(values: &[String]) -> String {
    values.iter().map(|value| format!("{value}\n")).collect()
}
