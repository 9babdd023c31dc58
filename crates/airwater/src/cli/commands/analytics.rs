use std::time::Duration;

use anyhow::{Error, Result};
use clap::Args;
use serde::Serialize;
use serde_json::json;

use crate::cli::app::{FilterArgs, OutputArgs};
use crate::cli::output::{
    emit, filters_meta, format_average, format_value, query_failure, render_table, to_data,
};
use crate::models::{
    CountryMetric, KpiSummary, Metric, QueryEnvelope, QueryEnvelopeCommandFailure,
};
use crate::query::{DEFAULT_TOP_N, ErrorKind, QueryEngine, QueryTask, TaskFailure};

#[derive(Debug, Clone, Args)]
pub struct KpisArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Clone, Args)]
pub struct TopArgs {
    #[arg(long, value_name = "METRIC", default_value = "air")]
    pub metric: Metric,

    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    pub limit: usize,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Clone, Args)]
pub struct DashboardArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub kpis: KpiSummary,
    pub top_air: Vec<CountryMetric>,
    pub top_water: Vec<CountryMetric>,
}

pub fn run_kpis(args: &KpisArgs, engine: &QueryEngine) -> Result<()> {
    let filters = args.filters.to_filter_set();
    let kpis = engine
        .compute_kpis(&filters)
        .map_err(|error| query_failure("kpis", &error))?;

    let mut envelope = QueryEnvelope::ok("kpis", to_data("kpis", &kpis)?)
        .with_meta("filters", filters_meta(&filters));
    if !kpis.has_data() {
        envelope = envelope.with_warning("no_data", "no rows match the current filters");
    }
    emit(args.output, envelope, || render_kpis(&kpis))
}

pub fn run_top(args: &TopArgs, engine: &QueryEngine) -> Result<()> {
    let ranking = engine
        .top_countries_by_metric(args.metric, args.limit)
        .map_err(|error| query_failure("top", &error))?;

    let envelope = QueryEnvelope::ok("top", json!({ "countries": to_data("top", &ranking)? }))
        .with_meta("metric", json!(args.metric))
        .with_meta("limit", json!(args.limit))
        .with_meta("country_count", json!(ranking.len()));
    emit(args.output, envelope, || {
        format!(
            "Top {} Countries by Avg {}\n{}",
            args.limit,
            args.metric.label(),
            render_ranking(&ranking)
        )
    })
}

pub fn run_dashboard(args: &DashboardArgs, engine: &QueryEngine) -> Result<()> {
    let filters = args.filters.to_filter_set();
    let timeout = args.timeout_ms.map(Duration::from_millis);

    let kpis_task = {
        let engine = engine.clone();
        let filters = filters.clone();
        QueryTask::spawn("kpis", move || engine.compute_kpis(&filters))
    };
    let top_air_task = {
        let engine = engine.clone();
        QueryTask::spawn("top_air", move || {
            engine.top_countries_by_metric(Metric::Air, DEFAULT_TOP_N)
        })
    };
    let top_water_task = {
        let engine = engine.clone();
        QueryTask::spawn("top_water", move || {
            engine.top_countries_by_metric(Metric::Water, DEFAULT_TOP_N)
        })
    };

    let data = DashboardData {
        kpis: await_task(kpis_task, timeout)?,
        top_air: await_task(top_air_task, timeout)?,
        top_water: await_task(top_water_task, timeout)?,
    };

    let mut envelope = QueryEnvelope::ok("dashboard", to_data("dashboard", &data)?)
        .with_meta("filters", filters_meta(&filters))
        .with_meta("top_n", json!(DEFAULT_TOP_N));
    if let Some(timeout) = timeout {
        envelope = envelope.with_meta("timeout_ms", json!(timeout.as_millis() as u64));
    }
    if !data.kpis.has_data() {
        envelope = envelope.with_warning("no_data", "no rows match the current filters");
    }

    emit(args.output, envelope, || {
        format!(
            "{}\nTop {DEFAULT_TOP_N} Countries by Avg AirQuality\n{}\nTop {DEFAULT_TOP_N} Countries by Avg WaterPollution\n{}",
            render_kpis(&data.kpis),
            render_ranking(&data.top_air),
            render_ranking(&data.top_water)
        )
    })
}

fn await_task<T: Send + 'static>(task: QueryTask<T>, timeout: Option<Duration>) -> Result<T> {
    let label = task.label();
    let outcome = match timeout {
        Some(timeout) => task.join_timeout(timeout),
        None => task.join(),
    };

    match outcome.into_result(label) {
        Ok(result) => result.map_err(|error| query_failure("dashboard", &error)),
        Err(failure) => Err(task_failure(&failure)),
    }
}

fn task_failure(failure: &TaskFailure) -> Error {
    Error::new(QueryEnvelopeCommandFailure::new(
        ErrorKind::QueryExecution,
        QueryEnvelope::error("dashboard", failure.code(), failure.to_string())
            .with_error_details(json!({ "task": failure.task() })),
    ))
}

#[must_use]
pub fn render_kpis(kpis: &KpiSummary) -> String {
    render_table(
        &["Cities", "Avg AirQuality", "Avg WaterPollution"],
        &[vec![
            kpis.city_count.to_string(),
            format_average(kpis.average_air_quality),
            format_average(kpis.average_water_pollution),
        ]],
    )
}

#[must_use]
pub fn render_ranking(ranking: &[CountryMetric]) -> String {
    let cells = ranking
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            vec![
                (index + 1).to_string(),
                entry.country.clone(),
                format_value(entry.value),
            ]
        })
        .collect::<Vec<_>>();
    render_table(&["#", "Country", "Average"], &cells)
}

#[cfg(test)]
mod tests {
    use super::{render_kpis, render_ranking, task_failure};
    use crate::models::{CountryMetric, KpiSummary, QueryEnvelopeCommandFailure};
    use crate::query::{ErrorKind, TaskFailure};

    #[test]
    fn timed_out_task_becomes_a_runtime_failure_envelope() {
        let error = task_failure(&TaskFailure::TimedOut("top_air".to_string()));

        let failure = error
            .downcast_ref::<QueryEnvelopeCommandFailure>()
            .expect("task failure should carry an envelope");
        assert_eq!(failure.kind(), ErrorKind::QueryExecution);
        let payload = failure
            .envelope()
            .error
            .as_ref()
            .expect("error payload should be present");
        assert_eq!(payload.code, "query_timeout");
        assert_eq!(
            payload.details.as_ref(),
            Some(&serde_json::json!({ "task": "top_air" }))
        );
    }

    #[test]
    fn empty_kpis_render_no_data_instead_of_zero() {
        let rendered = render_kpis(&KpiSummary {
            city_count: 0,
            average_air_quality: None,
            average_water_pollution: None,
        });

        assert!(rendered.contains("n/a"));
        assert!(!rendered.contains("0.00"));
    }

    #[test]
    fn ranking_is_numbered_from_one() {
        let rendered = render_ranking(&[
            CountryMetric {
                country: "Austria".to_string(),
                value: 80.0,
            },
            CountryMetric {
                country: "Chad".to_string(),
                value: 12.5,
            },
        ]);

        let lines = rendered.lines().collect::<Vec<_>>();
        assert!(lines[2].starts_with("1  Austria"));
        assert!(lines[3].starts_with("2  Chad"));
        assert!(lines[3].ends_with("12.50"));
    }
}
