use anyhow::Result;
use clap::Args;
use serde::Serialize;
use serde_json::json;

use crate::cli::app::OutputArgs;
use crate::cli::output::{emit, format_value, query_failure, render_table, to_data};
use crate::models::{CountryVsGlobal, Metric, QueryEnvelope, TwoCountryComparison};
use crate::query::QueryEngine;

#[derive(Debug, Clone, Args)]
pub struct CompareArgs {
    #[arg(value_name = "COUNTRY_A")]
    pub country_a: String,

    #[arg(value_name = "COUNTRY_B")]
    pub country_b: String,

    #[arg(long, value_name = "METRIC", default_value = "air")]
    pub metric: Metric,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Clone, Args)]
pub struct CompareGlobalArgs {
    #[arg(value_name = "COUNTRY")]
    pub country: String,

    #[arg(long, value_name = "METRIC", default_value = "air")]
    pub metric: Metric,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub country: String,
    pub metric: Metric,
    pub average: f64,
    pub global_avg: f64,
    pub at_or_above_global: bool,
}

impl MetricCard {
    #[must_use]
    pub fn new(country: &str, metric: Metric, versus: CountryVsGlobal) -> Self {
        Self {
            country: country.to_string(),
            metric,
            average: versus.country_avg,
            global_avg: versus.global_avg,
            at_or_above_global: versus.is_at_or_above_global(),
        }
    }

    #[must_use]
    pub fn verdict(&self) -> String {
        if self.at_or_above_global {
            format!("Above/Equal global avg ({})", format_value(self.global_avg))
        } else {
            format!("Below global avg ({})", format_value(self.global_avg))
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompareData {
    pub metric: Metric,
    pub country_a: String,
    pub country_b: String,
    pub selected: TwoCountryComparison,
    pub cards: Vec<MetricCard>,
}

pub fn run_compare(args: &CompareArgs, engine: &QueryEngine) -> Result<()> {
    let compare = |metric| {
        engine
            .compare_two_countries(&args.country_a, &args.country_b, metric)
            .map_err(|error| query_failure("compare", &error))
    };
    let air = compare(Metric::Air)?;
    let water = compare(Metric::Water)?;
    let selected = match args.metric {
        Metric::Air => air,
        Metric::Water => water,
    };

    let mut cards = Vec::with_capacity(4);
    for (metric, comparison) in [(Metric::Air, air), (Metric::Water, water)] {
        cards.push(MetricCard::new(
            &args.country_a,
            metric,
            comparison.country_a_vs_global(),
        ));
        cards.push(MetricCard::new(
            &args.country_b,
            metric,
            comparison.country_b_vs_global(),
        ));
    }

    let data = CompareData {
        metric: args.metric,
        country_a: args.country_a.clone(),
        country_b: args.country_b.clone(),
        selected,
        cards,
    };
    let mut envelope = QueryEnvelope::ok("compare", to_data("compare", &data)?);
    if args.country_a == args.country_b {
        envelope = envelope
            .with_warning("same_country", "both sides of the comparison are the same country")
            .with_warning_details(json!({ "country": args.country_a }));
    }

    emit(args.output, envelope, || render_compare(&data))
}

pub fn run_compare_global(args: &CompareGlobalArgs, engine: &QueryEngine) -> Result<()> {
    let result = engine
        .compare_country_to_global(&args.country, args.metric)
        .map_err(|error| query_failure("compare-global", &error))?;

    let card = MetricCard::new(&args.country, args.metric, result);
    let envelope = QueryEnvelope::ok("compare-global", to_data("compare-global", &result)?)
        .with_meta("country", json!(args.country))
        .with_meta("metric", json!(args.metric))
        .with_meta("at_or_above_global", json!(card.at_or_above_global));

    emit(args.output, envelope, || {
        let table = render_table(
            &["Comparison", "Average value"],
            &[
                vec!["Selected Country".to_string(), format_value(result.country_avg)],
                vec!["Global Average".to_string(), format_value(result.global_avg)],
            ],
        );
        format!(
            "{} vs global ({})\n{table}{}\n",
            args.country,
            args.metric.label(),
            card.verdict()
        )
    })
}

#[must_use]
pub fn render_compare(data: &CompareData) -> String {
    let chart = render_table(
        &["Country", "Average value"],
        &[
            vec![data.country_a.clone(), format_value(data.selected.country_a_avg)],
            vec![data.country_b.clone(), format_value(data.selected.country_b_avg)],
            vec!["Global Avg".to_string(), format_value(data.selected.global_avg)],
        ],
    );
    let cards = render_table(
        &["Country", "Metric", "Average", "Versus global"],
        &data
            .cards
            .iter()
            .map(|card| {
                vec![
                    card.country.clone(),
                    card.metric.label().to_string(),
                    format_value(card.average),
                    card.verdict(),
                ]
            })
            .collect::<Vec<_>>(),
    );
    format!(
        "{} vs {} ({})\n{chart}\n{cards}",
        data.country_a,
        data.country_b,
        data.metric.label()
    )
}
