use anyhow::{Error, Result};
use serde::Serialize;
use serde_json::{Value, json};

use super::app::OutputArgs;
use crate::models::{QueryEnvelope, QueryEnvelopeCommandFailure};
use crate::query::{ErrorKind, FilterSet, QueryError};

pub const NO_DATA: &str = "n/a";

pub fn emit(
    output: OutputArgs,
    envelope: QueryEnvelope,
    text: impl FnOnce() -> String,
) -> Result<()> {
    if output.json {
        let encoded = serde_json::to_string(&envelope).map_err(|error| {
            Error::new(QueryEnvelopeCommandFailure::new(
                ErrorKind::QueryExecution,
                QueryEnvelope::error(
                    envelope.command.clone(),
                    "response_encode_failed",
                    "failed to encode query response",
                )
                .with_error_details(json!({ "cause": format!("{error:#}") })),
            ))
        })?;
        println!("{encoded}");
    } else {
        print!("{}", text());
    }
    Ok(())
}

pub fn to_data<T: Serialize>(command: &str, value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|error| {
        Error::new(QueryEnvelopeCommandFailure::new(
            ErrorKind::QueryExecution,
            QueryEnvelope::error(command, "response_encode_failed", "failed to encode query response")
                .with_error_details(json!({ "cause": format!("{error:#}") })),
        ))
    })
}

pub fn query_failure(command: &str, error: &QueryError) -> Error {
    if error.kind().is_user_correctable() {
        tracing::info!(command, error = %error, "query rejected");
    } else {
        tracing::error!(command, error = ?error, "query failed");
    }
    Error::new(QueryEnvelopeCommandFailure::from_query_error(command, error))
}

#[must_use]
pub fn filters_meta(filters: &FilterSet) -> Value {
    json!({
        "country": filters.country,
        "region": filters.region,
        "city_search": filters.city_search,
        "unfiltered": filters.is_unfiltered(),
    })
}

#[must_use]
pub fn format_value(value: f64) -> String {
    format!("{value:.2}")
}

#[must_use]
pub fn format_average(value: Option<f64>) -> String {
    value.map_or_else(|| NO_DATA.to_string(), format_value)
}

/// Left-aligned plain text table; every row must have `headers.len()` cells.
#[must_use]
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths = headers.iter().map(|header| header.chars().count()).collect::<Vec<_>>();
    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(index) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let mut output = String::new();
    push_row(
        &mut output,
        &widths,
        headers.iter().map(|header| (*header).to_string()),
    );
    push_row(
        &mut output,
        &widths,
        widths.iter().map(|width| "-".repeat(*width)),
    );
    for row in rows {
        push_row(&mut output, &widths, row.iter().cloned());
    }
    output
}

fn push_row(output: &mut String, widths: &[usize], cells: impl Iterator<Item = String>) {
    let line = cells
        .zip(widths)
        .map(|(cell, width)| {
            let padding = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(padding))
        })
        .collect::<Vec<_>>()
        .join("  ");
    output.push_str(line.trim_end());
    output.push('\n');
}

#[cfg(test)]
mod tests {
    use super::{NO_DATA, filters_meta, format_average, render_table};
    use crate::query::FilterSet;

    #[test]
    fn filters_meta_flags_blank_filters_as_unfiltered() {
        let blank = filters_meta(&FilterSet::new().with_country("  "));
        assert_eq!(blank["unfiltered"], true);

        let filtered = filters_meta(&FilterSet::new().with_city_search("Par"));
        assert_eq!(filtered["unfiltered"], false);
        assert_eq!(filtered["city_search"], "Par");
    }

    #[test]
    fn absent_average_renders_as_no_data() {
        assert_eq!(format_average(None), NO_DATA);
        assert_eq!(format_average(Some(0.0)), "0.00");
        assert_eq!(format_average(Some(12.346)), "12.35");
    }

    #[test]
    fn table_pads_columns_to_widest_cell() {
        let rendered = render_table(
            &["Country", "Avg"],
            &[
                vec!["France".to_string(), "1.00".to_string()],
                vec!["Netherlands".to_string(), "22.50".to_string()],
            ],
        );

        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "Country      Avg");
        assert_eq!(lines[1], "-----------  -----");
        assert_eq!(lines[2], "France       1.00");
        assert_eq!(lines[3], "Netherlands  22.50");
    }
}
