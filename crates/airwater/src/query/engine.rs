use std::path::{Path, PathBuf};
use std::time::Instant;

use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, Row, params_from_iter};
use tracing::{debug, error};

use super::error::{QueryError, Result};
use super::filter::{FilterSet, build_predicates};
use super::sql::{self, TableLayout, WhereClause, render_where};
use crate::models::{
    CountryMetric, CountryVsGlobal, KpiSummary, Measurement, Metric, TwoCountryComparison,
};

pub const ROW_CAP: usize = 1_000;
pub const DEFAULT_TOP_N: usize = 10;

/// Read-only query surface over the measurements table.
///
/// Every call opens its own connection and drops it before returning, so a
/// single engine can be cloned into as many threads as the caller likes.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    database_path: PathBuf,
    layout: TableLayout,
}

impl QueryEngine {
    #[must_use]
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self::with_layout(database_path, TableLayout::default())
    }

    #[must_use]
    pub fn with_layout(database_path: impl Into<PathBuf>, layout: TableLayout) -> Self {
        Self {
            database_path: database_path.into(),
            layout,
        }
    }

    #[must_use]
    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    #[must_use]
    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }

    pub fn list_countries(&self) -> Result<Vec<String>> {
        let query = sql::countries_sql(&self.layout);
        self.fetch_all("list_countries", &query, &[], |row| row.get(0))
    }

    pub fn list_regions(&self, country: &str) -> Result<Vec<String>> {
        let country = require_country(country, "country")?;
        let query = sql::regions_sql(&self.layout);
        let params = [SqlValue::Text(country.to_string())];
        self.fetch_all("list_regions", &query, &params, |row| row.get(0))
    }

    pub fn list_rows(&self, filters: &FilterSet) -> Result<Vec<Measurement>> {
        let clause = self.where_clause(filters);
        let query = sql::list_rows_sql(&self.layout, &clause, ROW_CAP);
        self.fetch_all("list_rows", &query, &clause.params, |row| {
            Ok(Measurement {
                city: row.get::<usize, Option<String>>(0)?.unwrap_or_default(),
                region: row.get::<usize, Option<String>>(1)?.unwrap_or_default(),
                country: row.get::<usize, Option<String>>(2)?.unwrap_or_default(),
                air_quality: row.get(3)?,
                water_pollution: row.get(4)?,
            })
        })
    }

    pub fn compute_kpis(&self, filters: &FilterSet) -> Result<KpiSummary> {
        let clause = self.where_clause(filters);
        let query = sql::kpis_sql(&self.layout, &clause);
        let (count, average_air_quality, average_water_pollution) =
            self.fetch_one("compute_kpis", &query, &clause.params, |row| {
                Ok((
                    row.get::<usize, i64>(0)?,
                    row.get::<usize, Option<f64>>(1)?,
                    row.get::<usize, Option<f64>>(2)?,
                ))
            })?;

        let city_count = u64::try_from(count).unwrap_or_default();
        if city_count == 0 {
            return Ok(KpiSummary {
                city_count,
                average_air_quality: None,
                average_water_pollution: None,
            });
        }

        Ok(KpiSummary {
            city_count,
            average_air_quality,
            average_water_pollution,
        })
    }

    pub fn top_countries_by_metric(&self, metric: Metric, n: usize) -> Result<Vec<CountryMetric>> {
        let limit = i64::try_from(n).map_err(|_| {
            QueryError::InvalidArgument(format!("top-n limit is out of range: {n}"))
        })?;
        if limit == 0 {
            return Ok(Vec::new());
        }

        let query = sql::top_countries_sql(&self.layout, metric);
        self.fetch_all(
            "top_countries_by_metric",
            &query,
            &[SqlValue::Integer(limit)],
            |row| {
                Ok(CountryMetric {
                    country: row.get(0)?,
                    value: row.get(1)?,
                })
            },
        )
    }

    /// Means of `metric` for two countries and for the whole dataset.
    ///
    /// All three come from one statement so they share a snapshot. Passing the
    /// same country twice is allowed and yields identical country averages.
    pub fn compare_two_countries(
        &self,
        country_a: &str,
        country_b: &str,
        metric: Metric,
    ) -> Result<TwoCountryComparison> {
        let country_a = require_country(country_a, "country_a")?;
        let country_b = require_country(country_b, "country_b")?;

        let query = sql::two_country_comparison_sql(&self.layout, metric);
        let params = [
            SqlValue::Text(country_a.to_string()),
            SqlValue::Text(country_b.to_string()),
        ];
        let (country_a_avg, country_b_avg, global_avg) =
            self.fetch_one("compare_two_countries", &query, &params, |row| {
                Ok((
                    row.get::<usize, Option<f64>>(0)?,
                    row.get::<usize, Option<f64>>(1)?,
                    row.get::<usize, Option<f64>>(2)?,
                ))
            })?;

        let not_found = |country: &str| QueryError::NotFound {
            country: country.to_string(),
        };
        let country_a_avg = country_a_avg.ok_or_else(|| not_found(country_a))?;
        let country_b_avg = country_b_avg.ok_or_else(|| not_found(country_b))?;
        let global_avg = global_avg.ok_or_else(|| not_found(country_a))?;

        Ok(TwoCountryComparison {
            country_a_avg,
            country_b_avg,
            global_avg,
        })
    }

    pub fn compare_country_to_global(
        &self,
        country: &str,
        metric: Metric,
    ) -> Result<CountryVsGlobal> {
        let comparison = self.compare_two_countries(country, country, metric)?;
        Ok(comparison.country_a_vs_global())
    }

    fn where_clause(&self, filters: &FilterSet) -> WhereClause {
        render_where(&build_predicates(filters), &self.layout)
    }

    fn connect(&self, operation: &str) -> Result<Connection> {
        crate::sqlite::open_read_only_connection(&self.database_path).map_err(|source| {
            error!(
                operation,
                path = %self.database_path.display(),
                error = %source,
                "failed to open measurements database"
            );
            QueryError::Execution {
                context: format!(
                    "{operation}: unable to open database {}",
                    self.database_path.display()
                ),
                source,
            }
        })
    }

    fn fetch_all<T>(
        &self,
        operation: &str,
        query: &str,
        params: &[SqlValue],
        map_row: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>> {
        let connection = self.connect(operation)?;
        let started = Instant::now();

        let rows = connection
            .prepare(query)
            .and_then(|mut statement| {
                statement
                    .query_map(params_from_iter(params.iter()), map_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()
            })
            .map_err(|source| execution_failure(operation, query, source))?;

        debug!(
            operation,
            sql = query,
            params = params.len(),
            rows = rows.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "query completed"
        );
        Ok(rows)
    }

    fn fetch_one<T>(
        &self,
        operation: &str,
        query: &str,
        params: &[SqlValue],
        map_row: impl FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<T> {
        let connection = self.connect(operation)?;
        let started = Instant::now();

        let value = connection
            .query_row(query, params_from_iter(params.iter()), map_row)
            .map_err(|source| execution_failure(operation, query, source))?;

        debug!(
            operation,
            sql = query,
            params = params.len(),
            rows = 1,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "query completed"
        );
        Ok(value)
    }
}

fn require_country<'a>(value: &'a str, name: &str) -> Result<&'a str> {
    if value.trim().is_empty() {
        return Err(QueryError::InvalidArgument(format!(
            "{name} must be a non-blank country name"
        )));
    }
    Ok(value)
}

fn execution_failure(operation: &str, query: &str, source: rusqlite::Error) -> QueryError {
    error!(operation, sql = query, error = %source, "query failed");
    QueryError::execution(format!("{operation} failed"))(source)
}
