use rusqlite::types::Value as SqlValue;

use super::filter::{Field, Operator, Predicate};
use crate::models::Metric;

pub const DEFAULT_TABLE: &str = "cities_air_quality_water_pollution.18-10-2021";
pub const DEFAULT_CITY_COLUMN: &str = "City";
pub const DEFAULT_REGION_COLUMN: &str = "\"Region\"";
pub const DEFAULT_COUNTRY_COLUMN: &str = "\"Country\"";
pub const DEFAULT_AIR_COLUMN: &str = "\"AirQuality\"";
pub const DEFAULT_WATER_COLUMN: &str = "\"WaterPollution\"";

/// Raw (unquoted) names of the backing table and its columns.
///
/// The published dataset has a dotted table name and column names that
/// literally contain double quotes, so every name goes through
/// [`quote_identifier`] before it reaches SQL text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    pub table: String,
    pub city: String,
    pub region: String,
    pub country: String,
    pub air_quality: String,
    pub water_pollution: String,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            city: DEFAULT_CITY_COLUMN.to_string(),
            region: DEFAULT_REGION_COLUMN.to_string(),
            country: DEFAULT_COUNTRY_COLUMN.to_string(),
            air_quality: DEFAULT_AIR_COLUMN.to_string(),
            water_pollution: DEFAULT_WATER_COLUMN.to_string(),
        }
    }
}

impl TableLayout {
    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    #[must_use]
    pub fn quoted_table(&self) -> String {
        quote_identifier(&self.table)
    }

    #[must_use]
    pub fn quoted_field(&self, field: Field) -> String {
        let name = match field {
            Field::Country => &self.country,
            Field::Region => &self.region,
            Field::City => &self.city,
        };
        quote_identifier(name)
    }

    #[must_use]
    pub fn quoted_metric(&self, metric: Metric) -> String {
        match metric {
            Metric::Air => quote_identifier(&self.air_quality),
            Metric::Water => quote_identifier(&self.water_pollution),
        }
    }
}

#[must_use]
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereClause {
    pub fragments: Vec<String>,
    pub params: Vec<SqlValue>,
}

impl WhereClause {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    #[must_use]
    pub fn sql(&self) -> String {
        if self.fragments.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.fragments.join(" AND "))
        }
    }
}

#[must_use]
pub fn render_where(predicates: &[Predicate], layout: &TableLayout) -> WhereClause {
    let mut clause = WhereClause::default();

    for predicate in predicates {
        let column = layout.quoted_field(predicate.field);
        match predicate.op {
            Operator::Equals => {
                clause.fragments.push(format!("{column} = ?"));
                clause.params.push(SqlValue::Text(predicate.value.clone()));
            }
            Operator::Contains => {
                clause.fragments.push(format!("{column} GLOB ?"));
                clause
                    .params
                    .push(SqlValue::Text(substring_glob(&predicate.value)));
            }
        }
    }

    clause
}

// GLOB is case-sensitive; metacharacters are wrapped in one-char classes.
#[must_use]
pub fn substring_glob(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('*');
    for ch in text.chars() {
        match ch {
            '*' | '?' | '[' => {
                pattern.push('[');
                pattern.push(ch);
                pattern.push(']');
            }
            _ => pattern.push(ch),
        }
    }
    pattern.push('*');
    pattern
}

#[must_use]
pub fn list_rows_sql(layout: &TableLayout, clause: &WhereClause, row_cap: usize) -> String {
    let mut sql = format!(
        "SELECT {city} AS city_value, {region} AS region_value, {country} AS country_value, \
         {air} AS air_value, {water} AS water_value FROM {table}",
        city = layout.quoted_field(Field::City),
        region = layout.quoted_field(Field::Region),
        country = layout.quoted_field(Field::Country),
        air = layout.quoted_metric(Metric::Air),
        water = layout.quoted_metric(Metric::Water),
        table = layout.quoted_table(),
    );
    push_clause(&mut sql, clause);
    sql.push_str(&format!(
        " ORDER BY country_value, region_value, city_value LIMIT {row_cap}"
    ));
    sql
}

#[must_use]
pub fn kpis_sql(layout: &TableLayout, clause: &WhereClause) -> String {
    let mut sql = format!(
        "SELECT COUNT(*) AS city_count, AVG({air}) AS avg_air, AVG({water}) AS avg_water FROM {table}",
        air = layout.quoted_metric(Metric::Air),
        water = layout.quoted_metric(Metric::Water),
        table = layout.quoted_table(),
    );
    push_clause(&mut sql, clause);
    sql
}

#[must_use]
pub fn top_countries_sql(layout: &TableLayout, metric: Metric) -> String {
    let country = layout.quoted_field(Field::Country);
    format!(
        "SELECT {country} AS country_value, AVG({value}) AS avg_value FROM {table} \
         GROUP BY {country} ORDER BY avg_value DESC, country_value ASC LIMIT ?1",
        value = layout.quoted_metric(metric),
        table = layout.quoted_table(),
    )
}

#[must_use]
pub fn two_country_comparison_sql(layout: &TableLayout, metric: Metric) -> String {
    let country = layout.quoted_field(Field::Country);
    let value = layout.quoted_metric(metric);
    format!(
        "SELECT AVG(CASE WHEN {country} = ?1 THEN {value} END) AS country_a_avg, \
         AVG(CASE WHEN {country} = ?2 THEN {value} END) AS country_b_avg, \
         AVG({value}) AS global_avg FROM {table}",
        table = layout.quoted_table(),
    )
}

#[must_use]
pub fn countries_sql(layout: &TableLayout) -> String {
    format!(
        "SELECT DISTINCT {country} AS country_value FROM {table} ORDER BY country_value",
        country = layout.quoted_field(Field::Country),
        table = layout.quoted_table(),
    )
}

#[must_use]
pub fn regions_sql(layout: &TableLayout) -> String {
    format!(
        "SELECT DISTINCT {region} AS region_value FROM {table} WHERE {country} = ?1 \
         ORDER BY region_value",
        region = layout.quoted_field(Field::Region),
        country = layout.quoted_field(Field::Country),
        table = layout.quoted_table(),
    )
}

fn push_clause(sql: &mut String, clause: &WhereClause) {
    if !clause.is_empty() {
        sql.push(' ');
        sql.push_str(&clause.sql());
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::types::Value as SqlValue;

    use super::{TableLayout, WhereClause, quote_identifier, render_where, substring_glob};
    use crate::query::filter::{FilterSet, build_predicates};

    #[test]
    fn quote_identifier_doubles_embedded_quotes() {
        assert_eq!(quote_identifier("City"), "\"City\"");
        assert_eq!(quote_identifier("\"Region\""), "\"\"\"Region\"\"\"");
        assert_eq!(
            quote_identifier("cities_air_quality_water_pollution.18-10-2021"),
            "\"cities_air_quality_water_pollution.18-10-2021\""
        );
    }

    #[test]
    fn empty_clause_renders_no_where_keyword() {
        let clause = render_where(&[], &TableLayout::default());

        assert!(clause.is_empty());
        assert_eq!(clause.sql(), "");
        assert_eq!(clause, WhereClause::default());
    }

    #[test]
    fn full_filter_set_binds_parameters_in_predicate_order() {
        let filters = FilterSet::new()
            .with_country("Germany")
            .with_region("Bavaria")
            .with_city_search(" Mün ");
        let clause = render_where(&build_predicates(&filters), &TableLayout::default());

        assert_eq!(clause.fragments.len(), 3);
        assert_eq!(clause.params.len(), 3);
        assert_eq!(
            clause.params,
            vec![
                SqlValue::Text("Germany".to_string()),
                SqlValue::Text("Bavaria".to_string()),
                SqlValue::Text("*Mün*".to_string()),
            ]
        );
        assert!(clause.sql().starts_with("WHERE "));
        assert_eq!(clause.sql().matches(" AND ").count(), 2);
    }

    #[test]
    fn substring_glob_escapes_metacharacters() {
        assert_eq!(substring_glob("York"), "*York*");
        assert_eq!(substring_glob("a*b?c[d"), "*a[*]b[?]c[[]d*");
        assert_eq!(substring_glob("x]y"), "*x]y*");
    }
}
