use airwater::models::Metric;
use airwater::query::sql::{
    countries_sql, kpis_sql, list_rows_sql, regions_sql, top_countries_sql,
    two_country_comparison_sql,
};
use airwater::query::{FilterSet, ROW_CAP, TableLayout, build_predicates, render_where};
use insta::assert_snapshot;

fn clause_for(filters: &FilterSet) -> airwater::query::WhereClause {
    render_where(&build_predicates(filters), &TableLayout::default())
}

#[test]
fn list_rows_sql_without_filters() {
    let sql = list_rows_sql(&TableLayout::default(), &clause_for(&FilterSet::new()), ROW_CAP);

    assert_snapshot!(sql, @r#"SELECT "City" AS city_value, """Region""" AS region_value, """Country""" AS country_value, """AirQuality""" AS air_value, """WaterPollution""" AS water_value FROM "cities_air_quality_water_pollution.18-10-2021" ORDER BY country_value, region_value, city_value LIMIT 1000"#);
}

#[test]
fn list_rows_sql_with_every_filter() {
    let filters = FilterSet::new()
        .with_country("France")
        .with_region("Provence")
        .with_city_search("Mars");
    let sql = list_rows_sql(&TableLayout::default(), &clause_for(&filters), ROW_CAP);

    assert_snapshot!(sql, @r#"SELECT "City" AS city_value, """Region""" AS region_value, """Country""" AS country_value, """AirQuality""" AS air_value, """WaterPollution""" AS water_value FROM "cities_air_quality_water_pollution.18-10-2021" WHERE """Country""" = ? AND """Region""" = ? AND "City" GLOB ? ORDER BY country_value, region_value, city_value LIMIT 1000"#);
}

#[test]
fn kpis_sql_with_region_only() {
    let filters = FilterSet::new().with_region("Bavaria");
    let sql = kpis_sql(&TableLayout::default(), &clause_for(&filters));

    assert_snapshot!(sql, @r#"SELECT COUNT(*) AS city_count, AVG("""AirQuality""") AS avg_air, AVG("""WaterPollution""") AS avg_water FROM "cities_air_quality_water_pollution.18-10-2021" WHERE """Region""" = ?"#);
}

#[test]
fn top_countries_sql_for_water() {
    let sql = top_countries_sql(&TableLayout::default(), Metric::Water);

    assert_snapshot!(sql, @r#"SELECT """Country""" AS country_value, AVG("""WaterPollution""") AS avg_value FROM "cities_air_quality_water_pollution.18-10-2021" GROUP BY """Country""" ORDER BY avg_value DESC, country_value ASC LIMIT ?1"#);
}

#[test]
fn comparison_sql_is_a_single_statement() {
    let sql = two_country_comparison_sql(&TableLayout::default(), Metric::Air);

    assert_snapshot!(sql, @r#"SELECT AVG(CASE WHEN """Country""" = ?1 THEN """AirQuality""" END) AS country_a_avg, AVG(CASE WHEN """Country""" = ?2 THEN """AirQuality""" END) AS country_b_avg, AVG("""AirQuality""") AS global_avg FROM "cities_air_quality_water_pollution.18-10-2021""#);
    assert_eq!(sql.matches("SELECT").count(), 1);
}

#[test]
fn picker_queries_are_distinct_and_ordered() {
    let layout = TableLayout::default();

    assert_snapshot!(countries_sql(&layout), @r#"SELECT DISTINCT """Country""" AS country_value FROM "cities_air_quality_water_pollution.18-10-2021" ORDER BY country_value"#);
    assert_snapshot!(regions_sql(&layout), @r#"SELECT DISTINCT """Region""" AS region_value FROM "cities_air_quality_water_pollution.18-10-2021" WHERE """Country""" = ?1 ORDER BY region_value"#);
}

#[test]
fn parameter_count_matches_present_fields() {
    let cases = [
        (FilterSet::new(), 0),
        (FilterSet::new().with_country("France"), 1),
        (FilterSet::new().with_country("France").with_city_search(" "), 1),
        (FilterSet::new().with_region("Provence").with_city_search("M"), 2),
        (
            FilterSet::new()
                .with_country("France")
                .with_region("Provence")
                .with_city_search("M"),
            3,
        ),
    ];

    for (filters, expected) in cases {
        let clause = clause_for(&filters);
        assert_eq!(clause.params.len(), expected, "filters: {filters:?}");
        assert_eq!(clause.fragments.len(), expected, "filters: {filters:?}");
    }
}
