#![allow(dead_code)]

use std::path::PathBuf;

use rusqlite::{Connection, params};

pub const CREATE_DEFAULT_TABLE_SQL: &str = r#"
CREATE TABLE "cities_air_quality_water_pollution.18-10-2021" (
    "City" TEXT NOT NULL,
    """Region""" TEXT NOT NULL,
    """Country""" TEXT NOT NULL,
    """AirQuality""" REAL NOT NULL,
    """WaterPollution""" REAL NOT NULL
);
"#;

const INSERT_DEFAULT_ROW_SQL: &str = r#"
INSERT INTO "cities_air_quality_water_pollution.18-10-2021"
    ("City", """Region""", """Country""", """AirQuality""", """WaterPollution""")
VALUES (?1, ?2, ?3, ?4, ?5)
"#;

#[derive(Debug, Clone, Copy)]
pub struct SeedRow {
    pub city: &'static str,
    pub region: &'static str,
    pub country: &'static str,
    pub air_quality: f64,
    pub water_pollution: f64,
}

pub const fn seed_row(
    city: &'static str,
    region: &'static str,
    country: &'static str,
    air_quality: f64,
    water_pollution: f64,
) -> SeedRow {
    SeedRow {
        city,
        region,
        country,
        air_quality,
        water_pollution,
    }
}

// Air means: global 62.0, France 55.0, Germany 72.5.
// Water means: global 38.0, France 45.0, Germany 27.5.
pub const FIVE_ROWS: [SeedRow; 5] = [
    seed_row("Paris", "Ile-de-France", "France", 40.0, 60.0),
    seed_row("Versailles", "Ile-de-France", "France", 70.0, 30.0),
    seed_row("Marseille", "Provence", "France", 55.0, 45.0),
    seed_row("Munich", "Bavaria", "Germany", 80.0, 20.0),
    seed_row("Berlin", "Berlin", "Germany", 65.0, 35.0),
];

pub fn temp_db_path(label: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("airwater-{label}-{nanos}.sqlite"))
}

pub fn seed_database(label: &str, rows: &[SeedRow]) -> PathBuf {
    let path = temp_db_path(label);
    let mut connection = Connection::open(&path).expect("seed db should open");
    connection
        .execute_batch(CREATE_DEFAULT_TABLE_SQL)
        .expect("seed table should be creatable");

    let tx = connection
        .transaction()
        .expect("seed transaction should open");
    {
        let mut statement = tx
            .prepare(INSERT_DEFAULT_ROW_SQL)
            .expect("seed insert should prepare");
        for row in rows {
            statement
                .execute(params![
                    row.city,
                    row.region,
                    row.country,
                    row.air_quality,
                    row.water_pollution
                ])
                .expect("seed row should insert");
        }
    }
    tx.commit().expect("seed transaction should commit");

    path
}

pub fn seed_five_rows(label: &str) -> PathBuf {
    seed_database(label, &FIVE_ROWS)
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
