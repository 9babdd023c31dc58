use std::fmt::{Display, Formatter};
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One city row. NULL text cells read as empty strings; a NULL reading stays
/// `None` rather than becoming zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Measurement {
    pub city: String,
    pub region: String,
    pub country: String,
    pub air_quality: Option<f64>,
    pub water_pollution: Option<f64>,
}

/// Summary of the filtered view. An average of `None` means the view was
/// empty; a real average of zero is `Some(0.0)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KpiSummary {
    pub city_count: u64,
    pub average_air_quality: Option<f64>,
    pub average_water_pollution: Option<f64>,
}

impl KpiSummary {
    #[must_use]
    pub const fn has_data(&self) -> bool {
        self.city_count > 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CountryMetric {
    pub country: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TwoCountryComparison {
    pub country_a_avg: f64,
    pub country_b_avg: f64,
    pub global_avg: f64,
}

impl TwoCountryComparison {
    #[must_use]
    pub const fn country_a_vs_global(&self) -> CountryVsGlobal {
        CountryVsGlobal {
            country_avg: self.country_a_avg,
            global_avg: self.global_avg,
        }
    }

    #[must_use]
    pub const fn country_b_vs_global(&self) -> CountryVsGlobal {
        CountryVsGlobal {
            country_avg: self.country_b_avg,
            global_avg: self.global_avg,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CountryVsGlobal {
    pub country_avg: f64,
    pub global_avg: f64,
}

impl CountryVsGlobal {
    #[must_use]
    pub fn is_at_or_above_global(&self) -> bool {
        self.country_avg >= self.global_avg
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Air,
    Water,
}

impl Metric {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Air => "air",
            Self::Water => "water",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Air => "AirQuality",
            Self::Water => "WaterPollution",
        }
    }
}

impl Display for Metric {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "air" => Ok(Self::Air),
            "water" => Ok(Self::Water),
            other => Err(format!("unknown metric `{other}` (expected `air` or `water`)")),
        }
    }
}

#[must_use]
pub fn json_schema() -> Value {
    let schema = schemars::schema_for!(ResponseModels);
    match serde_json::to_value(schema) {
        Ok(value) => value,
        Err(error) => {
            panic!("failed to serialize generated response schema: {error}");
        }
    }
}

#[derive(JsonSchema)]
#[allow(dead_code)]
struct ResponseModels {
    rows: Vec<Measurement>,
    kpis: KpiSummary,
    top_countries: Vec<CountryMetric>,
    two_country_comparison: TwoCountryComparison,
    country_vs_global: CountryVsGlobal,
    metric: Metric,
}
