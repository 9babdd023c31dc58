pub mod measurement;
pub mod query_envelope;

pub use measurement::{
    CountryMetric, CountryVsGlobal, KpiSummary, Measurement, Metric, TwoCountryComparison,
    json_schema,
};
pub use query_envelope::{
    QUERY_ENVELOPE_SCHEMA_VERSION, QueryEnvelope, QueryEnvelopeCommandFailure, QueryEnvelopeError,
    QueryEnvelopeMeta, QueryEnvelopeWarning,
};
