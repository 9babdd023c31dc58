pub mod analytics;
pub mod browse;
pub mod compare;
pub mod export;
pub mod schema;
