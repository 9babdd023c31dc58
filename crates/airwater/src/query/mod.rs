pub mod engine;
pub mod error;
pub mod filter;
pub mod sql;
pub mod task;

pub use engine::{DEFAULT_TOP_N, QueryEngine, ROW_CAP};
pub use error::{ErrorKind, QueryError, Result};
pub use filter::{Field, FilterSet, Operator, Predicate, build_predicates};
pub use sql::{TableLayout, WhereClause, quote_identifier, render_where};
pub use task::{QueryTask, TaskFailure, TaskOutcome};
