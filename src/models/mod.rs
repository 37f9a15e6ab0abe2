use serde_json::Value;
use sqlx::postgres::PgArguments;
use sqlx::FromRow;

use crate::config::config;

pub mod company;
pub mod job;

pub use company::{Company, CompanyFilter, CompanyPatch, NewCompany};
pub use job::{Job, JobFilter, JobPatch, NewJob};

/// Bind a fragment param to the next positional placeholder
pub(crate) fn bind_value<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(u) = n.as_u64() {
                // Postgres doesn't have u64; cast down if safe
                q.bind(u as i64)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s),
        // The builders only produce scalars; compound values bind as text
        Value::Array(_) | Value::Object(_) => q.bind(v.to_string()),
    }
}

pub(crate) fn log_query(query: &str) {
    if config().database.enable_query_logging {
        tracing::debug!(%query, "executing");
    }
}
