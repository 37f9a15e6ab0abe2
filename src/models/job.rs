use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, PgPool};

use super::{bind_value, log_query};
use crate::error::ApiError;
use crate::sql::{ColumnMap, PartialUpdate, RangeFilter};

const RETURN_COLUMNS: &str = "id, title, salary, equity, company_handle";

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

/// Partial update: only supplied fields change. The company a job
/// belongs to is fixed at creation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobPatch {
    pub title: Option<String>,
    pub salary: Option<i32>,
    pub equity: Option<f64>,
}

impl JobPatch {
    /// Job patch fields already match their columns, so the update
    /// builder runs with an empty column map.
    fn entries(&self) -> Vec<(String, Value)> {
        let mut fields = vec![];
        if let Some(title) = &self.title {
            fields.push(("title".to_string(), Value::String(title.clone())));
        }
        if let Some(salary) = self.salary {
            fields.push(("salary".to_string(), Value::from(salary)));
        }
        if let Some(equity) = self.equity {
            fields.push(("equity".to_string(), Value::from(equity)));
        }
        fields
    }
}

/// Search parameters for the job listing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobFilter {
    pub title_like: Option<String>,
    pub min_salary: Option<i64>,
    pub max_salary: Option<i64>,
}

impl JobFilter {
    fn range(&self) -> RangeFilter {
        RangeFilter {
            name_like: self.title_like.clone(),
            min_count: self.min_salary,
            max_count: self.max_salary,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.range().is_empty()
    }
}

impl Job {
    /// Create a job; fails with BadRequest when the company is unknown
    pub async fn create(pool: &PgPool, data: &NewJob) -> Result<Job, ApiError> {
        let company =
            sqlx::query_scalar::<_, String>("SELECT handle FROM companies WHERE handle = $1")
                .bind(&data.company_handle)
                .fetch_optional(pool)
                .await?;
        if company.is_none() {
            return Err(ApiError::bad_request(format!(
                "Company doesn't exist: {}",
                data.company_handle
            )));
        }

        let query = format!(
            "INSERT INTO jobs (title, salary, equity, company_handle) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            RETURN_COLUMNS
        );
        log_query(&query);

        let job = sqlx::query_as::<_, Job>(&query)
            .bind(&data.title)
            .bind(data.salary)
            .bind(data.equity)
            .bind(&data.company_handle)
            .fetch_one(pool)
            .await?;
        Ok(job)
    }

    pub async fn find_all(pool: &PgPool) -> Result<Vec<Job>, ApiError> {
        let query = format!("SELECT {} FROM jobs ORDER BY title", RETURN_COLUMNS);
        log_query(&query);

        Ok(sqlx::query_as::<_, Job>(&query).fetch_all(pool).await?)
    }

    /// Find jobs matching the filter; an empty filter lists everything
    pub async fn find_filtered(pool: &PgPool, filter: &JobFilter) -> Result<Vec<Job>, ApiError> {
        let fragment = filter.range().build("title", "salary")?;

        let where_clause = if fragment.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", fragment.clause)
        };
        let query = format!(
            "SELECT {} FROM jobs{} ORDER BY title",
            RETURN_COLUMNS, where_clause
        );
        log_query(&query);

        let mut q = sqlx::query_as::<_, Job>(&query);
        for param in &fragment.params {
            q = bind_value(q, param);
        }
        Ok(q.fetch_all(pool).await?)
    }

    pub async fn get(pool: &PgPool, id: i32) -> Result<Job, ApiError> {
        let query = format!("SELECT {} FROM jobs WHERE id = $1", RETURN_COLUMNS);
        log_query(&query);

        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("No job: {}", id)))
    }

    /// Apply a partial update; only the fields present in the patch change
    pub async fn update(pool: &PgPool, id: i32, patch: &JobPatch) -> Result<Job, ApiError> {
        let fragment = PartialUpdate::build(&patch.entries(), ColumnMap::empty())?;

        let query = format!(
            "UPDATE jobs SET {} WHERE id = ${} RETURNING {}",
            fragment.clause,
            fragment.next_placeholder(),
            RETURN_COLUMNS
        );
        log_query(&query);

        let mut q = sqlx::query_as::<_, Job>(&query);
        for param in &fragment.params {
            q = bind_value(q, param);
        }
        q.bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("No job: {}", id)))
    }

    pub async fn remove(pool: &PgPool, id: i32) -> Result<(), ApiError> {
        let removed = sqlx::query_scalar::<_, i32>("DELETE FROM jobs WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        if removed.is_none() {
            return Err(ApiError::not_found(format!("No job: {}", id)));
        }
        Ok(())
    }
}
