use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, PgPool};

use super::{bind_value, log_query};
use crate::error::ApiError;
use crate::sql::{ColumnMap, PartialUpdate, RangeFilter};

/// Client-facing field names that differ from their columns
const UPDATE_COLUMNS: ColumnMap<'static> = ColumnMap::new(&[
    ("numEmployees", "num_employees"),
    ("logoUrl", "logo_url"),
]);

const RETURN_COLUMNS: &str = "handle, name, description, num_employees, logo_url";

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: Option<String>,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: Option<String>,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

/// Partial update: only supplied fields change
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl CompanyPatch {
    /// Supplied fields as ordered (field, value) entries under their
    /// client-facing names, ready for the update builder
    fn entries(&self) -> Vec<(String, Value)> {
        let mut fields = vec![];
        if let Some(name) = &self.name {
            fields.push(("name".to_string(), Value::String(name.clone())));
        }
        if let Some(description) = &self.description {
            fields.push(("description".to_string(), Value::String(description.clone())));
        }
        if let Some(num_employees) = self.num_employees {
            fields.push(("numEmployees".to_string(), Value::from(num_employees)));
        }
        if let Some(logo_url) = &self.logo_url {
            fields.push(("logoUrl".to_string(), Value::String(logo_url.clone())));
        }
        fields
    }
}

/// Search parameters for the company listing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyFilter {
    pub name_like: Option<String>,
    pub min_employees: Option<i64>,
    pub max_employees: Option<i64>,
}

impl CompanyFilter {
    fn range(&self) -> RangeFilter {
        RangeFilter {
            name_like: self.name_like.clone(),
            min_count: self.min_employees,
            max_count: self.max_employees,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.range().is_empty()
    }
}

impl Company {
    /// Create a company; fails with BadRequest when the handle is taken
    pub async fn create(pool: &PgPool, data: &NewCompany) -> Result<Company, ApiError> {
        let duplicate =
            sqlx::query_scalar::<_, String>("SELECT handle FROM companies WHERE handle = $1")
                .bind(&data.handle)
                .fetch_optional(pool)
                .await?;
        if duplicate.is_some() {
            return Err(ApiError::bad_request(format!(
                "Duplicate company: {}",
                data.handle
            )));
        }

        let query = format!(
            "INSERT INTO companies (handle, name, description, num_employees, logo_url) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            RETURN_COLUMNS
        );
        log_query(&query);

        let company = sqlx::query_as::<_, Company>(&query)
            .bind(&data.handle)
            .bind(&data.name)
            .bind(&data.description)
            .bind(data.num_employees)
            .bind(&data.logo_url)
            .fetch_one(pool)
            .await?;
        Ok(company)
    }

    pub async fn find_all(pool: &PgPool) -> Result<Vec<Company>, ApiError> {
        let query = format!("SELECT {} FROM companies ORDER BY name", RETURN_COLUMNS);
        log_query(&query);

        Ok(sqlx::query_as::<_, Company>(&query).fetch_all(pool).await?)
    }

    /// Find companies matching the filter; an empty filter lists everything
    pub async fn find_filtered(
        pool: &PgPool,
        filter: &CompanyFilter,
    ) -> Result<Vec<Company>, ApiError> {
        let fragment = filter.range().build("name", "num_employees")?;

        let where_clause = if fragment.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", fragment.clause)
        };
        let query = format!(
            "SELECT {} FROM companies{} ORDER BY name",
            RETURN_COLUMNS, where_clause
        );
        log_query(&query);

        let mut q = sqlx::query_as::<_, Company>(&query);
        for param in &fragment.params {
            q = bind_value(q, param);
        }
        Ok(q.fetch_all(pool).await?)
    }

    pub async fn get(pool: &PgPool, handle: &str) -> Result<Company, ApiError> {
        let query = format!("SELECT {} FROM companies WHERE handle = $1", RETURN_COLUMNS);
        log_query(&query);

        sqlx::query_as::<_, Company>(&query)
            .bind(handle)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("No company: {}", handle)))
    }

    /// Apply a partial update; only the fields present in the patch change
    pub async fn update(
        pool: &PgPool,
        handle: &str,
        patch: &CompanyPatch,
    ) -> Result<Company, ApiError> {
        let fragment = PartialUpdate::build(&patch.entries(), UPDATE_COLUMNS)?;

        let query = format!(
            "UPDATE companies SET {} WHERE handle = ${} RETURNING {}",
            fragment.clause,
            fragment.next_placeholder(),
            RETURN_COLUMNS
        );
        log_query(&query);

        let mut q = sqlx::query_as::<_, Company>(&query);
        for param in &fragment.params {
            q = bind_value(q, param);
        }
        q.bind(handle)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("No company: {}", handle)))
    }

    pub async fn remove(pool: &PgPool, handle: &str) -> Result<(), ApiError> {
        let removed = sqlx::query_scalar::<_, String>(
            "DELETE FROM companies WHERE handle = $1 RETURNING handle",
        )
        .bind(handle)
        .fetch_optional(pool)
        .await?;

        if removed.is_none() {
            return Err(ApiError::not_found(format!("No company: {}", handle)));
        }
        Ok(())
    }
}
