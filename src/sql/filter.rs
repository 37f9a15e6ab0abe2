use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::QueryFragment;
use crate::config::config;
use crate::error::ApiError;

/// Search criteria combining an optional case-insensitive substring
/// match with an optional inclusive numeric interval.
///
/// Presence is expressed with `Option`: a supplied bound of zero
/// (`Some(0)`) is a real bound and emits a condition. An empty substring
/// term is treated as absent, since an empty pattern matches every row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RangeFilter {
    pub name_like: Option<String>,
    pub min_count: Option<i64>,
    pub max_count: Option<i64>,
}

impl RangeFilter {
    /// Produce the WHERE-clause fragment for this filter against the
    /// given columns, e.g. for (`name`, `num_employees`):
    ///
    ///   clause: `name ILIKE $1 AND num_employees >= $2 AND num_employees <= $3`
    ///   params: `["%net%", 50, 500]`
    ///
    /// Members are evaluated in a fixed order (term, lower bound, upper
    /// bound); absent members contribute no condition and consume no
    /// placeholder slot. With nothing present the fragment is empty and
    /// the caller must omit the WHERE keyword. Fails with BadRequest
    /// when both bounds are present and inverted.
    pub fn build(&self, name_column: &str, count_column: &str) -> Result<QueryFragment, ApiError> {
        if config().query.debug_logging {
            tracing::debug!(filter = ?self, name_column, count_column, "building range filter");
        }

        if let (Some(min), Some(max)) = (self.min_count, self.max_count) {
            if min > max {
                return Err(ApiError::bad_request(
                    "Minimum cannot be larger than maximum",
                ));
            }
        }

        let mut conditions: Vec<String> = vec![];
        let mut params: Vec<Value> = vec![];
        let mut count = 1;

        if let Some(term) = self.name_like.as_deref().filter(|t| !t.is_empty()) {
            conditions.push(format!("{} ILIKE ${}", name_column, count));
            params.push(Value::String(format!("%{}%", term)));
            count += 1;
        }
        if let Some(min) = self.min_count {
            conditions.push(format!("{} >= ${}", count_column, count));
            params.push(Value::from(min));
            count += 1;
        }
        if let Some(max) = self.max_count {
            conditions.push(format!("{} <= ${}", count_column, count));
            params.push(Value::from(max));
        }

        Ok(QueryFragment {
            clause: conditions.join(" AND "),
            params,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.name_like.is_none() && self.min_count.is_none() && self.max_count.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn all_members_in_fixed_order() {
        let filter = RangeFilter {
            name_like: Some("net".to_string()),
            min_count: Some(50),
            max_count: Some(500),
        };

        let fragment = filter.build("name", "num_employees").unwrap();
        assert_eq!(
            fragment.clause,
            "name ILIKE $1 AND num_employees >= $2 AND num_employees <= $3"
        );
        assert_eq!(fragment.params, vec![json!("%net%"), json!(50), json!(500)]);
    }

    #[test]
    fn term_only_wraps_wildcards() {
        let filter = RangeFilter {
            name_like: Some("net".to_string()),
            ..Default::default()
        };

        let fragment = filter.build("name", "num_employees").unwrap();
        assert_eq!(fragment.clause, "name ILIKE $1");
        assert_eq!(fragment.params, vec![json!("%net%")]);
    }

    #[test]
    fn single_bound_gets_first_placeholder() {
        let filter = RangeFilter {
            min_count: Some(50),
            ..Default::default()
        };

        let fragment = filter.build("name", "num_employees").unwrap();
        assert_eq!(fragment.clause, "num_employees >= $1");
        assert_eq!(fragment.params, vec![json!(50)]);

        let filter = RangeFilter {
            max_count: Some(500),
            ..Default::default()
        };

        let fragment = filter.build("name", "num_employees").unwrap();
        assert_eq!(fragment.clause, "num_employees <= $1");
        assert_eq!(fragment.params, vec![json!(500)]);
    }

    #[test]
    fn inverted_bounds_are_a_bad_request() {
        let filter = RangeFilter {
            min_count: Some(500),
            max_count: Some(50),
            ..Default::default()
        };

        let err = filter.build("name", "num_employees").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert_eq!(err.message(), "Minimum cannot be larger than maximum");
    }

    #[test]
    fn equal_bounds_are_fine() {
        let filter = RangeFilter {
            min_count: Some(50),
            max_count: Some(50),
            ..Default::default()
        };

        let fragment = filter.build("name", "num_employees").unwrap();
        assert_eq!(fragment.clause, "num_employees >= $1 AND num_employees <= $2");
    }

    #[test]
    fn zero_bound_is_present() {
        let filter = RangeFilter {
            min_count: Some(0),
            ..Default::default()
        };

        let fragment = filter.build("name", "num_employees").unwrap();
        assert_eq!(fragment.clause, "num_employees >= $1");
        assert_eq!(fragment.params, vec![json!(0)]);
    }

    #[test]
    fn empty_term_is_absent() {
        let filter = RangeFilter {
            name_like: Some(String::new()),
            max_count: Some(500),
            ..Default::default()
        };

        let fragment = filter.build("name", "num_employees").unwrap();
        assert_eq!(fragment.clause, "num_employees <= $1");
        assert_eq!(fragment.params, vec![json!(500)]);
    }

    #[test]
    fn nothing_present_yields_empty_fragment() {
        let fragment = RangeFilter::default().build("name", "num_employees").unwrap();
        assert!(fragment.is_empty());
        assert!(fragment.params.is_empty());
        assert_eq!(fragment.next_placeholder(), 1);
    }

    #[test]
    fn deserializes_camel_case_members() {
        let filter: RangeFilter =
            serde_json::from_value(json!({ "nameLike": "net", "minCount": 50 })).unwrap();
        assert_eq!(filter.name_like.as_deref(), Some("net"));
        assert_eq!(filter.min_count, Some(50));
        assert_eq!(filter.max_count, None);
    }
}
