use serde_json::Value;

use super::types::{ColumnMap, QueryFragment};
use crate::config::config;
use crate::error::ApiError;

/// Builds the SET clause of a partial UPDATE from the subset of fields a
/// client actually supplied.
pub struct PartialUpdate;

impl PartialUpdate {
    /// Given `[("firstName", "Aliya"), ("age", 32)]` and a column map of
    /// `{"firstName" => "first_name"}`, produces:
    ///
    ///   clause: `"first_name"=$1, "age"=$2`
    ///   params: `["Aliya", 32]`
    ///
    /// Entries are consumed in slice order and values pass through
    /// unchanged (nulls included), so placeholder `$i` always lines up
    /// with `params[i-1]`. Fails with BadRequest when there is nothing
    /// to update.
    pub fn build(fields: &[(String, Value)], columns: ColumnMap) -> Result<QueryFragment, ApiError> {
        if config().query.debug_logging {
            tracing::debug!(field_count = fields.len(), "building partial update");
        }

        if fields.is_empty() {
            return Err(ApiError::bad_request("No data to update"));
        }

        let assignments: Vec<String> = fields
            .iter()
            .enumerate()
            .map(|(idx, (field, _))| format!("\"{}\"=${}", columns.resolve(field), idx + 1))
            .collect();

        Ok(QueryFragment {
            clause: assignments.join(", "),
            params: fields.iter().map(|(_, value)| value.clone()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entries(pairs: &[(&str, Value)]) -> Vec<(String, Value)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn translates_mapped_fields_and_passes_others_through() {
        let fields = entries(&[("firstName", json!("Aliya")), ("age", json!(32))]);
        let columns = ColumnMap::new(&[("firstName", "first_name")]);

        let fragment = PartialUpdate::build(&fields, columns).unwrap();
        assert_eq!(fragment.clause, "\"first_name\"=$1, \"age\"=$2");
        assert_eq!(fragment.params, vec![json!("Aliya"), json!(32)]);
    }

    #[test]
    fn empty_map_passes_every_field_through() {
        let fields = entries(&[("title", json!("Engineer")), ("salary", json!(90000))]);

        let fragment = PartialUpdate::build(&fields, ColumnMap::empty()).unwrap();
        assert_eq!(fragment.clause, "\"title\"=$1, \"salary\"=$2");
        assert_eq!(fragment.params, vec![json!("Engineer"), json!(90000)]);
    }

    #[test]
    fn no_fields_is_a_bad_request() {
        let err = PartialUpdate::build(&[], ColumnMap::new(&[("firstName", "first_name")]))
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn placeholder_order_matches_value_order() {
        let fields = entries(&[
            ("name", json!("Acme")),
            ("description", Value::Null),
            ("numEmployees", json!(0)),
            ("logoUrl", json!("https://acme.test/logo.png")),
        ]);
        let columns = ColumnMap::new(&[
            ("numEmployees", "num_employees"),
            ("logoUrl", "logo_url"),
        ]);

        let fragment = PartialUpdate::build(&fields, columns).unwrap();
        assert_eq!(
            fragment.clause,
            "\"name\"=$1, \"description\"=$2, \"num_employees\"=$3, \"logo_url\"=$4"
        );
        // Values untouched, null included, same order as the input
        assert_eq!(
            fragment.params,
            vec![
                json!("Acme"),
                Value::Null,
                json!(0),
                json!("https://acme.test/logo.png"),
            ]
        );
        assert_eq!(fragment.next_placeholder(), 5);
    }
}
