use serde_json::Value;

/// A partial SQL string with numbered placeholders plus the values to
/// bind to them, in order: placeholder `$N` corresponds to `params[N-1]`.
///
/// The fragment is spliced into a statement template by the model layer;
/// nothing here executes SQL.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryFragment {
    pub clause: String,
    pub params: Vec<Value>,
}

impl QueryFragment {
    /// True when no conditions were produced. Callers must omit the
    /// surrounding keyword (WHERE) entirely in that case.
    pub fn is_empty(&self) -> bool {
        self.clause.is_empty()
    }

    /// Placeholder index for the first value a caller binds after this
    /// fragment's params, e.g. the row key in `UPDATE ... WHERE handle = $N`.
    pub fn next_placeholder(&self) -> usize {
        self.params.len() + 1
    }
}

/// Maps client-facing field names to database column names.
///
/// Fields without an entry resolve to themselves, so a partial (or
/// empty) map is valid. The map is never validated against the fields
/// actually supplied; the caller owns its completeness.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnMap<'a> {
    entries: &'a [(&'a str, &'a str)],
}

impl<'a> ColumnMap<'a> {
    pub const fn new(entries: &'a [(&'a str, &'a str)]) -> Self {
        Self { entries }
    }

    pub const fn empty() -> Self {
        Self { entries: &[] }
    }

    /// Resolve a field name to its column name, falling back to the
    /// field name verbatim when unmapped.
    pub fn resolve<'f>(&'f self, field: &'f str) -> &'f str {
        self.entries
            .iter()
            .find(|(from, _)| *from == field)
            .map(|(_, to)| *to)
            .unwrap_or(field)
    }
}
