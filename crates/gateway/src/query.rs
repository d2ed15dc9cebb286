//! Request builders for the data gateway.
//!
//! A [`Query`] is a table name, a conjunction of equality filters, an
//! optional single-column ordering and an optional row limit. An
//! [`Update`] is always addressed by record id *and* an identity scope so
//! the portal can never patch another user's row.

use medportal_core::types::RecordId;
use serde_json::Value;

/// A remote row. Always a JSON object.
pub type Row = Value;

/// Sort direction for [`Query::order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Single-column ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub direction: Direction,
}

/// A filtered, ordered, bounded read of one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub filters: Vec<(String, Value)>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    /// Start a query against `table` with no filters.
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    /// Add an equality filter `column = value`.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    pub fn order(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.order = Some(Order {
            column: column.into(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether `row` satisfies every equality filter.
    pub fn matches(&self, row: &Row) -> bool {
        self.filters
            .iter()
            .all(|(column, value)| row.get(column) == Some(value))
    }
}

/// A partial update of one record, scoped to an identity column.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: String,
    pub id: RecordId,
    pub scope: (String, Value),
    pub patch: serde_json::Map<String, Value>,
}

impl Update {
    /// Address record `id` in `table`, visible only when `scope_column`
    /// equals `scope_value`.
    pub fn new(
        table: impl Into<String>,
        id: RecordId,
        scope_column: impl Into<String>,
        scope_value: impl Into<Value>,
    ) -> Self {
        Self {
            table: table.into(),
            id,
            scope: (scope_column.into(), scope_value.into()),
            patch: serde_json::Map::new(),
        }
    }

    /// Set `column` to `value` in the patch.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.patch.insert(column.into(), value.into());
        self
    }

    /// Whether `row` is the addressed record within the scope.
    pub fn targets(&self, row: &Row) -> bool {
        let id_matches = row
            .get("id")
            .and_then(Value::as_str)
            .is_some_and(|id| id == self.id.to_string());
        let (column, value) = &self.scope;
        id_matches && row.get(column) == Some(value)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn query_builder_accumulates_filters() {
        let q = Query::from("citas")
            .eq("user_id", "u1")
            .order("fecha", Direction::Ascending)
            .limit(5);
        assert_eq!(q.table, "citas");
        assert_eq!(q.filters, vec![("user_id".to_string(), json!("u1"))]);
        assert_eq!(q.order.as_ref().map(|o| o.direction), Some(Direction::Ascending));
        assert_eq!(q.limit, Some(5));
    }

    #[test]
    fn query_matches_all_filters() {
        let q = Query::from("t").eq("user_id", "u1").eq("leida", false);
        assert!(q.matches(&json!({"user_id": "u1", "leida": false})));
        assert!(!q.matches(&json!({"user_id": "u1", "leida": true})));
        assert!(!q.matches(&json!({"leida": false})));
    }

    #[test]
    fn update_requires_id_and_scope() {
        let id = RecordId::new_v4();
        let upd = Update::new("notificaciones", id, "user_id", "u1").set("leida", true);
        assert!(upd.targets(&json!({"id": id.to_string(), "user_id": "u1"})));
        assert!(!upd.targets(&json!({"id": id.to_string(), "user_id": "u2"})));
        assert!(!upd.targets(&json!({"id": RecordId::new_v4().to_string(), "user_id": "u1"})));
        assert_eq!(upd.patch.get("leida"), Some(&json!(true)));
    }
}
