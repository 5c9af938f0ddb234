//! Document repository trait and query types.

use std::cmp::Ordering;
use std::str::FromStr;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{StoreError, StoreResult};

/// A stored document: a JSON object keyed by field name.
pub type Record = Map<String, Value>;

/// Field stamped when a record is created.
pub const CREATED_AT: &str = "createdAt";

/// Field restamped on every write.
pub const UPDATED_AT: &str = "updatedAt";

/// Field a record's id is exposed under when read back.
pub const ID: &str = "id";

/// Comparison used by a query filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    /// Field is an array holding the value
    #[serde(rename = "array-contains")]
    ArrayContains,
    /// Value is an array holding the field
    #[serde(rename = "in")]
    In,
}

impl FilterOp {
    /// Test a stored field against the filter value.
    pub fn matches(self, field: &Value, value: &Value) -> bool {
        match self {
            FilterOp::Eq => values_equal(field, value),
            FilterOp::Ne => !values_equal(field, value),
            FilterOp::Lt => compare_values(field, value) == Some(Ordering::Less),
            FilterOp::Le => matches!(
                compare_values(field, value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FilterOp::Gt => compare_values(field, value) == Some(Ordering::Greater),
            FilterOp::Ge => matches!(
                compare_values(field, value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOp::ArrayContains => field
                .as_array()
                .is_some_and(|items| items.iter().any(|item| values_equal(item, value))),
            FilterOp::In => value
                .as_array()
                .is_some_and(|items| items.iter().any(|item| values_equal(field, item))),
        }
    }
}

impl FromStr for FilterOp {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "==" => Ok(FilterOp::Eq),
            "!=" => Ok(FilterOp::Ne),
            "<" => Ok(FilterOp::Lt),
            "<=" => Ok(FilterOp::Le),
            ">" => Ok(FilterOp::Gt),
            ">=" => Ok(FilterOp::Ge),
            "array-contains" => Ok(FilterOp::ArrayContains),
            "in" => Ok(FilterOp::In),
            other => Err(StoreError::InvalidRecord(format!(
                "Unknown filter operator: {other}"
            ))),
        }
    }
}

/// One `field op value` condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Shorthand for an equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Eq, value)
    }

    /// True if `record` satisfies the condition. Records without the field
    /// never match, whatever the operator.
    pub fn matches(&self, record: &Record) -> bool {
        record
            .get(&self.field)
            .is_some_and(|field| self.op.matches(field, &self.value))
    }
}

/// Sort order for [`QueryOptions::order_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Filters, ordering and limit applied by [`Repository::query`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// All filters must match
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub order_by: Option<(String, SortDirection)>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Apply filters, ordering and limit to an unordered set of records.
    ///
    /// Records missing the order field sort last in either direction.
    pub fn apply(&self, records: impl IntoIterator<Item = Record>) -> Vec<Record> {
        let mut matched: Vec<Record> = records
            .into_iter()
            .filter(|record| self.filters.iter().all(|f| f.matches(record)))
            .collect();

        if let Some((field, direction)) = &self.order_by {
            matched.sort_by(|a, b| match (a.get(field), b.get(field)) {
                (Some(x), Some(y)) => {
                    let ord = compare_values(x, y).unwrap_or(Ordering::Equal);
                    match direction {
                        SortDirection::Asc => ord,
                        SortDirection::Desc => ord.reverse(),
                    }
                }
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            });
        }

        if let Some(limit) = self.limit {
            matched.truncate(limit);
        }
        matched
    }
}

/// Equality that treats `1` and `1.0` as the same number.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => compare_values(a, b) == Some(Ordering::Equal),
        _ => a == b,
    }
}

/// Order numbers, strings and booleans; other pairs are incomparable.
///
/// Timestamps are RFC 3339 strings in UTC, so they order as strings.
fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Storage for JSON documents grouped into named collections.
///
/// Uses `async_trait` so repositories can be held as `Box<dyn Repository>`.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Insert a record under a generated id, stamping both timestamps.
    async fn create(&self, collection: &str, data: Record) -> StoreResult<String>;

    /// Insert or replace the record at `id`, stamping both timestamps.
    async fn create_with_id(&self, collection: &str, id: &str, data: Record) -> StoreResult<()>;

    /// Fetch a record with its id included, or `None` if absent.
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Record>>;

    /// Merge `data` into an existing record and restamp `updatedAt`.
    ///
    /// Fails with [`StoreError::NotFound`] if the record does not exist.
    async fn update(&self, collection: &str, id: &str, data: Record) -> StoreResult<()>;

    /// Remove a record. Removing a missing record is not an error.
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()>;

    /// Records matching `options`, each with its id included.
    async fn query(&self, collection: &str, options: &QueryOptions) -> StoreResult<Vec<Record>>;
}

/// Serialize a value that must be a JSON object.
pub fn to_record<T: Serialize + ?Sized>(value: &T) -> StoreResult<Record> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(StoreError::InvalidRecord(format!(
            "Expected a JSON object, got {other}"
        ))),
        Err(e) => Err(StoreError::InvalidRecord(e.to_string())),
    }
}

/// Deserialize a stored record into its typed form.
pub fn from_record<T: DeserializeOwned>(record: Record) -> StoreResult<T> {
    serde_json::from_value(Value::Object(record)).map_err(|e| StoreError::InvalidRecord(e.to_string()))
}

/// Serialize `value` and create it under a generated id.
pub async fn create_typed<R, T>(repo: &R, collection: &str, value: &T) -> StoreResult<String>
where
    R: Repository + ?Sized,
    T: Serialize + Sync,
{
    repo.create(collection, to_record(value)?).await
}

/// Fetch and deserialize one record.
pub async fn get_typed<R, T>(repo: &R, collection: &str, id: &str) -> StoreResult<Option<T>>
where
    R: Repository + ?Sized,
    T: DeserializeOwned,
{
    repo.get(collection, id).await?.map(from_record).transpose()
}

/// Run a query and deserialize every match.
pub async fn query_typed<R, T>(
    repo: &R,
    collection: &str,
    options: &QueryOptions,
) -> StoreResult<Vec<T>>
where
    R: Repository + ?Sized,
    T: DeserializeOwned,
{
    repo.query(collection, options)
        .await?
        .into_iter()
        .map(from_record)
        .collect()
}

/// Every record in `collection` owned by `user_id`.
pub async fn user_records<R, T>(repo: &R, collection: &str, user_id: &str) -> StoreResult<Vec<T>>
where
    R: Repository + ?Sized,
    T: DeserializeOwned,
{
    let options = QueryOptions::new().filter(Filter::eq("userId", user_id));
    query_typed(repo, collection, &options).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_filter_op_from_str() {
        assert_eq!("==".parse::<FilterOp>().unwrap(), FilterOp::Eq);
        assert_eq!("array-contains".parse::<FilterOp>().unwrap(), FilterOp::ArrayContains);
        assert!("~=".parse::<FilterOp>().is_err());
    }

    #[test]
    fn test_filter_ops() {
        let r = record(json!({"amount": 12, "tags": ["food", "work"], "month": "2024-03"}));

        assert!(Filter::eq("amount", 12.0).matches(&r));
        assert!(Filter::new("amount", FilterOp::Ne, 13).matches(&r));
        assert!(Filter::new("amount", FilterOp::Lt, 12.5).matches(&r));
        assert!(Filter::new("amount", FilterOp::Le, 12).matches(&r));
        assert!(!Filter::new("amount", FilterOp::Gt, 12).matches(&r));
        assert!(Filter::new("month", FilterOp::Ge, "2024-01").matches(&r));
        assert!(Filter::new("tags", FilterOp::ArrayContains, "work").matches(&r));
        assert!(Filter::new("month", FilterOp::In, json!(["2024-02", "2024-03"])).matches(&r));
        assert!(!Filter::new("month", FilterOp::In, "2024-03").matches(&r));
    }

    #[test]
    fn test_missing_field_never_matches() {
        let r = record(json!({"amount": 1}));
        assert!(!Filter::eq("userId", "u1").matches(&r));
        assert!(!Filter::new("userId", FilterOp::Ne, "u1").matches(&r));
    }

    #[test]
    fn test_mixed_types_are_incomparable() {
        let r = record(json!({"amount": "12"}));
        assert!(!Filter::new("amount", FilterOp::Lt, 100).matches(&r));
        assert!(!Filter::eq("amount", 12).matches(&r));
    }

    #[test]
    fn test_apply_orders_and_limits() {
        let records = vec![
            record(json!({"id": "a", "amount": 5})),
            record(json!({"id": "b"})),
            record(json!({"id": "c", "amount": 20})),
            record(json!({"id": "d", "amount": 10})),
        ];
        let options = QueryOptions::new()
            .order_by("amount", SortDirection::Desc)
            .limit(3);
        let ids: Vec<_> = options
            .apply(records)
            .into_iter()
            .map(|r| r["id"].clone())
            .collect();
        assert_eq!(ids, vec![json!("c"), json!("d"), json!("a")]);
    }

    #[test]
    fn test_to_record_rejects_non_objects() {
        assert!(to_record(&json!({"a": 1})).is_ok());
        assert!(matches!(to_record(&42), Err(StoreError::InvalidRecord(_))));
    }
}
