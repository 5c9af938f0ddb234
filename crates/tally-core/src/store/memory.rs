//! In-process repository backed by a map of collections.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};

use super::repository::{QueryOptions, Record, Repository, CREATED_AT, ID, UPDATED_AT};

/// Length of generated record ids.
const ID_LEN: usize = 20;

type Collection = BTreeMap<String, Record>;

/// [`Repository`] held entirely in memory.
///
/// Records are kept per collection in id order, which is also the order
/// queries return them in when no `order_by` is given.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in `collection`.
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }
}

/// A random 20-character alphanumeric id.
pub fn generate_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LEN)
        .map(char::from)
        .collect()
}

fn timestamp() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
}

/// Strip the id field and stamp both timestamps.
fn stamped(mut data: Record) -> Record {
    data.remove(ID);
    let now = timestamp();
    data.insert(CREATED_AT.to_string(), now.clone());
    data.insert(UPDATED_AT.to_string(), now);
    data
}

fn with_id(id: &str, record: &Record) -> Record {
    let mut out = record.clone();
    out.insert(ID.to_string(), Value::String(id.to_string()));
    out
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn create(&self, collection: &str, data: Record) -> StoreResult<String> {
        let mut collections = self.collections.write().await;
        let records = collections.entry(collection.to_string()).or_default();

        let mut id = generate_id();
        while records.contains_key(&id) {
            id = generate_id();
        }
        records.insert(id.clone(), stamped(data));
        tracing::debug!("Created {collection}/{id}");
        Ok(id)
    }

    async fn create_with_id(&self, collection: &str, id: &str, data: Record) -> StoreResult<()> {
        if id.is_empty() {
            return Err(StoreError::InvalidRecord("Record id is empty".to_string()));
        }
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), stamped(data));
        tracing::debug!("Created {collection}/{id}");
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Record>> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .and_then(|records| records.get(id))
            .map(|record| with_id(id, record)))
    }

    async fn update(&self, collection: &str, id: &str, data: Record) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        let record = collections
            .get_mut(collection)
            .and_then(|records| records.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        for (key, value) in data {
            if key != ID {
                record.insert(key, value);
            }
        }
        record.insert(UPDATED_AT.to_string(), timestamp());
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        let removed = self
            .collections
            .write()
            .await
            .get_mut(collection)
            .and_then(|records| records.remove(id));
        if removed.is_some() {
            tracing::debug!("Deleted {collection}/{id}");
        }
        Ok(())
    }

    async fn query(&self, collection: &str, options: &QueryOptions) -> StoreResult<Vec<Record>> {
        let collections = self.collections.read().await;
        let Some(records) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(options.apply(records.iter().map(|(id, record)| with_id(id, record))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, NewCategory, DEFAULT_CATEGORIES};
    use crate::store::repository::{
        create_typed, get_typed, to_record, user_records, Filter, FilterOp, SortDirection,
    };
    use serde_json::json;
    use std::sync::Arc;

    fn record(value: Value) -> Record {
        to_record(&value).unwrap()
    }

    #[test]
    fn test_generate_id() {
        let id = generate_id();
        assert_eq!(id.len(), 20);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(id, generate_id());
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = MemoryRepository::new();
        let id = repo
            .create("expenses", record(json!({"amount": 9.5, "id": "ignored"})))
            .await
            .unwrap();

        let stored = repo.get("expenses", &id).await.unwrap().unwrap();
        assert_eq!(stored["id"], json!(id));
        assert_eq!(stored["amount"], json!(9.5));
        assert!(stored[CREATED_AT].is_string());
        assert_eq!(stored[CREATED_AT], stored[UPDATED_AT]);

        assert!(repo.get("expenses", "missing").await.unwrap().is_none());
        assert!(repo.get("nothing", &id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_with_id_replaces() {
        let repo = MemoryRepository::new();
        repo.create_with_id("users", "u1", record(json!({"email": "a@x"})))
            .await
            .unwrap();
        repo.create_with_id("users", "u1", record(json!({"email": "b@x"})))
            .await
            .unwrap();

        let user = repo.get("users", "u1").await.unwrap().unwrap();
        assert_eq!(user["email"], "b@x");
        assert_eq!(repo.count("users").await, 1);
        assert!(repo.create_with_id("users", "", Record::new()).await.is_err());
    }

    #[tokio::test]
    async fn test_update_merges_and_restamps() {
        let repo = MemoryRepository::new();
        let id = repo
            .create("budgets", record(json!({"month": "2024-03", "totalBudget": 100})))
            .await
            .unwrap();
        let before = repo.get("budgets", &id).await.unwrap().unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        repo.update("budgets", &id, record(json!({"totalBudget": 250})))
            .await
            .unwrap();

        let after = repo.get("budgets", &id).await.unwrap().unwrap();
        assert_eq!(after["month"], "2024-03");
        assert_eq!(after["totalBudget"], 250);
        assert_eq!(after[CREATED_AT], before[CREATED_AT]);
        assert_ne!(after[UPDATED_AT], before[UPDATED_AT]);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let repo = MemoryRepository::new();
        let err = repo
            .update("budgets", "nope", Record::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let repo = MemoryRepository::new();
        let id = repo.create("incomes", Record::new()).await.unwrap();
        repo.delete("incomes", &id).await.unwrap();
        repo.delete("incomes", &id).await.unwrap();
        assert!(repo.get("incomes", &id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_query_filters_orders_limits() {
        let repo = MemoryRepository::new();
        for (user, amount) in [("u1", 30), ("u2", 5), ("u1", 10), ("u1", 20)] {
            repo.create("expenses", record(json!({"userId": user, "amount": amount})))
                .await
                .unwrap();
        }

        let options = QueryOptions::new()
            .filter(Filter::eq("userId", "u1"))
            .filter(Filter::new("amount", FilterOp::Ge, 15))
            .order_by("amount", SortDirection::Asc);
        let amounts: Vec<_> = repo
            .query("expenses", &options)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r["amount"].clone())
            .collect();
        assert_eq!(amounts, vec![json!(20), json!(30)]);

        let limited = repo
            .query("expenses", &QueryOptions::new().limit(2))
            .await
            .unwrap();
        assert_eq!(limited.len(), 2);
        assert!(repo.query("none", &QueryOptions::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_typed_helpers() {
        let repo = MemoryRepository::new();
        let new: NewCategory = DEFAULT_CATEGORIES[0].for_user("u1");
        let id = create_typed(&repo, "categories", &new).await.unwrap();
        create_typed(&repo, "categories", &DEFAULT_CATEGORIES[1].for_user("u2"))
            .await
            .unwrap();

        let category: Category = get_typed(&repo, "categories", &id).await.unwrap().unwrap();
        assert_eq!(category.id, id);
        assert_eq!(category.name, "Housing");
        assert_eq!(category.created_at, category.updated_at);

        let mine: Vec<Category> = user_records(&repo, "categories", "u1").await.unwrap();
        assert_eq!(mine.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_creates() {
        let repo = Arc::new(MemoryRepository::new());
        let mut handles = Vec::new();
        for i in 0..16 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.create("expenses", record(json!({"n": i}))).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(repo.count("expenses").await, 16);
    }
}
