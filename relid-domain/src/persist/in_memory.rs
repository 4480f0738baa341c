//! 内存版存储协作方（InMemoryStore）
//!
//! 基于 `Mutex<BTreeMap>` 的参考实现，满足 `EntityStore` 协议：
//! - `persist`：拒绝未解析记录，键冲突原样抛出 `DuplicateKey`，成功时打审计戳；
//! - `find`：按（实体类型, 键值）精确查找；
//! - `execute_query`：按谓词过滤同类型记录，支持排序与分页。
//!
//! 典型用途：测试环境、示例与本地开发。

use crate::audit::Audited;
use crate::error::{IdentityError, IdentityResult};
use crate::key::KeyValue;
use crate::persist::{EntityStore, QueryOptions};
use crate::predicate::Predicate;
use crate::record::EntityRecord;
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Mutex;

type StoreMap = BTreeMap<(String, KeyValue), EntityRecord>;

/// 简单的内存存储实现
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: Mutex<StoreMap>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前保存的记录条数
    pub fn len(&self) -> IdentityResult<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> IdentityResult<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> IdentityResult<std::sync::MutexGuard<'_, StoreMap>> {
        self.records.lock().map_err(|_| IdentityError::InvalidState {
            reason: "in-memory store lock poisoned".to_string(),
        })
    }
}

#[async_trait]
impl EntityStore for InMemoryStore {
    async fn persist(&self, record: &mut EntityRecord) -> IdentityResult<KeyValue> {
        let key = record
            .key()
            .ok_or_else(|| IdentityError::InvalidState {
                reason: format!("unresolved {} record must not be persisted", record.kind()),
            })?
            .clone();

        let mut records = self.lock()?;
        let slot = (record.kind().to_string(), key.clone());
        // 首次插入键冲突即报错；已持久化的记录允许按原键更新
        if records.contains_key(&slot) && !record.key_state().is_persisted() {
            return Err(IdentityError::DuplicateKey {
                entity: record.kind().to_string(),
                key: key.to_string(),
            });
        }

        record.touch_now();
        record.mark_persisted()?;
        records.insert(slot, record.clone());
        Ok(key)
    }

    async fn find(
        &self,
        entity_kind: &str,
        key: &KeyValue,
    ) -> IdentityResult<Option<EntityRecord>> {
        let records = self.lock()?;
        Ok(records
            .get(&(entity_kind.to_string(), key.clone()))
            .cloned())
    }

    async fn execute_query(
        &self,
        entity_kind: &str,
        predicate: &Predicate,
        options: &QueryOptions,
    ) -> IdentityResult<Vec<EntityRecord>> {
        let records = self.lock()?;
        // BTreeMap 的键序保证无排序选项时结果仍然确定
        let mut matched: Vec<EntityRecord> = records
            .iter()
            .filter(|((kind, _), record)| kind.as_str() == entity_kind && predicate.matches(record))
            .map(|(_, record)| record.clone())
            .collect();
        drop(records);

        if let Some(path) = options.order_by() {
            matched.sort_by(|a, b| compare_values(a.attribute_at(path), b.attribute_at(path)));
        }
        if options.is_descending() {
            matched.reverse();
        }

        let offset = options.offset().unwrap_or(0);
        let mut page: Vec<EntityRecord> = matched.into_iter().skip(offset).collect();
        if let Some(limit) = options.limit() {
            page.truncate(limit);
        }
        Ok(page)
    }
}

/// 排序用的属性值比较：缺失值排在最前，数值按 f64，其余按 JSON 文本
fn compare_values(a: Option<&serde_json::Value>, b: Option<&serde_json::Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a, b) {
            (serde_json::Value::Number(x), serde_json::Value::Number(y)) => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
            (serde_json::Value::String(x), serde_json::Value::String(y)) => x.cmp(y),
            (serde_json::Value::Bool(x), serde_json::Value::Bool(y)) => x.cmp(y),
            _ => a.to_string().cmp(&b.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(kind: &str, id: &str) -> EntityRecord {
        let mut record = EntityRecord::new(kind);
        record.set_key_component("id", id).unwrap();
        record.set_attribute("name", id);
        let key = KeyValue::new().with("id", id);
        // 测试里直接借用 mark_resolved 的 crate 内可见性
        record.mark_resolved(key);
        record
    }

    #[tokio::test]
    async fn test_persist_rejects_unresolved() {
        let store = InMemoryStore::new();
        let mut record = EntityRecord::new("Parent");
        assert!(store.persist(&mut record).await.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_key_surfaces_unchanged() {
        let store = InMemoryStore::new();
        let mut first = resolved("Parent", "P1");
        store.persist(&mut first).await.unwrap();

        let mut dup = resolved("Parent", "P1");
        let err = store.persist(&mut dup).await.unwrap_err();
        assert!(matches!(err, IdentityError::DuplicateKey { .. }));
    }

    #[tokio::test]
    async fn test_persisted_record_can_be_updated() {
        let store = InMemoryStore::new();
        let mut record = resolved("Parent", "P1");
        store.persist(&mut record).await.unwrap();

        record.set_attribute("name", "renamed");
        store.persist(&mut record).await.unwrap();

        let key = KeyValue::new().with("id", "P1");
        let found = store.find("Parent", &key).await.unwrap().unwrap();
        assert_eq!(found.attribute("name").unwrap(), "renamed");
    }

    #[tokio::test]
    async fn test_persist_stamps_audit() {
        let store = InMemoryStore::new();
        let mut record = resolved("Parent", "P1");
        assert!(record.audit().created_at().is_none());
        store.persist(&mut record).await.unwrap();
        assert!(record.audit().created_at().is_some());
    }

    #[tokio::test]
    async fn test_query_order_and_pagination() {
        let store = InMemoryStore::new();
        for id in ["b", "a", "c"] {
            store.persist(&mut resolved("Parent", id)).await.unwrap();
        }

        let options = QueryOptions::builder()
            .order_by("name".parse().unwrap())
            .build();
        let all = store
            .execute_query("Parent", &Predicate::All, &options)
            .await
            .unwrap();
        let names: Vec<&str> = all
            .iter()
            .map(|r| r.attribute("name").unwrap().as_str().unwrap())
            .collect();
        assert_eq!(names, ["a", "b", "c"]);

        let page = store
            .execute_query(
                "Parent",
                &Predicate::All,
                &QueryOptions::builder()
                    .order_by("name".parse().unwrap())
                    .descending(true)
                    .limit(1)
                    .offset(1)
                    .build(),
            )
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].attribute("name").unwrap(), "b");
    }

    #[tokio::test]
    async fn test_query_filters_by_kind() {
        let store = InMemoryStore::new();
        store.persist(&mut resolved("Parent", "P1")).await.unwrap();
        store.persist(&mut resolved("Child", "C1")).await.unwrap();

        let found = store
            .execute_query("Child", &Predicate::All, &QueryOptions::default())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind(), "Child");
    }
}
