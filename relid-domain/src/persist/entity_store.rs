//! 存储协作方协议
//!
use crate::error::IdentityResult;
use crate::key::{ComponentPath, KeyValue};
use crate::predicate::Predicate;
use crate::record::EntityRecord;
use async_trait::async_trait;
use bon::Builder;
use std::sync::Arc;

/// 过滤扫描的排序与分页选项
///
/// # 示例
///
/// ```
/// use relid_domain::persist::QueryOptions;
///
/// let options = QueryOptions::builder()
///     .order_by("member_name".parse().unwrap())
///     .limit(10)
///     .build();
/// assert_eq!(options.limit(), Some(10));
/// ```
#[derive(Builder, Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    order_by: Option<ComponentPath>,
    #[builder(default)]
    descending: bool,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl QueryOptions {
    pub const fn order_by(&self) -> Option<&ComponentPath> {
        self.order_by.as_ref()
    }

    pub const fn is_descending(&self) -> bool {
        self.descending
    }

    pub const fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub const fn offset(&self) -> Option<usize> {
        self.offset
    }
}

/// 存储协作方：主键查找、插入与过滤扫描
///
/// 协作方以已解析的 `KeyValue` 作为查找/索引键（相等与哈希语义与模型层
/// 一致），以 `Predicate` 作为可翻译的过滤表示。
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// 插入一条已解析的记录；键已存在时报 `DuplicateKey`，原样抛给调用方
    async fn persist(&self, record: &mut EntityRecord) -> IdentityResult<KeyValue>;

    /// 按已解析键查找
    async fn find(
        &self,
        entity_kind: &str,
        key: &KeyValue,
    ) -> IdentityResult<Option<EntityRecord>>;

    /// 过滤扫描：谓词 + 排序/分页
    async fn execute_query(
        &self,
        entity_kind: &str,
        predicate: &Predicate,
        options: &QueryOptions,
    ) -> IdentityResult<Vec<EntityRecord>>;
}

#[async_trait]
impl<S> EntityStore for Arc<S>
where
    S: EntityStore + ?Sized,
{
    async fn persist(&self, record: &mut EntityRecord) -> IdentityResult<KeyValue> {
        (**self).persist(record).await
    }

    async fn find(
        &self,
        entity_kind: &str,
        key: &KeyValue,
    ) -> IdentityResult<Option<EntityRecord>> {
        (**self).find(entity_kind, key).await
    }

    async fn execute_query(
        &self,
        entity_kind: &str,
        predicate: &Predicate,
        options: &QueryOptions,
    ) -> IdentityResult<Vec<EntityRecord>> {
        (**self).execute_query(entity_kind, predicate, options).await
    }
}
