//! 代理键生成
//!
//! 对应协作方的 `generateId(entityKind)`：为标记为自动生成的自有分量提供值。
//!
use crate::error::IdentityResult;
use crate::key::ComponentValue;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// 代理键生成器
pub trait KeyGenerator: Send + Sync {
    fn generate(&self, entity_kind: &str) -> IdentityResult<ComponentValue>;
}

impl<G> KeyGenerator for Arc<G>
where
    G: KeyGenerator + ?Sized,
{
    fn generate(&self, entity_kind: &str) -> IdentityResult<ComponentValue> {
        (**self).generate(entity_kind)
    }
}

/// 单调递增的序列生成器（所有实体类型共用一个序列）
#[derive(Debug)]
pub struct SequenceKeyGenerator {
    next: AtomicU64,
}

impl SequenceKeyGenerator {
    #[must_use]
    pub const fn new() -> Self {
        Self::starting_at(1)
    }

    #[must_use]
    pub const fn starting_at(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }
}

impl Default for SequenceKeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyGenerator for SequenceKeyGenerator {
    fn generate(&self, _entity_kind: &str) -> IdentityResult<ComponentValue> {
        Ok(ComponentValue::Uint(self.next.fetch_add(1, Ordering::Relaxed)))
    }
}

/// 随机 UUID 生成器
#[derive(Debug, Default)]
pub struct UuidKeyGenerator;

impl KeyGenerator for UuidKeyGenerator {
    fn generate(&self, _entity_kind: &str) -> IdentityResult<ComponentValue> {
        Ok(ComponentValue::Text(Uuid::new_v4().to_string()))
    }
}
