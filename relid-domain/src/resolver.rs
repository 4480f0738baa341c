//! 标识解析器（Identity Resolver）
//!
//! 按描述符声明顺序装配记录的复合键：自有分量从草稿读取（缺失即失败，
//! 自动生成的分量可由 `KeyGenerator` 补齐），派生分量从父关联的已解析
//! 键快照中拷贝。三级链（祖-父-子）自下而上解析：父未解析则子解析失败。
//!
//! 解析是幂等的：父键不变时重复解析得到相同键值。父键补齐后（如插入后
//! 生成代理键）的传播需要调用方显式重新设置关联并再次解析——解析结果
//! 不与父记录活性链接（见 `record::EntityRecord::set_parent`）。
//!
use crate::descriptor::{ComponentSource, ValidatedRegistry};
use crate::error::{IdentityError, IdentityResult};
use crate::key::KeyValue;
use crate::persist::KeyGenerator;
use crate::record::{EntityRecord, KeyState};

/// 标识解析器：绑定一张已校验的描述符注册表
pub struct IdentityResolver<'r> {
    registry: &'r ValidatedRegistry,
}

impl<'r> IdentityResolver<'r> {
    #[must_use]
    pub const fn new(registry: &'r ValidatedRegistry) -> Self {
        Self { registry }
    }

    /// 解析记录的复合键（不使用代理键生成器）
    pub fn resolve(&self, record: &mut EntityRecord) -> IdentityResult<KeyValue> {
        self.resolve_inner(record, None)
    }

    /// 解析记录的复合键，自动生成的自有分量由 `generator` 补齐
    pub fn resolve_with(
        &self,
        record: &mut EntityRecord,
        generator: &dyn KeyGenerator,
    ) -> IdentityResult<KeyValue> {
        self.resolve_inner(record, Some(generator))
    }

    fn resolve_inner(
        &self,
        record: &mut EntityRecord,
        generator: Option<&dyn KeyGenerator>,
    ) -> IdentityResult<KeyValue> {
        let descriptor = self.registry.expect(record.kind())?;
        let mut key = KeyValue::new();

        for def in descriptor.components() {
            match def.source() {
                ComponentSource::Owned { generated } => {
                    let value = match (record.key_component(def.name()).cloned(), generator) {
                        (Some(v), _) => v,
                        (None, Some(generator)) if *generated => {
                            let v = generator.generate(record.kind())?;
                            // 生成值写回草稿，保证重复解析取到同一个值
                            record.set_key_component(def.name(), v.clone())?;
                            v
                        }
                        (None, _) => {
                            return Err(IdentityError::MissingOwnedComponent {
                                entity: record.kind().to_string(),
                                component: def.name().to_string(),
                            });
                        }
                    };
                    key = key.with(def.name(), value);
                }

                ComponentSource::DerivedFromParent { association, path } => {
                    let parent_key = record
                        .association(association)
                        .and_then(|a| a.resolved_key())
                        .ok_or_else(|| IdentityError::UnresolvedParent {
                            entity: record.kind().to_string(),
                            association: association.clone(),
                        })?;
                    let value = parent_key.select(path).ok_or_else(|| {
                        // 描述符已校验，形状不符只能来自运行期的父键残缺
                        IdentityError::InvalidState {
                            reason: format!(
                                "parent key {parent_key} of {} lacks component at path {path}",
                                record.kind()
                            ),
                        }
                    })?;
                    key = key.with(def.name(), value);
                }
            }
        }

        match record.key_state() {
            // 已持久化的键冻结：重算结果必须与之一致
            KeyState::Persisted(existing) => {
                if existing != &key {
                    return Err(IdentityError::InvalidState {
                        reason: format!(
                            "persisted key of {} must not change: stored {existing}, recomputed {key}",
                            record.kind()
                        ),
                    });
                }
                Ok(key)
            }
            KeyState::Unresolved | KeyState::Resolved(_) => {
                record.mark_resolved(key.clone());
                Ok(key)
            }
        }
    }
}
