//! 实体记录（Entity Record）
//!
//! 动态类型的记录：实体类型名、键的生命周期状态、普通属性、父关联与
//! 自有键分量草稿。键的生命周期为：
//! 未解析（创建时） → 已解析（解析器拷贝派生分量后） → 已持久化（交给存储协作方后）。
//! 已持久化的键不可再变。
//!
//! 父关联在 `set_parent` 时对父键做快照，之后父记录的键变化不会自动传播——
//! 需要重新 `set_parent` 并显式重新解析（见 `resolver` 模块）。
//!
use crate::audit::{AuditStamp, Audited};
use crate::error::{IdentityError, IdentityResult};
use crate::key::{ComponentValue, KeyValue};
use crate::repr::{EmbeddedKey, KeySlot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 键的生命周期状态
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyState {
    #[default]
    Unresolved,
    Resolved(KeyValue),
    Persisted(KeyValue),
}

impl KeyState {
    /// 已解析（含已持久化）时返回键值
    pub const fn key(&self) -> Option<&KeyValue> {
        match self {
            Self::Unresolved => None,
            Self::Resolved(k) | Self::Persisted(k) => Some(k),
        }
    }

    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_) | Self::Persisted(_))
    }

    pub const fn is_persisted(&self) -> bool {
        matches!(self, Self::Persisted(_))
    }
}

/// 记录上的一个关联
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Association {
    /// 父记录键的快照（设置时拷贝，非活性链接）
    Parent { target_kind: String, key: KeyState },
    /// 自有外键（非标识性引用，键值由调用方直接给出）
    ForeignKey { target_kind: String, key: KeyValue },
}

impl Association {
    pub fn target_kind(&self) -> &str {
        match self {
            Self::Parent { target_kind, .. } | Self::ForeignKey { target_kind, .. } => target_kind,
        }
    }

    /// 关联目标已解析时返回其键
    pub const fn resolved_key(&self) -> Option<&KeyValue> {
        match self {
            Self::Parent { key, .. } => key.key(),
            Self::ForeignKey { key, .. } => Some(key),
        }
    }
}

/// 动态实体记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    kind: String,
    key: KeyState,
    /// 自有键分量草稿（解析前的暂存区）
    draft: BTreeMap<String, ComponentValue>,
    attributes: BTreeMap<String, serde_json::Value>,
    associations: BTreeMap<String, Association>,
    audit: AuditStamp,
}

impl EntityRecord {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            key: KeyState::Unresolved,
            draft: BTreeMap::new(),
            attributes: BTreeMap::new(),
            associations: BTreeMap::new(),
            audit: AuditStamp::new(),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub const fn key_state(&self) -> &KeyState {
        &self.key
    }

    /// 已解析（含已持久化）时返回键值
    pub const fn key(&self) -> Option<&KeyValue> {
        self.key.key()
    }

    /// 设置一个自有键分量；已持久化的记录拒绝任何键分量变更
    pub fn set_key_component(
        &mut self,
        name: impl Into<String>,
        value: impl Into<ComponentValue>,
    ) -> IdentityResult<()> {
        if self.key.is_persisted() {
            return Err(IdentityError::InvalidState {
                reason: format!("persisted key of {} must not change", self.kind),
            });
        }
        self.draft.insert(name.into(), value.into());
        Ok(())
    }

    pub fn key_component(&self, name: &str) -> Option<&ComponentValue> {
        self.draft.get(name)
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn attribute(&self, name: &str) -> Option<&serde_json::Value> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &serde_json::Value)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// 按路径段取属性（嵌套 JSON 对象逐段深入）
    pub fn attribute_at(&self, path: &crate::key::ComponentPath) -> Option<&serde_json::Value> {
        let mut segments = path.segments().iter();
        let mut current = self.attribute(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// 设置父关联：对父记录当前的键状态做快照
    ///
    /// 父记录之后的键变化不会传播到本记录；父键补齐（如插入后生成代理键）
    /// 时需要重新调用本方法并显式重新解析。
    pub fn set_parent(&mut self, association: impl Into<String>, parent: &EntityRecord) {
        self.associations.insert(
            association.into(),
            Association::Parent {
                target_kind: parent.kind.clone(),
                key: parent.key.clone(),
            },
        );
    }

    /// 设置自有外键引用（非标识性关联）
    pub fn set_foreign_key(
        &mut self,
        association: impl Into<String>,
        target_kind: impl Into<String>,
        key: KeyValue,
    ) {
        self.associations.insert(
            association.into(),
            Association::ForeignKey {
                target_kind: target_kind.into(),
                key,
            },
        );
    }

    pub fn association(&self, name: &str) -> Option<&Association> {
        self.associations.get(name)
    }

    /// 以内嵌键值对象填充自有分量草稿（派生槽位留待解析器补齐）
    pub fn embed_key(&mut self, embedded: EmbeddedKey) -> IdentityResult<()> {
        for (name, slot) in embedded.into_slots() {
            if let KeySlot::Value(value) = slot {
                self.set_key_component(name, value)?;
            }
        }
        Ok(())
    }

    pub(crate) fn mark_resolved(&mut self, key: KeyValue) {
        self.key = KeyState::Resolved(key);
    }

    /// 持久化成功后由存储协作方调用；未解析的记录不得持久化
    pub fn mark_persisted(&mut self) -> IdentityResult<()> {
        match std::mem::take(&mut self.key) {
            KeyState::Resolved(k) | KeyState::Persisted(k) => {
                self.key = KeyState::Persisted(k);
                Ok(())
            }
            KeyState::Unresolved => Err(IdentityError::InvalidState {
                reason: format!("unresolved {} record must not be persisted", self.kind),
            }),
        }
    }
}

impl Audited for EntityRecord {
    fn audit(&self) -> &AuditStamp {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditStamp {
        &mut self.audit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_snapshot_not_live_linked() {
        let mut parent = EntityRecord::new("Parent");
        parent.mark_resolved(KeyValue::new().with("id", "P1"));

        let mut child = EntityRecord::new("Child");
        child.set_parent("parent", &parent);

        // 父键之后变化，快照保持原值
        parent.mark_resolved(KeyValue::new().with("id", "P2"));
        let snapshot = child.association("parent").unwrap().resolved_key().unwrap();
        assert_eq!(snapshot, &KeyValue::new().with("id", "P1"));
    }

    #[test]
    fn test_persisted_key_components_frozen() {
        let mut record = EntityRecord::new("Parent");
        record.set_key_component("id", "P1").unwrap();
        record.mark_resolved(KeyValue::new().with("id", "P1"));
        record.mark_persisted().unwrap();

        let err = record.set_key_component("id", "P2").unwrap_err();
        assert!(matches!(err, IdentityError::InvalidState { .. }));
    }

    #[test]
    fn test_unresolved_record_cannot_persist() {
        let mut record = EntityRecord::new("Parent");
        assert!(record.mark_persisted().is_err());
    }

    #[test]
    fn test_unset_parent_association_reports_unresolved() {
        let parent = EntityRecord::new("Parent");
        let mut child = EntityRecord::new("Child");
        child.set_parent("parent", &parent);
        assert!(child.association("parent").unwrap().resolved_key().is_none());
    }
}
