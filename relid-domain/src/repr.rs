//! 复合键的两种构造表示
//!
//! 同一个逻辑标识支持两种写法，二者归一到同一个 `KeyValue`，相等与哈希
//! 逻辑不重复实现：
//! - `EmbeddedKey`：内嵌标识类风格——键是记录上独立于属性的一等值，
//!   派生分量留空槽位，由解析器从父关联补齐；
//! - `ShadowKey`：外部影子键风格——与实体类型分离、可独立构造的同形键，
//!   用于查找时直接给出全部分量。
//!
use crate::error::{IdentityError, IdentityResult};
use crate::key::{ComponentValue, KeyValue};

/// 内嵌键的一个槽位
#[derive(Debug, Clone, PartialEq)]
pub enum KeySlot {
    /// 自有分量：构造时给定值
    Value(ComponentValue),
    /// 派生分量：解析时从父关联的键中拷贝
    Derived,
}

/// 内嵌键值对象（embedded-key 表示）
///
/// # 示例
///
/// ```
/// use relid_domain::repr::EmbeddedKey;
///
/// // ChildId { parent: 派生, child_id: "C1" }
/// let id = EmbeddedKey::new().derived("parent").with("child_id", "C1");
/// assert!(id.has_pending());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddedKey {
    slots: Vec<(String, KeySlot)>,
}

impl EmbeddedKey {
    #[must_use]
    pub const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// 追加一个已赋值的自有槽位
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ComponentValue>) -> Self {
        self.slots.push((name.into(), KeySlot::Value(value.into())));
        self
    }

    /// 追加一个待派生槽位
    #[must_use]
    pub fn derived(mut self, name: impl Into<String>) -> Self {
        self.slots.push((name.into(), KeySlot::Derived));
        self
    }

    /// 是否还有未补齐的派生槽位
    pub fn has_pending(&self) -> bool {
        self.slots.iter().any(|(_, s)| matches!(s, KeySlot::Derived))
    }

    pub fn into_slots(self) -> Vec<(String, KeySlot)> {
        self.slots
    }

    /// 全部槽位都已赋值时直接转为键值（非标识性复合键的场景）
    pub fn try_into_key_value(self) -> IdentityResult<KeyValue> {
        let mut key = KeyValue::new();
        for (name, slot) in self.slots {
            match slot {
                KeySlot::Value(v) => key = key.with(name, v),
                KeySlot::Derived => {
                    return Err(IdentityError::InvalidState {
                        reason: format!("embedded key component {name} is still pending"),
                    });
                }
            }
        }
        Ok(key)
    }
}

/// 外部影子键（external-key 表示）
///
/// 与记录无关、可独立构造的同形键，常用于主键查找。
///
/// # 示例
///
/// ```
/// use relid_domain::key::KeyValue;
/// use relid_domain::repr::ShadowKey;
///
/// let shadow = ShadowKey::new().with("id1", "P1").with("id2", "P2");
/// let key: KeyValue = shadow.into();
/// assert_eq!(key, KeyValue::new().with("id1", "P1").with("id2", "P2"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShadowKey {
    components: Vec<(String, ComponentValue)>,
}

impl ShadowKey {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ComponentValue>) -> Self {
        self.components.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn into_key_value(self) -> KeyValue {
        let mut key = KeyValue::new();
        for (name, value) in self.components {
            key = key.with(name, value);
        }
        key
    }
}

impl From<ShadowKey> for KeyValue {
    fn from(shadow: ShadowKey) -> Self {
        shadow.into_key_value()
    }
}

impl From<ShadowKey> for ComponentValue {
    fn from(shadow: ShadowKey) -> Self {
        Self::Key(shadow.into_key_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 两种表示对同一逻辑标识产生相同的 KeyValue
    #[test]
    fn test_representations_agree() {
        let embedded = EmbeddedKey::new()
            .with("id1", "P1")
            .with("id2", "P2")
            .try_into_key_value()
            .unwrap();
        let shadow: KeyValue = ShadowKey::new().with("id1", "P1").with("id2", "P2").into();
        assert_eq!(embedded, shadow);
    }

    // 嵌套影子键（祖孙链的查找键）
    #[test]
    fn test_nested_shadow_key() {
        let shadow: KeyValue = ShadowKey::new()
            .with("child", ShadowKey::new().with("parent", "P1").with("child_id", "C1"))
            .with("id", "G1")
            .into();
        let expected = KeyValue::new()
            .with("child", KeyValue::new().with("parent", "P1").with("child_id", "C1"))
            .with("id", "G1");
        assert_eq!(shadow, expected);
    }

    // 派生槽位未补齐不能直接成键
    #[test]
    fn test_pending_slot_rejected() {
        let embedded = EmbeddedKey::new().derived("parent").with("child_id", "C1");
        assert!(embedded.try_into_key_value().is_err());
    }
}
