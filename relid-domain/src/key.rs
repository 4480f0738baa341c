//! 复合键值对象（Key Value）
//!
//! 由命名分量构成的有序不可变复合键：分量可以是文本、无符号整数或嵌套键值。
//! 相等与哈希均按分量值递归计算，解析完成后可作为纯值在线程间自由共享。
//!
use crate::error::{IdentityError, IdentityResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 键分量的取值
///
/// 嵌套变体 `Key` 用于"父键整体作为一个分量"的场景（内嵌标识类）。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentValue {
    Text(String),
    Uint(u64),
    Key(KeyValue),
}

impl fmt::Display for ComponentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Uint(n) => write!(f, "{n}"),
            Self::Key(k) => write!(f, "{k}"),
        }
    }
}

impl From<&str> for ComponentValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ComponentValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<u64> for ComponentValue {
    fn from(value: u64) -> Self {
        Self::Uint(value)
    }
}

impl From<KeyValue> for ComponentValue {
    fn from(value: KeyValue) -> Self {
        Self::Key(value)
    }
}

/// 复合键中的一个命名分量
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyComponent {
    name: String,
    value: ComponentValue,
}

impl KeyComponent {
    pub fn new(name: impl Into<String>, value: impl Into<ComponentValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn value(&self) -> &ComponentValue {
        &self.value
    }
}

/// 复合键值对象
///
/// 有序命名分量的元组；两个键相等当且仅当所有分量按值逐一相等（嵌套键递归比较），
/// 哈希是分量值的纯函数。
///
/// # 示例
///
/// ```
/// use relid_domain::key::KeyValue;
///
/// let a = KeyValue::new().with("id1", "P1").with("id2", "P2");
/// let b = KeyValue::new().with("id1", "P1").with("id2", "P2");
/// assert_eq!(a, b);
/// assert_eq!(format!("{}", a), "(id1=P1, id2=P2)");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyValue {
    components: Vec<KeyComponent>,
}

impl KeyValue {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// 追加一个命名分量（按声明顺序）
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ComponentValue>) -> Self {
        self.components.push(KeyComponent::new(name, value));
        self
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyComponent> {
        self.components.iter()
    }

    /// 按名称取顶层分量
    pub fn get(&self, name: &str) -> Option<&ComponentValue> {
        self.components
            .iter()
            .find(|c| c.name == name)
            .map(KeyComponent::value)
    }

    /// 按路径选取分量值
    ///
    /// - 整键路径（空路径）：恰有一个分量时取该分量的值，否则把整个键作为嵌套值返回；
    /// - 非空路径：逐段深入嵌套键，任何一段缺失返回 `None`。
    pub fn select(&self, path: &ComponentPath) -> Option<ComponentValue> {
        let mut segments = path.segments().iter();
        let Some(first) = segments.next() else {
            return Some(if self.components.len() == 1 {
                self.components[0].value.clone()
            } else {
                ComponentValue::Key(self.clone())
            });
        };

        let mut current = self.get(first)?;
        for segment in segments {
            match current {
                ComponentValue::Key(nested) => {
                    current = nested.get(segment)?;
                }
                _ => return None,
            }
        }
        Some(current.clone())
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.components.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", c.name, c.value)?;
        }
        write!(f, ")")
    }
}

/// 键分量路径
///
/// 以 `.` 分段寻址（可能嵌套的）键分量；空路径表示"父键整体"，
/// 需用 `ComponentPath::whole()` 显式构造。
///
/// # 示例
///
/// ```
/// use relid_domain::key::ComponentPath;
///
/// let p: ComponentPath = "child.parent".parse().unwrap();
/// assert_eq!(p.segments().len(), 2);
/// assert_eq!(format!("{}", p), "child.parent");
/// assert!(ComponentPath::whole().is_whole());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentPath {
    segments: Vec<String>,
}

impl ComponentPath {
    /// 整键路径：选取父键整体
    #[must_use]
    pub const fn whole() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_whole(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl FromStr for ComponentPath {
    type Err = IdentityError;

    fn from_str(s: &str) -> IdentityResult<Self> {
        if s.is_empty() {
            return Err(IdentityError::Parse {
                reason: "empty component path (use ComponentPath::whole() for the full key)"
                    .to_string(),
            });
        }
        let segments: Vec<String> = s.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(IdentityError::Parse {
                reason: format!("component path has empty segment: {s}"),
            });
        }
        Ok(Self { segments })
    }
}

impl fmt::Display for ComponentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(k: &KeyValue) -> u64 {
        let mut h = DefaultHasher::new();
        k.hash(&mut h);
        h.finish()
    }

    // 相等性：分量逐一相等（含嵌套递归）
    #[test]
    fn test_equality_recursive() {
        let parent = KeyValue::new().with("id1", "P1").with("id2", "P2");
        let a = KeyValue::new()
            .with("parent", parent.clone())
            .with("child_id", "C1");
        let b = KeyValue::new()
            .with("parent", KeyValue::new().with("id1", "P1").with("id2", "P2"))
            .with("child_id", "C1");
        assert_eq!(a, b);

        // 任一嵌套分量不同则不等
        let c = KeyValue::new()
            .with("parent", KeyValue::new().with("id1", "P1").with("id2", "XX"))
            .with("child_id", "C1");
        assert_ne!(a, c);
    }

    // 分量顺序参与相等性（有序元组）
    #[test]
    fn test_component_order_matters() {
        let a = KeyValue::new().with("id1", "P1").with("id2", "P2");
        let b = KeyValue::new().with("id2", "P2").with("id1", "P1");
        assert_ne!(a, b);
    }

    // 哈希与相等一致，且对同一值重复计算稳定
    #[test]
    fn test_hash_stable_and_consistent() {
        let a = KeyValue::new().with("id", 42u64);
        let b = KeyValue::new().with("id", 42u64);
        assert_eq!(hash_of(&a), hash_of(&a));
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    // select：整键路径在单分量键上取分量值，多分量键上取键整体
    #[test]
    fn test_select_whole() {
        let single = KeyValue::new().with("id", 7u64);
        assert_eq!(
            single.select(&ComponentPath::whole()),
            Some(ComponentValue::Uint(7))
        );

        let multi = KeyValue::new().with("id1", "P1").with("id2", "P2");
        assert_eq!(
            multi.select(&ComponentPath::whole()),
            Some(ComponentValue::Key(multi.clone()))
        );
    }

    // select：点分路径深入嵌套键
    #[test]
    fn test_select_nested_path() {
        let child = KeyValue::new().with("parent", "P1").with("child_id", "C1");
        let grand = KeyValue::new().with("child", child).with("id", "G1");

        let p: ComponentPath = "child.parent".parse().unwrap();
        assert_eq!(grand.select(&p), Some(ComponentValue::Text("P1".into())));

        let missing: ComponentPath = "child.nope".parse().unwrap();
        assert_eq!(grand.select(&missing), None);

        // 标量分量不能再深入
        let too_deep: ComponentPath = "id.x".parse().unwrap();
        assert_eq!(grand.select(&too_deep), None);
    }

    #[test]
    fn test_path_parse_errors() {
        assert!("".parse::<ComponentPath>().is_err());
        assert!("a..b".parse::<ComponentPath>().is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let k = KeyValue::new()
            .with("parent", KeyValue::new().with("id", "P1"))
            .with("child_id", 3u64);
        let json = serde_json::to_string(&k).unwrap();
        let back: KeyValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, k);
    }
}
