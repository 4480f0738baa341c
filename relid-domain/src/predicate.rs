//! 谓词组合器（Predicate Combinator）
//!
//! 把一组可选查询条件归并为单个过滤谓词：值缺席的条件不产生子句，
//! 在场的子句按声明顺序以 AND 连接，保证相同输入生成可复现的查询。
//! 零条件在场时谓词匹配全部记录。
//!
//! 在场/缺席用显式的 `CriterionArg` 标记表达，取代"null 即跳过"的
//! 隐式约定；文本包含条件把空串视同缺席。
//!
use crate::error::{IdentityError, IdentityResult};
use crate::key::ComponentPath;
use crate::record::EntityRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 条件种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CriterionKind {
    /// 文本包含（子串匹配）
    Contains,
    /// 严格相等（枚举状态等标量）
    Equals,
}

/// 一个已声明的查询条件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    name: String,
    field: ComponentPath,
    kind: CriterionKind,
}

impl Criterion {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn field(&self) -> &ComponentPath {
        &self.field
    }

    pub const fn kind(&self) -> CriterionKind {
        self.kind
    }
}

/// 条件实参：显式的在场/缺席标记
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CriterionArg {
    Present(serde_json::Value),
    Absent,
}

impl CriterionArg {
    pub fn present(value: impl Into<serde_json::Value>) -> Self {
        Self::Present(value.into())
    }

    #[must_use]
    pub const fn absent() -> Self {
        Self::Absent
    }

    /// 从 Option 转换：`None` 即缺席
    pub fn from_option<T: Into<serde_json::Value>>(value: Option<T>) -> Self {
        value.map_or(Self::Absent, |v| Self::Present(v.into()))
    }
}

/// 一次查询的条件实参集合
///
/// 实参的插入顺序不影响生成的谓词；子句顺序始终取条件的声明顺序。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CriterionArgs {
    values: BTreeMap<String, CriterionArg>,
}

impl CriterionArgs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, arg: CriterionArg) -> Self {
        self.values.insert(name.into(), arg);
        self
    }

    fn get(&self, name: &str) -> &CriterionArg {
        self.values.get(name).unwrap_or(&CriterionArg::Absent)
    }

    fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

/// 某实体类型的条件声明集合（声明顺序即子句顺序）
///
/// # 示例
///
/// ```
/// use relid_domain::predicate::{CriteriaSet, CriterionArg, CriterionArgs, Predicate};
///
/// let criteria = CriteriaSet::new("Order")
///     .contains("member_name", "member_name".parse().unwrap())
///     .equals("status", "status".parse().unwrap());
///
/// // 全部缺席：匹配一切
/// let p = criteria.build(&CriterionArgs::new()).unwrap();
/// assert_eq!(p, Predicate::All);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriteriaSet {
    entity_kind: String,
    criteria: Vec<Criterion>,
}

impl CriteriaSet {
    pub fn new(entity_kind: impl Into<String>) -> Self {
        Self {
            entity_kind: entity_kind.into(),
            criteria: Vec::new(),
        }
    }

    /// 声明一个文本包含条件
    #[must_use]
    pub fn contains(mut self, name: impl Into<String>, field: ComponentPath) -> Self {
        self.criteria.push(Criterion {
            name: name.into(),
            field,
            kind: CriterionKind::Contains,
        });
        self
    }

    /// 声明一个严格相等条件
    #[must_use]
    pub fn equals(mut self, name: impl Into<String>, field: ComponentPath) -> Self {
        self.criteria.push(Criterion {
            name: name.into(),
            field,
            kind: CriterionKind::Equals,
        });
        self
    }

    pub fn entity_kind(&self) -> &str {
        &self.entity_kind
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    /// 把条件实参归并为单个谓词
    ///
    /// - 缺席实参不产生子句，绝不报错；
    /// - 在场但形状不合法的实参报 `InvalidCriterion`；
    /// - 未声明的在场实参同样报 `InvalidCriterion`（拼写错误不应被静默忽略）。
    pub fn build(&self, args: &CriterionArgs) -> IdentityResult<Predicate> {
        for name in args.names() {
            if matches!(args.get(name), CriterionArg::Present(_))
                && !self.criteria.iter().any(|c| c.name == name)
            {
                return Err(IdentityError::InvalidCriterion {
                    criterion: name.to_string(),
                    reason: format!("criterion not declared for {}", self.entity_kind),
                });
            }
        }

        let mut clauses = Vec::new();
        for criterion in &self.criteria {
            let CriterionArg::Present(value) = args.get(&criterion.name) else {
                continue;
            };
            match criterion.kind {
                CriterionKind::Contains => {
                    let serde_json::Value::String(needle) = value else {
                        return Err(IdentityError::InvalidCriterion {
                            criterion: criterion.name.clone(),
                            reason: format!("contains criterion expects text, got {value}"),
                        });
                    };
                    // 空串视同缺席
                    if needle.is_empty() {
                        continue;
                    }
                    clauses.push(Predicate::Contains {
                        field: criterion.field.clone(),
                        needle: needle.clone(),
                    });
                }
                CriterionKind::Equals => {
                    if !value.is_string() && !value.is_number() && !value.is_boolean() {
                        return Err(IdentityError::InvalidCriterion {
                            criterion: criterion.name.clone(),
                            reason: format!("equality criterion expects a scalar, got {value}"),
                        });
                    }
                    clauses.push(Predicate::Equals {
                        field: criterion.field.clone(),
                        value: value.clone(),
                    });
                }
            }
        }

        Ok(match clauses.len() {
            0 => Predicate::All,
            1 => clauses.remove(0),
            _ => Predicate::And(clauses),
        })
    }
}

/// 过滤谓词
///
/// 可直接对记录做内存求值，也可按"字段路径 + 操作符 + 字面量"翻译为
/// 存储协作方的原生过滤表示（结构本身可序列化）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// 匹配全部记录
    All,
    And(Vec<Predicate>),
    Contains {
        field: ComponentPath,
        needle: String,
    },
    Equals {
        field: ComponentPath,
        value: serde_json::Value,
    },
}

impl Predicate {
    /// 对一条记录求值
    pub fn matches(&self, record: &EntityRecord) -> bool {
        match self {
            Self::All => true,
            Self::And(clauses) => clauses.iter().all(|c| c.matches(record)),
            Self::Contains { field, needle } => record
                .attribute_at(field)
                .and_then(serde_json::Value::as_str)
                .is_some_and(|s| s.contains(needle.as_str())),
            Self::Equals { field, value } => {
                record.attribute_at(field).is_some_and(|actual| actual == value)
            }
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "true"),
            Self::And(clauses) => {
                for (i, c) in clauses.iter().enumerate() {
                    if i > 0 {
                        write!(f, " AND ")?;
                    }
                    write!(f, "{c}")?;
                }
                Ok(())
            }
            Self::Contains { field, needle } => write!(f, "{field} contains {needle:?}"),
            Self::Equals { field, value } => write!(f, "{field} = {value}"),
        }
    }
}
