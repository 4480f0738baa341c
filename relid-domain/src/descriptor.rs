//! 标识描述符（Identity Descriptor）
//!
//! 为每个实体类型声明键分量的有序列表与来源：自有（Owned，可标记为代理键自动生成）
//! 或派生（DerivedFromParent，从某个标识性父关联的键中拷贝）。
//!
//! 描述符集中注册到 `DescriptorRegistry`，启动时一次性 `validate` 得到
//! `ValidatedRegistry`；悬空引用属于静态配置错误，在校验期报出，绝不拖到持久化期。
//!
use crate::error::{IdentityError, IdentityResult};
use crate::key::ComponentPath;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// 键分量的来源
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComponentSource {
    /// 直接在记录上设置；`generated` 标记代理键（由协作方生成）
    Owned { generated: bool },
    /// 从父关联的已解析键中拷贝
    ///
    /// `path` 为空（整键）时拷贝父键整体：父键恰有一个分量时拷贝该分量值，
    /// 多分量时作为嵌套键值拷贝；非空时必须指向父描述符的一个顶层分量
    /// （该分量在父侧也可以是派生的，传播是传递的）。
    DerivedFromParent {
        association: String,
        path: ComponentPath,
    },
}

/// 一个键分量的定义
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyComponentDef {
    name: String,
    source: ComponentSource,
}

impl KeyComponentDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn source(&self) -> &ComponentSource {
        &self.source
    }
}

/// 实体类型上的一个关联定义
///
/// `identifying` 为 true 表示标识性关联（子键包含父键），
/// 为 false 表示普通外键引用（如多对多连接表的两端）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationDef {
    name: String,
    target_kind: String,
    identifying: bool,
}

impl AssociationDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target_kind(&self) -> &str {
        &self.target_kind
    }

    pub const fn is_identifying(&self) -> bool {
        self.identifying
    }
}

/// 一个实体类型的标识描述符
///
/// # 示例
///
/// ```
/// use relid_domain::descriptor::IdentityDescriptor;
/// use relid_domain::key::ComponentPath;
///
/// // Child 的键 = 父键两个分量 + 自有分量
/// let child = IdentityDescriptor::new("Child")
///     .identifying_association("parent", "Parent")
///     .derived("parent_id1", "parent", "id1".parse().unwrap())
///     .derived("parent_id2", "parent", "id2".parse().unwrap())
///     .owned("child_id");
/// assert_eq!(child.components().len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityDescriptor {
    entity_kind: String,
    components: Vec<KeyComponentDef>,
    associations: Vec<AssociationDef>,
}

impl IdentityDescriptor {
    pub fn new(entity_kind: impl Into<String>) -> Self {
        Self {
            entity_kind: entity_kind.into(),
            components: Vec::new(),
            associations: Vec::new(),
        }
    }

    /// 追加一个自有分量
    #[must_use]
    pub fn owned(mut self, name: impl Into<String>) -> Self {
        self.components.push(KeyComponentDef {
            name: name.into(),
            source: ComponentSource::Owned { generated: false },
        });
        self
    }

    /// 追加一个自动生成的自有分量（代理键）
    #[must_use]
    pub fn generated(mut self, name: impl Into<String>) -> Self {
        self.components.push(KeyComponentDef {
            name: name.into(),
            source: ComponentSource::Owned { generated: true },
        });
        self
    }

    /// 追加一个派生分量
    #[must_use]
    pub fn derived(
        mut self,
        name: impl Into<String>,
        association: impl Into<String>,
        path: ComponentPath,
    ) -> Self {
        self.components.push(KeyComponentDef {
            name: name.into(),
            source: ComponentSource::DerivedFromParent {
                association: association.into(),
                path,
            },
        });
        self
    }

    /// 声明一个标识性父关联
    #[must_use]
    pub fn identifying_association(
        mut self,
        name: impl Into<String>,
        target_kind: impl Into<String>,
    ) -> Self {
        self.associations.push(AssociationDef {
            name: name.into(),
            target_kind: target_kind.into(),
            identifying: true,
        });
        self
    }

    /// 声明一个普通外键引用（非标识性）
    #[must_use]
    pub fn reference(mut self, name: impl Into<String>, target_kind: impl Into<String>) -> Self {
        self.associations.push(AssociationDef {
            name: name.into(),
            target_kind: target_kind.into(),
            identifying: false,
        });
        self
    }

    pub fn entity_kind(&self) -> &str {
        &self.entity_kind
    }

    pub fn components(&self) -> &[KeyComponentDef] {
        &self.components
    }

    pub fn associations(&self) -> &[AssociationDef] {
        &self.associations
    }

    pub fn component(&self, name: &str) -> Option<&KeyComponentDef> {
        self.components.iter().find(|c| c.name == name)
    }

    pub fn association(&self, name: &str) -> Option<&AssociationDef> {
        self.associations.iter().find(|a| a.name == name)
    }

    fn invalid(&self, component: &str, reason: impl Into<String>) -> IdentityError {
        IdentityError::InvalidDescriptor {
            entity: self.entity_kind.clone(),
            component: component.to_string(),
            reason: reason.into(),
        }
    }
}

/// 描述符注册表（未校验）
#[derive(Debug, Default)]
pub struct DescriptorRegistry {
    descriptors: BTreeMap<String, IdentityDescriptor>,
}

impl DescriptorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个实体类型的描述符；重复注册同一类型视为配置错误
    pub fn register(&mut self, descriptor: IdentityDescriptor) -> IdentityResult<()> {
        let kind = descriptor.entity_kind.clone();
        if self.descriptors.contains_key(&kind) {
            return Err(IdentityError::InvalidDescriptor {
                entity: kind,
                component: String::new(),
                reason: "entity kind registered twice".to_string(),
            });
        }
        self.descriptors.insert(kind, descriptor);
        Ok(())
    }

    /// 一次性校验全部描述符，成功后返回只读的已校验注册表
    ///
    /// 校验内容（每实体类型仅此一次，实例级解析不再重复）：
    /// - 分量与关联命名唯一，键至少含一个分量；
    /// - 关联目标类型必须已注册；
    /// - 派生分量必须引用本类型上的标识性关联，且路径指向父描述符的
    ///   顶层分量（或为整键路径）；
    /// - 每个标识性关联贡献的父键分量集合必须与派生分量集合恰好吻合：
    ///   要么唯一一个整键派生分量，要么逐一覆盖父键全部顶层分量；
    /// - 标识性关联构成的依赖图必须无环（否则任何一方都无法率先解析）。
    pub fn validate(self) -> IdentityResult<ValidatedRegistry> {
        for descriptor in self.descriptors.values() {
            self.validate_descriptor(descriptor)?;
        }
        self.check_cycles()?;
        Ok(ValidatedRegistry {
            descriptors: self.descriptors,
        })
    }

    fn validate_descriptor(&self, descriptor: &IdentityDescriptor) -> IdentityResult<()> {
        if descriptor.components.is_empty() {
            return Err(descriptor.invalid("", "descriptor has no key components"));
        }

        let mut component_names = BTreeSet::new();
        for c in &descriptor.components {
            if !component_names.insert(c.name.as_str()) {
                return Err(descriptor.invalid(&c.name, "duplicate key component"));
            }
        }

        let mut association_names = BTreeSet::new();
        for a in &descriptor.associations {
            if !association_names.insert(a.name.as_str()) {
                return Err(descriptor.invalid(&a.name, "duplicate association"));
            }
            if !self.descriptors.contains_key(&a.target_kind) {
                return Err(descriptor.invalid(
                    &a.name,
                    format!("association target kind not registered: {}", a.target_kind),
                ));
            }
        }

        // 派生分量按关联分组，随后做覆盖性检查
        let mut derived_by_association: BTreeMap<&str, Vec<(&str, &ComponentPath)>> =
            BTreeMap::new();

        for c in &descriptor.components {
            let ComponentSource::DerivedFromParent { association, path } = &c.source else {
                continue;
            };
            let Some(assoc) = descriptor.association(association) else {
                return Err(descriptor.invalid(
                    &c.name,
                    format!("derived component references unknown association: {association}"),
                ));
            };
            if !assoc.identifying {
                return Err(descriptor.invalid(
                    &c.name,
                    format!("derived component references non-identifying association: {association}"),
                ));
            }

            let parent = &self.descriptors[&assoc.target_kind];
            if !path.is_whole() {
                let segments = path.segments();
                if segments.len() != 1 {
                    return Err(descriptor.invalid(
                        &c.name,
                        format!(
                            "derived path must be whole-key or a top-level parent component: {path}"
                        ),
                    ));
                }
                if parent.component(&segments[0]).is_none() {
                    return Err(descriptor.invalid(
                        &c.name,
                        format!(
                            "parent key of {} has no component named {}",
                            parent.entity_kind, segments[0]
                        ),
                    ));
                }
            }

            derived_by_association
                .entry(assoc.name.as_str())
                .or_default()
                .push((c.name.as_str(), path));
        }

        // 覆盖性：派生分量集合必须与父关联贡献的键分量集合恰好吻合
        for a in descriptor.associations.iter().filter(|a| a.identifying) {
            let parent = &self.descriptors[&a.target_kind];
            let derived = derived_by_association.remove(a.name.as_str()).unwrap_or_default();

            if derived.is_empty() {
                return Err(descriptor.invalid(
                    &a.name,
                    "identifying association contributes no derived key component",
                ));
            }

            let whole_count = derived.iter().filter(|(_, p)| p.is_whole()).count();
            if whole_count > 0 {
                if derived.len() > 1 {
                    return Err(descriptor.invalid(
                        &a.name,
                        "whole-key derived component must be the only one for its association",
                    ));
                }
                continue;
            }

            let covered: BTreeSet<&str> = derived
                .iter()
                .map(|(_, p)| p.segments()[0].as_str())
                .collect();
            let expected: BTreeSet<&str> =
                parent.components.iter().map(|c| c.name.as_str()).collect();
            if covered != expected {
                return Err(descriptor.invalid(
                    &a.name,
                    format!(
                        "derived components must cover the parent key exactly: expected [{}], got [{}]",
                        expected.iter().copied().collect::<Vec<_>>().join(", "),
                        covered.iter().copied().collect::<Vec<_>>().join(", "),
                    ),
                ));
            }
        }

        Ok(())
    }

    // 标识性关联依赖图的环检测（DFS 三色标记）
    fn check_cycles(&self) -> IdentityResult<()> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        fn visit(
            registry: &BTreeMap<String, IdentityDescriptor>,
            kind: &str,
            marks: &mut BTreeMap<String, Mark>,
        ) -> IdentityResult<()> {
            match marks.get(kind) {
                Some(Mark::Done) => return Ok(()),
                Some(Mark::Visiting) => {
                    return Err(IdentityError::InvalidDescriptor {
                        entity: kind.to_string(),
                        component: String::new(),
                        reason: "cyclic identifying association".to_string(),
                    });
                }
                None => {}
            }
            marks.insert(kind.to_string(), Mark::Visiting);
            if let Some(descriptor) = registry.get(kind) {
                for a in descriptor.associations.iter().filter(|a| a.identifying) {
                    visit(registry, &a.target_kind, marks)?;
                }
            }
            marks.insert(kind.to_string(), Mark::Done);
            Ok(())
        }

        let mut marks = BTreeMap::new();
        for kind in self.descriptors.keys() {
            visit(&self.descriptors, kind, &mut marks)?;
        }
        Ok(())
    }
}

/// 已校验的描述符注册表（只读）
#[derive(Debug)]
pub struct ValidatedRegistry {
    descriptors: BTreeMap<String, IdentityDescriptor>,
}

impl ValidatedRegistry {
    pub fn descriptor(&self, entity_kind: &str) -> Option<&IdentityDescriptor> {
        self.descriptors.get(entity_kind)
    }

    /// 取描述符，缺失视为状态错误（解析前必须完成注册与校验）
    pub fn expect(&self, entity_kind: &str) -> IdentityResult<&IdentityDescriptor> {
        self.descriptor(entity_kind)
            .ok_or_else(|| IdentityError::InvalidState {
                reason: format!("no descriptor registered for entity kind: {entity_kind}"),
            })
    }
}
