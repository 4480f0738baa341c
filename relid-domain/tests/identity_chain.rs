//! 三级标识链的端到端解析
//!
//! 祖-父-子三级复合键的两种表示（扁平分量 / 嵌套整键）自下而上解析，
//! 以及父键快照与显式重新解析的交互。

use relid_domain::descriptor::{DescriptorRegistry, IdentityDescriptor, ValidatedRegistry};
use relid_domain::error::IdentityError;
use relid_domain::key::{ComponentPath, ComponentValue, KeyValue};
use relid_domain::record::EntityRecord;
use relid_domain::repr::{EmbeddedKey, ShadowKey};
use relid_domain::resolver::IdentityResolver;
use relid_domain::persist::SequenceKeyGenerator;

// 扁平表示：Child 的键逐一拷贝 Parent 的两个顶层分量
fn flat_registry() -> ValidatedRegistry {
    let mut registry = DescriptorRegistry::new();
    registry
        .register(IdentityDescriptor::new("Parent").owned("id1").owned("id2"))
        .unwrap();
    registry
        .register(
            IdentityDescriptor::new("Child")
                .identifying_association("parent", "Parent")
                .derived("parent_id1", "parent", "id1".parse().unwrap())
                .derived("parent_id2", "parent", "id2".parse().unwrap())
                .owned("child_id"),
        )
        .unwrap();
    registry.validate().unwrap()
}

// 嵌套表示：每级把上一级的整键作为单个嵌套分量
fn nested_registry() -> ValidatedRegistry {
    let mut registry = DescriptorRegistry::new();
    registry
        .register(IdentityDescriptor::new("Parent").owned("id"))
        .unwrap();
    registry
        .register(
            IdentityDescriptor::new("Child")
                .identifying_association("parent", "Parent")
                .derived("parent", "parent", ComponentPath::whole())
                .owned("child_id"),
        )
        .unwrap();
    registry
        .register(
            IdentityDescriptor::new("GrandChild")
                .identifying_association("child", "Child")
                .derived("child", "child", ComponentPath::whole())
                .owned("id"),
        )
        .unwrap();
    registry.validate().unwrap()
}

#[test]
fn flat_child_key_copies_parent_components() {
    let registry = flat_registry();
    let resolver = IdentityResolver::new(&registry);

    let mut parent = EntityRecord::new("Parent");
    parent.set_key_component("id1", "P1").unwrap();
    parent.set_key_component("id2", "P2").unwrap();
    resolver.resolve(&mut parent).unwrap();

    let mut child = EntityRecord::new("Child");
    child.set_key_component("child_id", "C1").unwrap();
    child.set_parent("parent", &parent);
    let key = resolver.resolve(&mut child).unwrap();

    assert_eq!(
        key,
        KeyValue::new()
            .with("parent_id1", "P1")
            .with("parent_id2", "P2")
            .with("child_id", "C1")
    );
}

#[test]
fn nested_three_level_chain_resolves_bottom_up() {
    let registry = nested_registry();
    let resolver = IdentityResolver::new(&registry);

    let mut parent = EntityRecord::new("Parent");
    parent.set_key_component("id", "P1").unwrap();
    resolver.resolve(&mut parent).unwrap();

    let mut child = EntityRecord::new("Child");
    child.set_key_component("child_id", "C1").unwrap();
    child.set_parent("parent", &parent);
    let child_key = resolver.resolve(&mut child).unwrap();

    // Parent 只有一个分量：整键派生拷贝标量值
    assert_eq!(
        child_key,
        KeyValue::new().with("parent", "P1").with("child_id", "C1")
    );

    let mut grand = EntityRecord::new("GrandChild");
    grand.set_key_component("id", "G1").unwrap();
    grand.set_parent("child", &child);
    let grand_key = resolver.resolve(&mut grand).unwrap();

    // Child 有两个分量：整键派生成为嵌套键值
    assert_eq!(
        grand_key,
        KeyValue::new()
            .with("child", child_key.clone())
            .with("id", "G1")
    );

    // 与独立构造的影子键按值相等
    let shadow: KeyValue = ShadowKey::new()
        .with("child", ShadowKey::new().with("parent", "P1").with("child_id", "C1"))
        .with("id", "G1")
        .into();
    assert_eq!(grand_key, shadow);
}

#[test]
fn embedded_key_resolves_to_same_value() {
    let registry = nested_registry();
    let resolver = IdentityResolver::new(&registry);

    let mut parent = EntityRecord::new("Parent");
    parent.set_key_component("id", "P1").unwrap();
    resolver.resolve(&mut parent).unwrap();

    // 内嵌键写法：派生槽位留空，解析器从父关联补齐
    let mut child = EntityRecord::new("Child");
    child
        .embed_key(EmbeddedKey::new().derived("parent").with("child_id", "C1"))
        .unwrap();
    child.set_parent("parent", &parent);
    let key = resolver.resolve(&mut child).unwrap();

    assert_eq!(
        key,
        KeyValue::new().with("parent", "P1").with("child_id", "C1")
    );
}

// 解析顺序错误：父未解析时子解析失败，报出关联名
#[test]
fn unresolved_parent_fails_with_association_name() {
    let registry = nested_registry();
    let resolver = IdentityResolver::new(&registry);

    let parent = EntityRecord::new("Parent");
    let mut child = EntityRecord::new("Child");
    child.set_key_component("child_id", "C1").unwrap();
    child.set_parent("parent", &parent);

    match resolver.resolve(&mut child).unwrap_err() {
        IdentityError::UnresolvedParent { entity, association } => {
            assert_eq!(entity, "Child");
            assert_eq!(association, "parent");
        }
        other => panic!("unexpected {other:?}"),
    }
}

// 父键在子解析后变化：子键保持快照值，直到显式重新设置关联并再次解析
#[test]
fn parent_mutation_requires_explicit_re_resolution() {
    let registry = nested_registry();
    let resolver = IdentityResolver::new(&registry);

    let mut parent = EntityRecord::new("Parent");
    parent.set_key_component("id", "P1").unwrap();
    resolver.resolve(&mut parent).unwrap();

    let mut child = EntityRecord::new("Child");
    child.set_key_component("child_id", "C1").unwrap();
    child.set_parent("parent", &parent);
    let before = resolver.resolve(&mut child).unwrap();

    // 父键变化，子记录不自动跟随
    parent.set_key_component("id", "P2").unwrap();
    resolver.resolve(&mut parent).unwrap();
    assert_eq!(resolver.resolve(&mut child).unwrap(), before);

    // 重新快照 + 重新解析后才看到新值
    child.set_parent("parent", &parent);
    let after = resolver.resolve(&mut child).unwrap();
    assert_eq!(
        after,
        KeyValue::new().with("parent", "P2").with("child_id", "C1")
    );
}

// 一对一共享主键：父侧代理键生成后，子侧通过重新快照获得同一个键
#[test]
fn shared_generated_key_propagates_after_re_snapshot() {
    let mut registry = DescriptorRegistry::new();
    registry
        .register(IdentityDescriptor::new("Board").generated("id"))
        .unwrap();
    registry
        .register(
            IdentityDescriptor::new("BoardDetail")
                .identifying_association("board", "Board")
                .derived("board_id", "board", ComponentPath::whole()),
        )
        .unwrap();
    let registry = registry.validate().unwrap();
    let resolver = IdentityResolver::new(&registry);
    let generator = SequenceKeyGenerator::starting_at(7);

    let mut board = EntityRecord::new("Board");
    let mut detail = EntityRecord::new("BoardDetail");
    detail.set_parent("board", &board);

    // 生成前：父未解析，子解析失败
    assert!(resolver.resolve(&mut detail).is_err());

    let board_key = resolver.resolve_with(&mut board, &generator).unwrap();
    assert_eq!(board_key, KeyValue::new().with("id", 7u64));

    detail.set_parent("board", &board);
    let detail_key = resolver.resolve(&mut detail).unwrap();
    assert_eq!(
        detail_key.get("board_id"),
        Some(&ComponentValue::Uint(7))
    );
}
