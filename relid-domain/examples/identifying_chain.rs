/// 三级标识链示例
/// 演示复合键的声明、自下而上解析与持久化：祖-父-子每级把上一级的
/// 整键作为嵌套分量，末级再追加自有分量。
use anyhow::Result;
use relid_domain::descriptor::{DescriptorRegistry, IdentityDescriptor};
use relid_domain::key::ComponentPath;
use relid_domain::persist::{EntityStore, InMemoryStore};
use relid_domain::record::EntityRecord;
use relid_domain::repr::ShadowKey;
use relid_domain::resolver::IdentityResolver;

#[tokio::main]
async fn main() -> Result<()> {
    // ========================================================================
    // 描述符注册与一次性校验
    // ========================================================================

    let mut registry = DescriptorRegistry::new();
    registry.register(IdentityDescriptor::new("Parent").owned("id1").owned("id2"))?;
    registry.register(
        IdentityDescriptor::new("Child")
            .identifying_association("parent", "Parent")
            .derived("parent", "parent", ComponentPath::whole())
            .owned("child_id"),
    )?;
    registry.register(
        IdentityDescriptor::new("GrandChild")
            .identifying_association("child", "Child")
            .derived("child", "child", ComponentPath::whole())
            .owned("id"),
    )?;
    let registry = registry.validate()?;
    let resolver = IdentityResolver::new(&registry);

    // ========================================================================
    // 自下而上解析三级键
    // ========================================================================

    let mut parent = EntityRecord::new("Parent");
    parent.set_key_component("id1", "P1")?;
    parent.set_key_component("id2", "P2")?;
    let parent_key = resolver.resolve(&mut parent)?;
    println!("parent key: {parent_key}");

    let mut child = EntityRecord::new("Child");
    child.set_key_component("child_id", "C1")?;
    child.set_parent("parent", &parent);
    let child_key = resolver.resolve(&mut child)?;
    println!("child key:  {child_key}");

    let mut grand = EntityRecord::new("GrandChild");
    grand.set_key_component("id", "G1")?;
    grand.set_parent("child", &child);
    let grand_key = resolver.resolve(&mut grand)?;
    println!("grand key:  {grand_key}");

    // ========================================================================
    // 持久化并用影子键查回
    // ========================================================================

    let store = InMemoryStore::new();
    store.persist(&mut parent).await?;
    store.persist(&mut child).await?;
    store.persist(&mut grand).await?;

    let shadow = ShadowKey::new()
        .with(
            "child",
            ShadowKey::new()
                .with(
                    "parent",
                    ShadowKey::new().with("id1", "P1").with("id2", "P2"),
                )
                .with("child_id", "C1"),
        )
        .with("id", "G1");
    let found = store.find("GrandChild", &shadow.into()).await?;
    println!("found by shadow key: {}", found.is_some());

    Ok(())
}
