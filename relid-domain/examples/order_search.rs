/// 订单搜索示例
/// 演示谓词组合器：可选条件缺席即跳过，在场子句按声明顺序 AND 连接，
/// 生成的谓词既能内存求值也能交给存储协作方执行。
use anyhow::Result;
use relid_domain::descriptor::{DescriptorRegistry, IdentityDescriptor};
use relid_domain::persist::{EntityStore, InMemoryStore, QueryOptions, SequenceKeyGenerator};
use relid_domain::predicate::{CriteriaSet, CriterionArg, CriterionArgs};
use relid_domain::record::EntityRecord;
use relid_domain::resolver::IdentityResolver;

#[tokio::main]
async fn main() -> Result<()> {
    let mut registry = DescriptorRegistry::new();
    registry.register(IdentityDescriptor::new("Order").generated("id"))?;
    let registry = registry.validate()?;
    let resolver = IdentityResolver::new(&registry);
    let generator = SequenceKeyGenerator::new();

    let store = InMemoryStore::new();
    for (name, status) in [
        ("Ann", "ORDERED"),
        ("Annika", "SHIPPED"),
        ("Bob", "SHIPPED"),
    ] {
        let mut record = EntityRecord::new("Order");
        record.set_attribute("member_name", name);
        record.set_attribute("status", status);
        resolver.resolve_with(&mut record, &generator)?;
        store.persist(&mut record).await?;
    }

    // 条件声明一次，实参按请求组装
    let criteria = CriteriaSet::new("Order")
        .contains("member_name", "member_name".parse()?)
        .equals("status", "status".parse()?);

    let scenarios: Vec<(&str, CriterionArgs)> = vec![
        ("no criteria", CriterionArgs::new()),
        (
            "name only",
            CriterionArgs::new().with("member_name", CriterionArg::present("Ann")),
        ),
        (
            "status only",
            CriterionArgs::new().with("status", CriterionArg::present("SHIPPED")),
        ),
        (
            "name + status",
            CriterionArgs::new()
                .with("member_name", CriterionArg::present("Ann"))
                .with("status", CriterionArg::present("SHIPPED")),
        ),
        (
            "empty text = absent",
            CriterionArgs::new().with("member_name", CriterionArg::present("")),
        ),
    ];

    for (label, args) in scenarios {
        let predicate = criteria.build(&args)?;
        let hits = store
            .execute_query("Order", &predicate, &QueryOptions::default())
            .await?;
        println!("{label:20} -> {predicate} ({} hits)", hits.len());
    }

    Ok(())
}
