use relid_macros::key_object;
use std::collections::HashMap;

#[key_object]
struct MemberKey {
    company_id: u64,
    member_id: String,
}

#[key_object(debug = false)]
struct OpaqueKey(u64);

#[key_object]
enum KeyKind {
    #[default]
    Simple,
    Composite,
}

fn main() {
    // Debug 默认开启，应可格式化
    let k = MemberKey {
        company_id: 1,
        member_id: "M1".to_string(),
    };
    let _ = format!("{:?}", k);

    // 相等与哈希为分量值的纯函数：可直接作 HashMap 键
    let mut index: HashMap<MemberKey, &str> = HashMap::new();
    index.insert(k.clone(), "first");
    let same = MemberKey {
        company_id: 1,
        member_id: "M1".to_string(),
    };
    assert_eq!(index.get(&same), Some(&"first"));

    // debug = false 的只做构造，确保编译通过
    let _ = OpaqueKey(1);

    // 枚举同样获得 Default/Clone/Hash 等派生
    let _kind: KeyKind = Default::default();
}
