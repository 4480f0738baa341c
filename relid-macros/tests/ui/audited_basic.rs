use relid_domain::audit::Audited;
use relid_macros::audited;

#[audited]
struct Board {
    title: String,
}

fn main() {
    // audit 字段被注入，Audited 实现可用
    let mut board = Board {
        audit: Default::default(),
        title: "notice".to_string(),
    };
    assert!(board.audit().created_at().is_none());

    board.touch_now();
    assert!(board.audit().created_at().is_some());
    assert_eq!(board.audit().created_at(), board.audit().updated_at());

    // 序列化派生已合并
    let _json = serde_json::to_string(&board).unwrap();
}
