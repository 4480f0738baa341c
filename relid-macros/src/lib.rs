//! relid 的过程宏
//!
//! - `#[key_object]`：键值对象的派生合并（相等/哈希为分量值的纯函数）；
//! - `#[audited]`：注入审计戳字段并实现 `Audited`。

use proc_macro::TokenStream;

mod audited;
mod key_object;
mod utils;

/// 键值对象宏
/// - 合并/追加派生：Debug（可控）、Default、Clone、Serialize、Deserialize、
///   PartialEq、Eq、Hash
/// - `#[key_object(ordered = true)]` 追加 PartialOrd/Ord
#[proc_macro_attribute]
pub fn key_object(attr: TokenStream, item: TokenStream) -> TokenStream {
    key_object::expand(attr, item)
}

/// 审计实体宏
/// - 若缺失则注入 `audit: AuditStamp` 字段，并实现 `Audited`
#[proc_macro_attribute]
pub fn audited(attr: TokenStream, item: TokenStream) -> TokenStream {
    audited::expand(attr, item)
}
