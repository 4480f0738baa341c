//! 持久化协作方接口（persist）
//!
//! 定义模型层消费的存储协作方协议与测试用内存实现：
//! - 代理键生成（`KeyGenerator`：序列与 UUID 两种实现）；
//! - 主键查找、插入与过滤扫描（`EntityStore`/`QueryOptions`）；
//! - 内存参考实现（`InMemoryStore`）：拒绝未解析记录、原样抛出重复键、
//!   持久化时打审计戳。
//!
//! 事务边界（begin/commit/rollback）由外部协作方承担：键解析失败的记录
//! 根本不会进入存储，这里没有需要回滚的半成品键状态。
//!
mod entity_store;
mod in_memory;
mod key_generator;

pub use entity_store::{EntityStore, QueryOptions};
pub use in_memory::InMemoryStore;
pub use key_generator::{KeyGenerator, SequenceKeyGenerator, UuidKeyGenerator};
