//! 关系映射标识建模基础库（relid-domain）
//!
//! 提供以复合/派生主键为中心的模型层构件，用于在应用中实现：
//! - 复合键值对象（`key`）：有序命名分量、结构化相等与哈希
//! - 标识描述符（`descriptor`）：声明每个实体类型的键分量来源并做一次性校验
//! - 实体记录（`record`）：属性、关联与键的生命周期（未解析 → 已解析 → 已持久化）
//! - 两种键表示（`repr`）：内嵌键值对象与外部影子键，归一到同一 `KeyValue`
//! - 标识解析器（`resolver`）：按描述符顺序装配键，自下而上传播派生分量
//! - 谓词组合器（`predicate`）：可选查询条件的确定性 AND 组合
//! - 持久化协作方接口（`persist`）：查找/插入/过滤扫描与代理键生成
//!
//! 本 crate 不实现存储引擎本身；事务边界、映射加载与网络面均由外部协作方承担，
//! 这里仅定义模型层接口、最小必要的错误类型与一个用于测试的内存实现。
//!
//! 典型用法：
//! 1. 为每个实体类型注册 `IdentityDescriptor`，启动时调用 `validate` 得到已校验注册表；
//! 2. 构造 `EntityRecord`，设置自有键分量与父关联；
//! 3. 通过 `IdentityResolver` 解析复合键，再交给 `persist` 中的存储协作方；
//! 4. 查询侧用 `CriteriaSet` 声明条件，`build` 出谓词后交由存储协作方执行。
//!
pub mod audit;
pub mod descriptor;
pub mod error;
pub mod key;
pub mod persist;
pub mod predicate;
pub mod record;
pub mod repr;
pub mod resolver;

// 允许在本 crate 内部通过 ::relid_domain 进行自引用，
// 以便过程宏在本 crate 的单元测试中也能解析到 ::relid_domain 路径。
extern crate self as relid_domain;
