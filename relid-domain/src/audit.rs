//! 审计字段片段（Audit Stamp）
//!
//! 多个实体类型共用的登记/修改时间戳：以可复用的结构体片段显式内嵌，
//! 不走类继承。动态 `EntityRecord` 直接内嵌；静态实体结构体可用
//! `relid-macros` 的 `#[audited]` 注入同名字段并实现 `Audited`。
//!
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 登记日 / 修改日
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamp {
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl AuditStamp {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            created_at: None,
            updated_at: None,
        }
    }

    pub const fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub const fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// 首次持久化时打登记戳（已有登记戳则只刷新修改戳）
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if self.created_at.is_none() {
            self.created_at = Some(now);
        }
        self.updated_at = Some(now);
    }
}

/// 带审计字段的实体抽象
pub trait Audited {
    fn audit(&self) -> &AuditStamp;

    fn audit_mut(&mut self) -> &mut AuditStamp;

    /// 用当前时间刷新审计戳
    fn touch_now(&mut self) {
        self.audit_mut().touch(Utc::now());
    }
}
