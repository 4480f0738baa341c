//! 模型层统一错误定义
//!
//! 聚焦描述符校验、键解析、查询条件与持久化协作等最小必要集合，
//! 所有错误同步抛给直接调用方，内部不吞错、不打日志。
//!
use thiserror::Error;

/// 统一错误类型（基础库最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum IdentityError {
    // --- 描述符（静态配置，校验期致命） ---
    #[error("invalid descriptor: entity={entity}, component={component}, reason={reason}")]
    InvalidDescriptor {
        entity: String,
        component: String,
        reason: String,
    },

    // --- 键解析 ---
    #[error("missing owned key component: entity={entity}, component={component}")]
    MissingOwnedComponent { entity: String, component: String },
    #[error("unresolved parent: entity={entity}, association={association}")]
    UnresolvedParent { entity: String, association: String },

    // --- 查询条件 ---
    #[error("invalid criterion: criterion={criterion}, reason={reason}")]
    InvalidCriterion { criterion: String, reason: String },

    // --- 持久化协作方 ---
    #[error("duplicate key: entity={entity}, key={key}")]
    DuplicateKey { entity: String, key: String },
    #[error("not found: {reason}")]
    NotFound { reason: String },

    // --- 通用 ---
    #[error("invalid state: {reason}")]
    InvalidState { reason: String },
    #[error("parse error: {reason}")]
    Parse { reason: String },
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },
}

/// 统一 Result 类型别名
pub type IdentityResult<T> = Result<T, IdentityError>;

// ---- Cross-crate conversions for collaborator convenience ----
// 允许在基础设施层直接使用 `?` 将 uuid 等错误转换为 IdentityError

impl From<uuid::Error> for IdentityError {
    fn from(err: uuid::Error) -> Self {
        IdentityError::Parse {
            reason: err.to_string(),
        }
    }
}

impl From<std::num::ParseIntError> for IdentityError {
    fn from(err: std::num::ParseIntError) -> Self {
        IdentityError::Parse {
            reason: err.to_string(),
        }
    }
}

impl From<chrono::ParseError> for IdentityError {
    fn from(err: chrono::ParseError) -> Self {
        IdentityError::Parse {
            reason: err.to_string(),
        }
    }
}
