//! 通知 payload 解析错误

/// 无效通知 - 解析 payload 时无法建立必需内容
#[derive(Debug, thiserror::Error)]
pub enum InvalidNotification {
    /// payload 不是 key/value 对象
    #[error("notification payload must be an object")]
    NotAnObject,
    /// provider 标题与通用标题都缺失或为空
    #[error("notification has no title (checked {provider_key} and {generic_key})")]
    MissingTitle {
        provider_key: &'static str,
        generic_key: &'static str,
    },
    #[error("invalid notification json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, InvalidNotification>;
