use thiserror::Error;

/// ToDo永続化層のエラー
///
/// 「見つからない」はエラーではない。`find_by_id` はゼロ値、`exists_by_id` は
/// `false` を返すため、ここには NotFound に相当するバリアントを持たない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TodoError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("DynamoDB error: {0}")]
    DynamoDb(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to decode stored todo: {0}")]
    Decode(String),
}

impl TodoError {
    /// 操作名を付与したストアエラーを作成
    pub fn store(operation: &str, message: impl std::fmt::Display) -> Self {
        TodoError::DynamoDb(format!("{operation}: {message}"))
    }
}
