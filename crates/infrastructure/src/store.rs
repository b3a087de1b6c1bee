use async_trait::async_trait;
use domain::{Todo, TodoError};

/// 一覧取得のフィルタ条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFilter {
    pub status: String,
    /// 排他的開始キー。`id > after` の行のみを対象にする
    pub after: Option<String>,
}

impl ScanFilter {
    pub fn new(status: impl Into<String>, cursor: &str) -> Self {
        Self {
            status: status.into(),
            after: (!cursor.is_empty()).then(|| cursor.to_string()),
        }
    }

    pub fn matches(&self, todo: &Todo) -> bool {
        todo.status == self.status
            && self
                .after
                .as_deref()
                .map_or(true, |after| todo.id.as_str() > after)
    }
}

/// 主ストアに対する固定形のクエリ
///
/// `scan` の返す順序はストア依存で、ソート済みとは限らない。
/// 「見つからない」は `None` / `false` で表し、エラーはインフラ障害のみ。
#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn put(&self, todo: &Todo) -> Result<(), TodoError>;

    async fn get(&self, id: &str) -> Result<Option<Todo>, TodoError>;

    async fn contains(&self, id: &str) -> Result<bool, TodoError>;

    async fn delete(&self, id: &str) -> Result<(), TodoError>;

    async fn scan(&self, filter: &ScanFilter, limit: usize) -> Result<Vec<Todo>, TodoError>;
}
