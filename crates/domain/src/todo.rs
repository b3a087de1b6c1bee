use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// ToDoの識別子（パーティションキー）
///
/// 呼び出し側が指定する不透明な文字列。空文字列はゼロ値を表す。
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    /// ULIDで新しい識別子を生成する（呼び出し側向けのヘルパー）
    pub fn generate() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    pub fn from_string(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for TodoId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ToDoエンティティ
///
/// `Default` はゼロ値（空のID、タイムスタンプはUNIXエポック）。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// ゼロ値かどうか（`find_by_id` の「見つからない」判定に使う）
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }
}
