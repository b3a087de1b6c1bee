use crate::todo::Todo;
use serde::{Deserialize, Serialize};

/// 一覧の表示順（`created_at` 基準）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    /// "desc"（大文字小文字を区別しない）のみ降順、それ以外はすべて昇順
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("desc") {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

impl From<&str> for SortOrder {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

/// 一覧取得の条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// 前ページの最後のID。空文字列なら先頭から
    pub cursor: String,
    pub limit: usize,
    pub status: String,
    pub sort_order: SortOrder,
}

impl ListQuery {
    pub fn first_page(status: impl Into<String>, limit: usize) -> Self {
        Self {
            cursor: String::new(),
            limit,
            status: status.into(),
            sort_order: SortOrder::Ascending,
        }
    }

    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = cursor.into();
        self
    }

    pub fn sorted(mut self, sort_order: SortOrder) -> Self {
        self.sort_order = sort_order;
        self
    }
}

/// 一覧取得の結果
///
/// `next_cursor` はストアが返した順序での最後の行のID。表示順とは独立。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoPage {
    pub todos: Vec<Todo>,
    pub next_cursor: String,
}

impl TodoPage {
    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.todos.iter().map(|todo| todo.id.as_str()).collect()
    }
}
