use crate::store::{ScanFilter, TodoStore};
use async_trait::async_trait;
use domain::{Todo, TodoError};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// メモリ上の `TodoStore`
///
/// Scanの返却順は挿入順で固定（同じIDの上書きは位置を保つ）。
/// テストでストア側の「生の順序」を固定するためのフィクスチャ。
#[derive(Debug, Default)]
pub struct InMemoryTodoStore {
    rows: RwLock<Vec<Todo>>,
    unavailable: AtomicBool,
}

impl InMemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定順で行を投入したストアを作成
    pub fn seeded(rows: impl IntoIterator<Item = Todo>) -> Self {
        let mut seeded = Vec::new();
        for todo in rows {
            upsert(&mut seeded, todo);
        }
        Self {
            rows: RwLock::new(seeded),
            unavailable: AtomicBool::new(false),
        }
    }

    /// true の間、すべての操作が `TodoError::Unavailable` で失敗する
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    fn check_available(&self, operation: &str) -> Result<(), TodoError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(TodoError::Unavailable(format!(
                "{operation}: in-memory store is offline"
            )));
        }
        Ok(())
    }
}

fn upsert(rows: &mut Vec<Todo>, todo: Todo) {
    match rows.iter_mut().find(|row| row.id == todo.id) {
        Some(row) => *row = todo,
        None => rows.push(todo),
    }
}

#[async_trait]
impl TodoStore for InMemoryTodoStore {
    async fn put(&self, todo: &Todo) -> Result<(), TodoError> {
        self.check_available("put")?;
        upsert(&mut *self.rows.write().await, todo.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Todo>, TodoError> {
        self.check_available("get")?;
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|row| row.id.as_str() == id).cloned())
    }

    async fn contains(&self, id: &str) -> Result<bool, TodoError> {
        self.check_available("contains")?;
        let rows = self.rows.read().await;
        Ok(rows.iter().any(|row| row.id.as_str() == id))
    }

    async fn delete(&self, id: &str) -> Result<(), TodoError> {
        self.check_available("delete")?;
        self.rows.write().await.retain(|row| row.id.as_str() != id);
        Ok(())
    }

    async fn scan(&self, filter: &ScanFilter, limit: usize) -> Result<Vec<Todo>, TodoError> {
        self.check_available("scan")?;
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .filter(|row| filter.matches(row))
            .take(limit)
            .cloned()
            .collect())
    }
}
