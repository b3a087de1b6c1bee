use crate::audit::{AuditError, AuditLabel, AuditSink, OpenSearchAuditSink};
use crate::dynamodb::{DynamoDbClient, DynamoDbTodoStore};
use crate::pagination::build_page;
use crate::store::{ScanFilter, TodoStore};
use domain::{ListQuery, Todo, TodoError, TodoPage};
use shared::Config;
use std::sync::Arc;
use tracing::{error, info, warn};

/// ToDoリポジトリ
///
/// 各操作の前後で監査イベントを記録する（開始 → 主ストア操作 → 結果）。
/// 呼び出し元が受け取るのは主ストアの結果のみで、監査側の失敗は影響しない。
pub struct TodoRepository<S> {
    store: S,
    audit: Arc<dyn AuditSink>,
}

pub type DynamoDbTodoRepository = TodoRepository<DynamoDbTodoStore>;

impl DynamoDbTodoRepository {
    /// 設定からDynamoDBストアとOpenSearch監査シンクを組み立てる
    pub async fn connect(config: &Config) -> Result<Self, AuditError> {
        let store = DynamoDbTodoStore::new(DynamoDbClient::new(config).await);
        let audit = OpenSearchAuditSink::new(&config.audit)?;

        info!(
            environment = %config.environment,
            table = %config.dynamodb_table,
            consistent_read = config.consistent_read,
            audit_endpoint = %audit.endpoint(),
            "ToDoリポジトリを初期化"
        );

        Ok(Self::new(store, Arc::new(audit)))
    }
}

impl<S: TodoStore> TodoRepository<S> {
    pub fn new(store: S, audit: Arc<dyn AuditSink>) -> Self {
        Self { store, audit }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn record_audit(&self, label: AuditLabel, message: impl AsRef<str>) {
        self.audit.record(label.as_str(), message.as_ref()).await;
    }

    /// 全属性を書き込む。同じIDは上書き（後勝ち）
    pub async fn save(&self, todo: &Todo) -> Result<(), TodoError> {
        info!(
            id = %todo.id,
            user_id = %todo.user_id,
            title = %todo.title,
            description = %todo.description,
            status = %todo.status,
            "ToDoを保存中"
        );
        self.record_audit(
            AuditLabel::SavingTodo,
            format!("ID: {}, UserID: {}", todo.id, todo.user_id),
        )
        .await;

        match self.store.put(todo).await {
            Ok(()) => {
                info!(id = %todo.id, "ToDo保存完了");
                self.record_audit(
                    AuditLabel::TodoSaved,
                    format!("Todo with ID: {} saved successfully", todo.id),
                )
                .await;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, id = %todo.id, "ToDo保存エラー");
                self.record_audit(AuditLabel::SaveFailed, e.to_string()).await;
                Err(e)
            }
        }
    }

    /// IDで取得する。見つからない場合は `Ok(None)`
    pub async fn lookup_by_id(&self, id: &str) -> Result<Option<Todo>, TodoError> {
        info!(id, "ToDoを取得中");
        self.record_audit(AuditLabel::FindingTodo, id).await;

        match self.store.get(id).await {
            Ok(Some(todo)) => {
                info!(id, "ToDo取得完了");
                self.record_audit(AuditLabel::TodoFound, format!("Todo with ID: {} found", todo.id))
                    .await;
                Ok(Some(todo))
            }
            Ok(None) => {
                warn!(id, "ToDoが見つかりません");
                self.record_audit(AuditLabel::TodoNotFound, id).await;
                Ok(None)
            }
            Err(e) => {
                error!(error = %e, id, "ToDo取得エラー");
                self.record_audit(AuditLabel::FindFailed, e.to_string()).await;
                Err(e)
            }
        }
    }

    /// IDで取得する。見つからない場合はエラーではなくゼロ値の `Todo` を返す
    /// （`Todo::is_empty` で判定する）
    pub async fn find_by_id(&self, id: &str) -> Result<Todo, TodoError> {
        Ok(self.lookup_by_id(id).await?.unwrap_or_default())
    }

    /// キーのみを射影して存在確認する。見つからない場合は `Ok(false)`
    pub async fn exists_by_id(&self, id: &str) -> Result<bool, TodoError> {
        info!(id, "ToDoの存在確認中");
        self.record_audit(AuditLabel::CheckingExistence, id).await;

        match self.store.contains(id).await {
            Ok(true) => {
                info!(id, "ToDoは存在します");
                self.record_audit(AuditLabel::TodoExists, format!("Todo with ID: {id} exists"))
                    .await;
                Ok(true)
            }
            Ok(false) => {
                info!(id, "ToDoは存在しません");
                self.record_audit(AuditLabel::TodoDoesNotExist, id).await;
                Ok(false)
            }
            Err(e) => {
                error!(error = %e, id, "ToDo存在確認エラー");
                self.record_audit(AuditLabel::ExistenceCheckFailed, e.to_string())
                    .await;
                Err(e)
            }
        }
    }

    /// 無条件に削除する。存在しないIDでもエラーにならない
    pub async fn delete_by_id(&self, id: &str) -> Result<(), TodoError> {
        info!(id, "ToDoを削除中");
        self.record_audit(AuditLabel::DeletingTodo, id).await;

        match self.store.delete(id).await {
            Ok(()) => {
                info!(id, "ToDo削除完了");
                self.record_audit(
                    AuditLabel::TodoDeleted,
                    format!("Todo with ID: {id} deleted successfully"),
                )
                .await;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, id, "ToDo削除エラー");
                self.record_audit(AuditLabel::DeleteFailed, e.to_string()).await;
                Err(e)
            }
        }
    }

    /// カーソル方式の一覧取得
    ///
    /// `status` 一致かつ `id > cursor` の行を最大 `limit` 件取得し、
    /// ソート前の最後のIDを次のカーソルとして返す。表示順は `created_at` 基準。
    pub async fn list_todos(&self, query: &ListQuery) -> Result<TodoPage, TodoError> {
        info!(
            cursor = %query.cursor,
            limit = query.limit,
            status = %query.status,
            sort_order = query.sort_order.as_str(),
            "ToDo一覧を取得中"
        );
        self.record_audit(
            AuditLabel::ListingTodos,
            format!(
                "LastID: {}, Limit: {}, Status: {}",
                query.cursor, query.limit, query.status
            ),
        )
        .await;

        if query.limit == 0 {
            let e = TodoError::Validation("limit must be greater than zero".to_string());
            warn!(error = %e, "ToDo一覧の取得条件が不正");
            self.record_audit(AuditLabel::ListFailed, e.to_string()).await;
            return Err(e);
        }

        let filter = ScanFilter::new(query.status.clone(), &query.cursor);
        let raw = match self.store.scan(&filter, query.limit).await {
            Ok(raw) => raw,
            Err(e) => {
                error!(error = %e, "ToDo一覧取得エラー");
                self.record_audit(AuditLabel::ListFailed, e.to_string()).await;
                return Err(e);
            }
        };

        if raw.is_empty() {
            info!("該当するToDoはありません");
            self.record_audit(AuditLabel::NoTodosFound, "No todos match the criteria.")
                .await;
            return Ok(TodoPage::default());
        }

        info!(count = raw.len(), "ToDo一覧取得完了");
        self.record_audit(AuditLabel::TodosFetched, format!("Count: {}", raw.len()))
            .await;

        Ok(build_page(raw, query.sort_order))
    }
}
