use crate::models::{attributes, item_id, item_to_todo, todo_to_item};
use crate::store::{ScanFilter, TodoStore};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::config::Region;
use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use domain::{Todo, TodoError};
use shared::Config;
use tracing::debug;

#[derive(Clone)]
pub struct DynamoDbClient {
    client: Client,
    table_name: String,
    consistent_read: bool,
}

impl DynamoDbClient {
    pub async fn new(config: &Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.aws_region.clone()));
        if let Some(endpoint) = &config.dynamodb_endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let aws_config = loader.load().await;

        Self::from_client(
            Client::new(&aws_config),
            config.dynamodb_table.clone(),
            config.consistent_read,
        )
    }

    pub fn from_client(client: Client, table_name: String, consistent_read: bool) -> Self {
        Self {
            client,
            table_name,
            consistent_read,
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn consistent_read(&self) -> bool {
        self.consistent_read
    }
}

/// SDKエラーを操作名付きの `TodoError` に変換
/// 接続失敗・タイムアウトは `Unavailable`、それ以外は `DynamoDb`
pub(crate) fn convert_error<E, R>(operation: &str, error: SdkError<E, R>) -> TodoError
where
    E: std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    let unavailable = matches!(
        error,
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_)
    );
    let message = DisplayErrorContext(error).to_string();

    if unavailable {
        TodoError::Unavailable(format!("{operation}: {message}"))
    } else {
        TodoError::store(operation, message)
    }
}

/// `id` をパーティションキーとするテーブルに対する `TodoStore` 実装
#[derive(Clone)]
pub struct DynamoDbTodoStore {
    db: DynamoDbClient,
    scan_page_size: Option<i32>,
}

impl DynamoDbTodoStore {
    pub fn new(db: DynamoDbClient) -> Self {
        Self {
            db,
            scan_page_size: None,
        }
    }

    /// Scan 1リクエストあたりの評価件数を固定する。未設定ならDynamoDBの既定（1MB単位）
    pub fn with_scan_page_size(mut self, page_size: i32) -> Self {
        self.scan_page_size = Some(page_size.max(1));
        self
    }

    pub fn db(&self) -> &DynamoDbClient {
        &self.db
    }
}

#[async_trait]
impl TodoStore for DynamoDbTodoStore {
    async fn put(&self, todo: &Todo) -> Result<(), TodoError> {
        self.db
            .client()
            .put_item()
            .table_name(self.db.table_name())
            .set_item(Some(todo_to_item(todo)))
            .send()
            .await
            .map_err(|e| convert_error("put_item", e))?;

        debug!(id = %todo.id, "put_item完了");
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Todo>, TodoError> {
        let output = self
            .db
            .client()
            .get_item()
            .table_name(self.db.table_name())
            .key(attributes::ID, AttributeValue::S(id.to_string()))
            .consistent_read(self.db.consistent_read())
            .send()
            .await
            .map_err(|e| convert_error("get_item", e))?;

        output.item.as_ref().map(item_to_todo).transpose()
    }

    async fn contains(&self, id: &str) -> Result<bool, TodoError> {
        let output = self
            .db
            .client()
            .get_item()
            .table_name(self.db.table_name())
            .key(attributes::ID, AttributeValue::S(id.to_string()))
            .projection_expression(attributes::ID)
            .consistent_read(self.db.consistent_read())
            .send()
            .await
            .map_err(|e| convert_error("get_item", e))?;

        match output.item {
            Some(item) => {
                item_id(&item)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), TodoError> {
        self.db
            .client()
            .delete_item()
            .table_name(self.db.table_name())
            .key(attributes::ID, AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(|e| convert_error("delete_item", e))?;

        debug!(id, "delete_item完了");
        Ok(())
    }

    /// フィルタ付きScan。DynamoDBの `Limit` はフィルタ前の評価件数なので
    /// 要求件数には使わず、一致件数が `limit` に届くかテーブル末尾まで
    /// `LastEvaluatedKey` を辿って手元で切り詰める
    async fn scan(&self, filter: &ScanFilter, limit: usize) -> Result<Vec<Todo>, TodoError> {
        let filter_expression = if filter.after.is_some() {
            "#id > :cursor AND #status = :status"
        } else {
            "#status = :status"
        };

        let mut todos = Vec::new();
        let mut exclusive_start_key = None;
        let mut pages = 0u32;

        while todos.len() < limit {
            let mut request = self
                .db
                .client()
                .scan()
                .table_name(self.db.table_name())
                .consistent_read(self.db.consistent_read())
                .filter_expression(filter_expression)
                .expression_attribute_names("#status", attributes::STATUS)
                .expression_attribute_values(":status", AttributeValue::S(filter.status.clone()))
                .set_limit(self.scan_page_size)
                .set_exclusive_start_key(exclusive_start_key.take());

            if let Some(after) = &filter.after {
                request = request
                    .expression_attribute_names("#id", attributes::ID)
                    .expression_attribute_values(":cursor", AttributeValue::S(after.clone()));
            }

            let output = request
                .send()
                .await
                .map_err(|e| convert_error("scan", e))?;
            pages += 1;

            for item in output.items() {
                todos.push(item_to_todo(item)?);
                if todos.len() == limit {
                    break;
                }
            }

            match output.last_evaluated_key {
                Some(key) if todos.len() < limit => exclusive_start_key = Some(key),
                _ => break,
            }
        }

        debug!(pages, count = todos.len(), "scan完了");
        Ok(todos)
    }
}
