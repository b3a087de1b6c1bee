//! 監査ログ（副チャネル）
//!
//! 主ストアの操作の前後にイベントを記録する。送信はベストエフォートで、
//! 失敗はローカルのログに残すだけで呼び出し元には伝播しない。

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use shared::AuditConfig;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// 監査イベントを書き込むインデックス
pub const AUDIT_INDEX: &str = "todo-logs";

/// 監査イベントのラベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditLabel {
    SavingTodo,
    TodoSaved,
    SaveFailed,
    FindingTodo,
    TodoFound,
    TodoNotFound,
    FindFailed,
    DeletingTodo,
    TodoDeleted,
    DeleteFailed,
    CheckingExistence,
    TodoExists,
    TodoDoesNotExist,
    ExistenceCheckFailed,
    ListingTodos,
    TodosFetched,
    NoTodosFound,
    ListFailed,
}

impl AuditLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditLabel::SavingTodo => "Saving todo",
            AuditLabel::TodoSaved => "Todo saved",
            AuditLabel::SaveFailed => "Error saving todo",
            AuditLabel::FindingTodo => "Finding todo by ID",
            AuditLabel::TodoFound => "Todo found",
            AuditLabel::TodoNotFound => "Todo not found",
            AuditLabel::FindFailed => "Error finding todo",
            AuditLabel::DeletingTodo => "Deleting todo by ID",
            AuditLabel::TodoDeleted => "Todo deleted",
            AuditLabel::DeleteFailed => "Error deleting todo",
            AuditLabel::CheckingExistence => "Checking if todo exists by ID",
            AuditLabel::TodoExists => "Todo exists",
            AuditLabel::TodoDoesNotExist => "Todo does not exist",
            AuditLabel::ExistenceCheckFailed => "Error checking todo existence",
            AuditLabel::ListingTodos => "Listing todos",
            AuditLabel::TodosFetched => "Todos fetched",
            AuditLabel::NoTodosFound => "No todos found",
            AuditLabel::ListFailed => "Error listing todos",
        }
    }
}

/// インデックスに送るドキュメント
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event: String,
    pub message: String,
}

impl AuditEvent {
    pub fn new(event: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            message: message.into(),
        }
    }
}

/// 送信失敗の分類（ログ出力専用で、呼び出し元には返さない）
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Failed to serialize audit event: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to send audit event: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Audit index responded with status: {0}")]
    UnexpectedStatus(StatusCode),
}

/// 監査イベントの記録先
///
/// `record` は失敗を返さない。実装は失敗を自分で処理すること。
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: &str, message: &str);
}

/// 何もしないシンク
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditSink;

#[async_trait]
impl AuditSink for NoopAuditSink {
    async fn record(&self, _event: &str, _message: &str) {}
}

/// 受け取った順にイベントを保持するシンク
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn labels(&self) -> Vec<String> {
        self.events().into_iter().map(|event| event.event).collect()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn record(&self, event: &str, message: &str) {
        match self.events.lock() {
            Ok(mut events) => events.push(AuditEvent::new(event, message)),
            Err(_) => warn!(event, "監査イベントのバッファが破損しているため破棄"),
        }
    }
}

/// OpenSearch互換インデックスへのHTTP送信
///
/// `POST {base_url}/todo-logs/_doc` にBasic認証付きでJSONを送る。
/// 201以外はすべて失敗としてログに残し、リトライしない。
#[derive(Clone)]
pub struct OpenSearchAuditSink {
    client: reqwest::Client,
    endpoint: String,
    username: String,
    password: String,
}

impl OpenSearchAuditSink {
    pub fn new(config: &AuditConfig) -> Result<Self, AuditError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?, config))
    }

    /// 共有HTTPクライアントを使って作成
    pub fn with_client(client: reqwest::Client, config: &AuditConfig) -> Self {
        Self {
            client,
            endpoint: format!(
                "{}/{}/_doc",
                config.base_url.trim_end_matches('/'),
                AUDIT_INDEX
            ),
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// 1件送信する。失敗は分類して返す
    pub async fn send(&self, event: &AuditEvent) -> Result<(), AuditError> {
        let body = serde_json::to_vec(event)?;

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.username, Some(&self.password))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        if response.status() != StatusCode::CREATED {
            return Err(AuditError::UnexpectedStatus(response.status()));
        }

        debug!(event = %event.event, "監査イベント送信完了");
        Ok(())
    }
}

#[async_trait]
impl AuditSink for OpenSearchAuditSink {
    async fn record(&self, event: &str, message: &str) {
        if let Err(e) = self.send(&AuditEvent::new(event, message)).await {
            error!(error = %e, event, endpoint = %self.endpoint, "監査イベントの送信に失敗");
        }
    }
}

/// `BackgroundAuditSink::spawn` のキュー容量
pub const DEFAULT_AUDIT_QUEUE_CAPACITY: usize = 1024;

/// 単一のバックグラウンドタスクが順番に内側のシンクへ転送するシンク
///
/// 主処理の遅延を監査先の遅延から切り離す。転送は単一タスクで直列に行うため
/// 受け付けた順序が保たれる。キューが満杯の間に届いたイベントは破棄する。
#[derive(Clone)]
pub struct BackgroundAuditSink {
    sender: mpsc::Sender<AuditEvent>,
}

impl BackgroundAuditSink {
    /// 既定の容量で転送タスクを起動する
    ///
    /// Tokioランタイム外で呼ぶとパニックする。
    pub fn spawn(inner: Arc<dyn AuditSink>) -> (Self, JoinHandle<()>) {
        Self::with_capacity(inner, DEFAULT_AUDIT_QUEUE_CAPACITY)
    }

    /// 容量を指定して転送タスクを起動する。すべての送信側が破棄されるとタスクは終了する
    ///
    /// Tokioランタイム外で呼ぶとパニックする。
    pub fn with_capacity(inner: Arc<dyn AuditSink>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::channel::<AuditEvent>(capacity.max(1));

        let handle = tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                inner.record(&event.event, &event.message).await;
            }
            debug!("監査イベント転送タスク終了");
        });

        (Self { sender }, handle)
    }
}

#[async_trait]
impl AuditSink for BackgroundAuditSink {
    async fn record(&self, event: &str, message: &str) {
        match self.sender.try_send(AuditEvent::new(event, message)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(event, "監査イベントのキューが満杯のため破棄");
            }
            Err(TrySendError::Closed(_)) => {
                warn!(event, "監査イベント転送タスクが停止しているため破棄");
            }
        }
    }
}
