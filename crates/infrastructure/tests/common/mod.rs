#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use domain::Todo;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// テスト用のToDo（作成日時は秒指定）
pub fn todo(id: &str, status: &str, created_secs: i64) -> Todo {
    Todo {
        id: id.into(),
        user_id: "user-1".to_string(),
        title: format!("title {id}"),
        description: format!("description {id}"),
        status: status.to_string(),
        created_at: Utc.timestamp_opt(created_secs, 0).unwrap(),
        updated_at: Utc.timestamp_opt(created_secs + 60, 0).unwrap(),
    }
}

/// 受信したHTTPリクエスト
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// リクエスト行とヘッダー（小文字化済み）
    pub head: String,
    pub body: String,
}

/// 監査インデックスの代わりに固定ステータスを返すHTTPサーバー
pub struct FakeIndex {
    pub base_url: String,
    requests: mpsc::UnboundedReceiver<CapturedRequest>,
    handle: JoinHandle<()>,
}

impl FakeIndex {
    pub async fn spawn(status_line: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let (sender, requests) = mpsc::unbounded_channel();

        let handle = tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let sender = sender.clone();
                tokio::spawn(serve_connection(socket, status_line, sender));
            }
        });

        Self {
            base_url,
            requests,
            handle,
        }
    }

    pub async fn next_request(&mut self) -> CapturedRequest {
        tokio::time::timeout(Duration::from_secs(5), self.requests.recv())
            .await
            .expect("監査リクエストが届かない")
            .expect("サーバーが停止している")
    }

    pub fn received_count(&mut self) -> usize {
        let mut count = 0;
        while self.requests.try_recv().is_ok() {
            count += 1;
        }
        count
    }
}

impl Drop for FakeIndex {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve_connection(
    mut socket: TcpStream,
    status_line: &'static str,
    sender: mpsc::UnboundedSender<CapturedRequest>,
) {
    while let Some(request) = read_request(&mut socket).await {
        let _ = sender.send(request);
        let response = format!(
            "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: 2\r\n\r\n{{}}"
        );
        if socket.write_all(response.as_bytes()).await.is_err() {
            break;
        }
    }
}

async fn read_request(socket: &mut TcpStream) -> Option<CapturedRequest> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        if let Some(position) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
            break position;
        }
        let read = socket.read(&mut chunk).await.ok()?;
        if read == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..read]);
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let body_start = header_end + 4;
    while buffer.len() < body_start + content_length {
        let read = socket.read(&mut chunk).await.ok()?;
        if read == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..read]);
    }

    Some(CapturedRequest {
        head,
        body: String::from_utf8_lossy(&buffer[body_start..body_start + content_length]).to_string(),
    })
}
