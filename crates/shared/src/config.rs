use std::env;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// 監査ログ送信先（OpenSearch互換のインデックス）の設定
#[derive(Clone, PartialEq, Eq)]
pub struct AuditConfig {
    /// 末尾の `/` を含まないベースURL
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// None の場合はHTTPクライアントの既定値に従う
    pub timeout: Option<Duration>,
}

impl AuditConfig {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            username: username.into(),
            password: password.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

// パスワードはログに出さない
impl std::fmt::Debug for AuditConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"***")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// プロセス全体の設定。起動時に一度だけ構築し、以後は変更しない
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub dynamodb_table: String,
    /// ログに付与するデプロイ環境名
    pub environment: String,
    pub aws_region: String,
    /// DynamoDB Local などのエンドポイント上書き
    pub dynamodb_endpoint: Option<String>,
    /// 全操作共通。false は結果整合性読み込み（最弱の一貫性レベル）
    pub consistent_read: bool,
    pub audit: AuditConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を組み立てる（テストで環境変数を汚さないため）
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let consistent_read = match lookup("DYNAMODB_CONSISTENT_READ") {
            Some(value) => parse_bool("DYNAMODB_CONSISTENT_READ", &value)?,
            None => false,
        };

        let timeout = match lookup("AUDIT_TIMEOUT_MS") {
            Some(value) => {
                let millis = value.parse::<u64>().map_err(|_| ConfigError::Invalid {
                    name: "AUDIT_TIMEOUT_MS",
                    value: value.clone(),
                })?;
                Some(Duration::from_millis(millis))
            }
            None => None,
        };

        let password = lookup("OPENSEARCH_PASSWORD").ok_or(ConfigError::Missing("OPENSEARCH_PASSWORD"))?;

        let mut audit = AuditConfig::new(
            lookup("OPENSEARCH_URL").unwrap_or_else(|| "http://localhost:9200".to_string()),
            lookup("OPENSEARCH_USERNAME").unwrap_or_else(|| "admin".to_string()),
            password,
        );
        audit.timeout = timeout;

        Ok(Config {
            dynamodb_table: lookup("DYNAMODB_TABLE").unwrap_or_else(|| "todos-dev".to_string()),
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "dev".to_string()),
            aws_region: lookup("AWS_REGION").unwrap_or_else(|| "ap-northeast-1".to_string()),
            dynamodb_endpoint: lookup("DYNAMODB_ENDPOINT").filter(|endpoint| !endpoint.is_empty()),
            consistent_read,
            audit,
        })
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
        }),
    }
}
