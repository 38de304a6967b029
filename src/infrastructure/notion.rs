// Notion APIクライアント
//
// レコードの取得をContentStoreトレイトとして抽象化し、
// reqwestベースのNotion REST API実装を提供する。
// レスポンスの型付けはnotion-clientクレートのオブジェクト定義を利用する。

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use notion_client::objects::block::Block;
use notion_client::objects::database::Database;
use notion_client::objects::page::Page;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::domain::BlockNode;
use crate::infrastructure::NotionConfig;

/// Notion APIのベースURL
const API_BASE_URL: &str = "https://api.notion.com/v1";

/// Notion APIバージョンヘッダーの値
const NOTION_VERSION: &str = "2022-06-28";

/// 1リクエストあたりの最大取得件数
const QUERY_PAGE_SIZE: u32 = 100;

/// ブロックツリーの最大ネスト深度
///
/// Notion側の循環はないが、深いネストでのリクエスト爆発を防ぐ。
const MAX_BLOCK_DEPTH: usize = 3;

/// HTTPリクエストのタイムアウト
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// コンテンツストアのエラー
#[derive(Debug, Error)]
pub enum ContentStoreError {
    /// Notion APIがエラーレスポンスを返した
    #[error("Notion APIエラー: status={status}, code={code}, message={message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// HTTPリクエストの送信に失敗
    #[error("Notion APIへのリクエストに失敗: {0}")]
    Network(String),

    /// レスポンスボディのデシリアライズに失敗
    #[error("Notion APIレスポンスのデシリアライズに失敗: {0}")]
    Deserialization(String),

    /// クライアントの初期化に失敗
    #[error("Notion APIクライアントの初期化に失敗: {0}")]
    Configuration(String),
}

impl ContentStoreError {
    /// 対象オブジェクトが存在しない（またはインテグレーションに未共有）か
    ///
    /// Notionは未共有のページにもobject_not_foundを返すため、
    /// 存在しない場合と区別できない。
    pub fn is_not_found(&self) -> bool {
        matches!(self, ContentStoreError::Api { code, .. } if code == "object_not_found")
    }
}

impl From<reqwest::Error> for ContentStoreError {
    fn from(err: reqwest::Error) -> Self {
        ContentStoreError::Network(err.to_string())
    }
}

/// コンテンツストアへの読み取りアクセス
///
/// アプリケーション層のハンドラーはこのトレイト越しにレコードを取得する。
/// テストではモック実装に差し替える。
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// フィルター条件に一致するページを全件取得
    async fn query_database(
        &self,
        database_id: &str,
        filter: &Value,
    ) -> Result<Vec<Page>, ContentStoreError>;

    /// ページを1件取得
    async fn retrieve_page(&self, page_id: &str) -> Result<Page, ContentStoreError>;

    /// データベースのスキーマを取得
    async fn retrieve_database(&self, database_id: &str) -> Result<Database, ContentStoreError>;

    /// ページ本文のブロックツリーを取得
    ///
    /// `has_children`のブロックは子を再帰的に解決する。
    async fn retrieve_block_tree(&self, block_id: &str)
    -> Result<Vec<BlockNode>, ContentStoreError>;
}

/// ページネーション付きレスポンス
#[derive(Debug, Deserialize)]
struct PaginatedResponse<T> {
    results: Vec<T>,
    next_cursor: Option<String>,
    has_more: bool,
}

/// Notion REST APIクライアント
#[derive(Clone)]
pub struct NotionApiClient {
    client: reqwest::Client,
}

impl NotionApiClient {
    /// 認証ヘッダーを設定済みのクライアントを作成
    ///
    /// # Arguments
    /// * `config` - インテグレーションキーを含むNotion設定
    pub fn new(config: &NotionConfig) -> Result<Self, ContentStoreError> {
        let mut headers = HeaderMap::new();

        let mut authorization =
            HeaderValue::from_str(&format!("Bearer {}", config.integration_key()))
                .map_err(|e| ContentStoreError::Configuration(e.to_string()))?;
        authorization.set_sensitive(true);
        headers.insert(AUTHORIZATION, authorization);
        headers.insert("Notion-Version", HeaderValue::from_static(NOTION_VERSION));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ContentStoreError::Configuration(e.to_string()))?;

        Ok(Self { client })
    }

    /// データベースクエリを1ページ分実行
    async fn query_database_once(
        &self,
        database_id: &str,
        filter: &Value,
        cursor: Option<String>,
    ) -> Result<PaginatedResponse<Page>, ContentStoreError> {
        let url = format!("{API_BASE_URL}/databases/{database_id}/query");
        let mut body = serde_json::json!({
            "filter": filter,
            "page_size": QUERY_PAGE_SIZE,
        });
        if let Some(cursor) = cursor {
            body["start_cursor"] = Value::String(cursor);
        }

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        parse_api_response(status, &text)
    }

    /// 子ブロックリストを1ページ分取得
    async fn list_block_children_once(
        &self,
        block_id: &str,
        cursor: Option<String>,
    ) -> Result<PaginatedResponse<Block>, ContentStoreError> {
        let url = format!("{API_BASE_URL}/blocks/{block_id}/children");
        let mut request = self
            .client
            .get(&url)
            .query(&[("page_size", QUERY_PAGE_SIZE)]);
        if let Some(cursor) = &cursor {
            request = request.query(&[("start_cursor", cursor)]);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        parse_api_response(status, &text)
    }

    /// 子ブロックをページネーションを辿って全件取得
    async fn list_block_children(&self, block_id: &str) -> Result<Vec<Block>, ContentStoreError> {
        let mut blocks = Vec::new();
        let mut cursor = None;

        loop {
            let page = self.list_block_children_once(block_id, cursor).await?;
            blocks.extend(page.results);
            if !page.has_more {
                break;
            }
            cursor = page.next_cursor;
        }

        Ok(blocks)
    }

    /// ブロックツリーを深さ制限付きで再帰的に構築
    fn fetch_block_tree(
        &self,
        block_id: String,
        depth: usize,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<BlockNode>, ContentStoreError>> + Send + '_>> {
        Box::pin(async move {
            let blocks = self.list_block_children(&block_id).await?;
            let mut nodes = Vec::with_capacity(blocks.len());

            for block in blocks {
                let children = match (&block.id, block.has_children.unwrap_or(false)) {
                    (Some(id), true) if depth < MAX_BLOCK_DEPTH => {
                        self.fetch_block_tree(id.clone(), depth + 1).await?
                    }
                    _ => Vec::new(),
                };
                nodes.push(BlockNode { block, children });
            }

            Ok(nodes)
        })
    }
}

#[async_trait]
impl ContentStore for NotionApiClient {
    /// ## 処理フロー
    /// 1. フィルター付きでデータベースクエリを実行
    /// 2. has_moreの間next_cursorを使って続きを取得
    /// 3. 全ページを結合して返す
    async fn query_database(
        &self,
        database_id: &str,
        filter: &Value,
    ) -> Result<Vec<Page>, ContentStoreError> {
        let mut pages = Vec::new();
        let mut cursor = None;

        loop {
            let page = self
                .query_database_once(database_id, filter, cursor)
                .await?;
            pages.extend(page.results);
            if !page.has_more {
                break;
            }
            cursor = page.next_cursor;
        }

        debug!(database_id, count = pages.len(), "データベースクエリ完了");
        Ok(pages)
    }

    async fn retrieve_page(&self, page_id: &str) -> Result<Page, ContentStoreError> {
        let url = format!("{API_BASE_URL}/pages/{page_id}");
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let text = response.text().await?;
        parse_api_response(status, &text)
    }

    async fn retrieve_database(&self, database_id: &str) -> Result<Database, ContentStoreError> {
        let url = format!("{API_BASE_URL}/databases/{database_id}");
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let text = response.text().await?;
        parse_api_response(status, &text)
    }

    async fn retrieve_block_tree(
        &self,
        block_id: &str,
    ) -> Result<Vec<BlockNode>, ContentStoreError> {
        self.fetch_block_tree(block_id.to_string(), 0).await
    }
}

/// Notion APIレスポンスをパース
///
/// 成功ステータスならボディを`T`としてデシリアライズし、
/// エラーステータスならNotionのエラーオブジェクトをContentStoreError::Apiに変換する。
fn parse_api_response<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
) -> Result<T, ContentStoreError> {
    if status.is_success() {
        return serde_json::from_str(body)
            .map_err(|e| ContentStoreError::Deserialization(e.to_string()));
    }

    match serde_json::from_str::<notion_client::objects::error::Error>(body) {
        Ok(error) => Err(ContentStoreError::Api {
            status: status.as_u16(),
            code: error.code,
            message: error.message,
        }),
        // エラーボディ自体が壊れている場合はステータスのみで報告
        Err(_) => Err(ContentStoreError::Api {
            status: status.as_u16(),
            code: "unknown".to_string(),
            message: body.chars().take(200).collect(),
        }),
    }
}
