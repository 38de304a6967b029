/// Notion接続設定
use thiserror::Error;

/// Notion設定のエラー型
#[derive(Debug, Error)]
pub enum NotionConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

/// インテグレーションキーとデータベースIDを持つNotion設定
///
/// この構造体は環境変数から読み込んだNotionインテグレーションの
/// 認証情報と参照先データベースIDを保持します。以下の環境変数で設定:
/// - NOTION_INTEGRATION_KEY: Notionインテグレーションのシークレットキー
/// - NOTION_BLOG_DATABASE_ID: ブログ記事データベースのID
/// - NOTION_WORK_DATABASE_ID: 制作実績データベースのID
#[derive(Debug, Clone)]
pub struct NotionConfig {
    /// インテグレーションのシークレットキー
    integration_key: String,
    /// ブログデータベースID
    blog_database_id: String,
    /// 制作実績データベースID
    work_database_id: String,
}

impl NotionConfig {
    /// 環境変数から新しいNotionConfigを作成
    ///
    /// 環境変数:
    /// - NOTION_INTEGRATION_KEY: インテグレーションキー
    /// - NOTION_BLOG_DATABASE_ID: ブログデータベースID
    /// - NOTION_WORK_DATABASE_ID: 制作実績データベースID
    pub fn from_env() -> Result<Self, NotionConfigError> {
        let integration_key = std::env::var("NOTION_INTEGRATION_KEY").map_err(|_| {
            NotionConfigError::MissingEnvVar("NOTION_INTEGRATION_KEY".to_string())
        })?;

        let blog_database_id = std::env::var("NOTION_BLOG_DATABASE_ID").map_err(|_| {
            NotionConfigError::MissingEnvVar("NOTION_BLOG_DATABASE_ID".to_string())
        })?;

        let work_database_id = std::env::var("NOTION_WORK_DATABASE_ID").map_err(|_| {
            NotionConfigError::MissingEnvVar("NOTION_WORK_DATABASE_ID".to_string())
        })?;

        Ok(Self {
            integration_key,
            blog_database_id,
            work_database_id,
        })
    }

    /// 明示的な値で新しいNotionConfigを作成（テスト用）
    pub fn new(
        integration_key: String,
        blog_database_id: String,
        work_database_id: String,
    ) -> Self {
        Self {
            integration_key,
            blog_database_id,
            work_database_id,
        }
    }

    /// インテグレーションキーを取得
    pub fn integration_key(&self) -> &str {
        &self.integration_key
    }

    /// ブログデータベースIDを取得
    pub fn blog_database_id(&self) -> &str {
        &self.blog_database_id
    }

    /// 制作実績データベースIDを取得
    pub fn work_database_id(&self) -> &str {
        &self.work_database_id
    }
}
