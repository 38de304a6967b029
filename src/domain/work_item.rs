// ワーク（ポートフォリオ実績）レコードのフォーマッター
//
// BlogPost同様、フェッチ時点のページの読み取り専用プロジェクション。

use notion_client::objects::page::Page;
use serde::Serialize;

use super::record::{
    self, MalformedRecordError, cover_url, file_urls, multi_select_names, number_value,
    rich_text_value, select_name, title_text, url_value,
};
use super::status::{PublishStatus, STATUS_PROPERTY};

/// ワークデータベースのプロパティ名
const PROJECT_NAME_PROPERTY: &str = "Project Name";
const CLIENT_PROPERTY: &str = "Client";
const ROLE_PROPERTY: &str = "Role";
const DURATION_PROPERTY: &str = "Duration";
const CATEGORY_PROPERTY: &str = "Category";
const YEAR_PROPERTY: &str = "Year";
const DESCRIPTION_PROPERTY: &str = "Description";
const TECHNOLOGIES_PROPERTY: &str = "Technologies";
const WEBSITE_PROPERTY: &str = "Website";
const IMAGES_PROPERTY: &str = "Images";

/// ポートフォリオ実績のフラット表現
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub id: String,
    pub project_name: String,
    pub client: String,
    pub role: String,
    pub duration: String,
    pub category: String,
    pub status: PublishStatus,
    pub year: i64,
    pub description: String,
    pub technologies: Vec<String>,
    /// サイト未公開はnull（nullableフィールド）
    pub website: Option<String>,
    /// 掲載順を保持した画像URLリスト
    pub images: Vec<String>,
    /// カバー画像未設定はnull（nullableフィールド）
    pub cover_image: Option<String>,
    /// ページ本文のMarkdown（単一取得時のみ）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl WorkItem {
    /// NotionページからWorkItemを整形
    pub fn from_page(page: &Page) -> Result<Self, MalformedRecordError> {
        Ok(Self {
            id: page.id.clone(),
            project_name: title_text(page, PROJECT_NAME_PROPERTY)?,
            client: rich_text_value(page, CLIENT_PROPERTY)?,
            role: rich_text_value(page, ROLE_PROPERTY)?,
            duration: rich_text_value(page, DURATION_PROPERTY)?,
            category: select_name(page, CATEGORY_PROPERTY)?,
            status: PublishStatus::from_name(&record::status_name(page, STATUS_PROPERTY)?),
            year: number_value(page, YEAR_PROPERTY)?,
            description: rich_text_value(page, DESCRIPTION_PROPERTY)?,
            technologies: multi_select_names(page, TECHNOLOGIES_PROPERTY)?,
            website: url_value(page, WEBSITE_PROPERTY)?,
            images: file_urls(page, IMAGES_PROPERTY)?,
            cover_image: cover_url(page),
            content: None,
        })
    }

    /// Markdown本文を付与したレコードを返す（単一取得用）
    pub fn with_content(mut self, content: String) -> Self {
        self.content = Some(content);
        self
    }
}
