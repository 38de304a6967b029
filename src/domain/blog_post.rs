// ブログ記事レコードのフォーマッター
//
// Notionページの異種プロパティマップをフラットなJSON表現に整形する。
// 純粋・決定的でI/Oを持たない。必須プロパティの欠落はMalformedRecordError。

use chrono::NaiveDate;
use notion_client::objects::page::Page;
use serde::Serialize;

use super::record::{
    self, MalformedRecordError, checkbox, cover_url, date_value, first_person_id,
    multi_select_names, select_name, title_text,
};
use super::status::{PublishStatus, STATUS_PROPERTY};

/// ブログデータベースのプロパティ名
const TITLE_PROPERTY: &str = "Title";
const CATEGORY_PROPERTY: &str = "Category";
const FEATURED_PROPERTY: &str = "Featured";
const PUBLISH_DATE_PROPERTY: &str = "Publish Date";
const TAGS_PROPERTY: &str = "Tags";
const AUTHOR_PROPERTY: &str = "Author";

/// ブログ記事のフラット表現
///
/// フェッチ時点のNotionページの読み取り専用プロジェクション。
/// `content`は単一記事取得時のみ存在する（リストでは省略）。
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub category: String,
    pub status: PublishStatus,
    pub featured: bool,
    pub publish_date: NaiveDate,
    pub tags: Vec<String>,
    /// 著者未設定はnull（nullableフィールド）
    pub author_id: Option<String>,
    /// カバー画像未設定はnull（nullableフィールド）
    pub cover_image: Option<String>,
    /// ページ本文のMarkdown（単一記事取得時のみ）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl BlogPost {
    /// NotionページからBlogPostを整形
    ///
    /// # 戻り値
    /// * `Ok(BlogPost)` - content未設定のレコード
    /// * `Err(MalformedRecordError)` - 必須プロパティの欠落・形状不一致
    pub fn from_page(page: &Page) -> Result<Self, MalformedRecordError> {
        Ok(Self {
            id: page.id.clone(),
            title: title_text(page, TITLE_PROPERTY)?,
            category: select_name(page, CATEGORY_PROPERTY)?,
            status: PublishStatus::from_name(&record::status_name(page, STATUS_PROPERTY)?),
            featured: checkbox(page, FEATURED_PROPERTY)?,
            publish_date: date_value(page, PUBLISH_DATE_PROPERTY)?,
            tags: multi_select_names(page, TAGS_PROPERTY)?,
            author_id: first_person_id(page, AUTHOR_PROPERTY)?,
            cover_image: cover_url(page),
            content: None,
        })
    }

    /// Markdown本文を付与したレコードを返す（単一記事取得用）
    pub fn with_content(mut self, content: String) -> Self {
        self.content = Some(content);
        self
    }
}
