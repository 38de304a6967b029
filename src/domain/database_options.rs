// ブログデータベーススキーマのメタデータ射影
//
// フィルターUI構築用に、CategoryセレクトとTagsマルチセレクトの
// 選択肢名のみを返す。実際のレコード内容には依存しない。

use notion_client::objects::database::{Database, DatabaseProperty};
use serde::Serialize;

use super::record::MalformedRecordError;

const CATEGORY_PROPERTY: &str = "Category";
const TAGS_PROPERTY: &str = "Tags";

/// フィルターUI用の選択肢メタデータ
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DatabaseOptions {
    /// Categoryセレクトの選択肢名
    pub categories: Vec<String>,
    /// Tagsマルチセレクトの選択肢名
    pub tags: Vec<String>,
}

impl DatabaseOptions {
    /// データベーススキーマから選択肢を抽出
    ///
    /// # 戻り値
    /// * `Ok(DatabaseOptions)` - スキーマ定義順の選択肢名
    /// * `Err(MalformedRecordError)` - プロパティの欠落・型不一致（スキーマドリフト）
    pub fn from_database(database: &Database) -> Result<Self, MalformedRecordError> {
        Ok(Self {
            categories: select_options(database, CATEGORY_PROPERTY)?,
            tags: multi_select_options(database, TAGS_PROPERTY)?,
        })
    }
}

fn schema_property<'a>(
    database: &'a Database,
    name: &str,
) -> Result<&'a DatabaseProperty, MalformedRecordError> {
    database
        .properties
        .get(name)
        .ok_or_else(|| MalformedRecordError::MissingProperty(name.to_string()))
}

fn select_options(database: &Database, name: &str) -> Result<Vec<String>, MalformedRecordError> {
    match schema_property(database, name)? {
        DatabaseProperty::Select { select, .. } => {
            Ok(select.options.iter().map(|o| o.name.clone()).collect())
        }
        _ => Err(MalformedRecordError::UnexpectedShape {
            property: name.to_string(),
            detail: "expected a select property".to_string(),
        }),
    }
}

fn multi_select_options(
    database: &Database,
    name: &str,
) -> Result<Vec<String>, MalformedRecordError> {
    match schema_property(database, name)? {
        DatabaseProperty::MultiSelect { multi_select, .. } => {
            Ok(multi_select.options.iter().map(|o| o.name.clone()).collect())
        }
        _ => Err(MalformedRecordError::UnexpectedShape {
            property: name.to_string(),
            detail: "expected a multi_select property".to_string(),
        }),
    }
}
