// Notionページプロパティの型検証付きデコードヘルパー
//
// フォーマッターはプロパティマップへの文字列キー参照に依存するため、
// 欠落・型不一致は深い箇所でのpanicではなく単一のMalformedRecordErrorとして
// 表面化させる。スキーマドリフトの検出が目的であり、暗黙のデフォルト値は
// ドキュメント化されたnullableフィールド以外では許容しない。

use chrono::NaiveDate;
use notion_client::objects::file::File;
use notion_client::objects::page::{DateOrDateTime, Page, PageProperty};
use notion_client::objects::rich_text::RichText;
use thiserror::Error;

/// レコード整形のエラー型
///
/// 必須プロパティの欠落または予期しない形状を表す。
/// 上流スキーマの変更を示すシグナルであり、握り潰してはならない。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MalformedRecordError {
    /// 必須プロパティが存在しない
    #[error("required property is missing: {0}")]
    MissingProperty(String),

    /// プロパティは存在するが形状が期待と異なる
    #[error("property '{property}' has unexpected shape: {detail}")]
    UnexpectedShape { property: String, detail: String },
}

impl MalformedRecordError {
    fn shape(property: &str, detail: impl Into<String>) -> Self {
        Self::UnexpectedShape {
            property: property.to_string(),
            detail: detail.into(),
        }
    }
}

/// プロパティを名前で取得（欠落はエラー）
fn property<'a>(page: &'a Page, name: &str) -> Result<&'a PageProperty, MalformedRecordError> {
    page.properties
        .get(name)
        .ok_or_else(|| MalformedRecordError::MissingProperty(name.to_string()))
}

/// リッチテキスト配列をプレーンテキストに連結
pub(crate) fn plain_text(rich_text: &[RichText]) -> String {
    rich_text.iter().map(span_plain_text).collect()
}

/// 単一リッチテキスト要素のプレーンテキスト
fn span_plain_text(span: &RichText) -> String {
    match span {
        RichText::Text {
            text, plain_text, ..
        } => plain_text.clone().unwrap_or_else(|| text.content.clone()),
        RichText::Mention { plain_text, .. } => plain_text.clone(),
        RichText::Equation { plain_text, .. } => plain_text.clone(),
        _ => String::new(),
    }
}

/// タイトルプロパティの先頭リッチテキスト要素を取得
///
/// 空のタイトル配列はスキーマドリフトとして扱いエラーにする。
pub(crate) fn title_text(page: &Page, name: &str) -> Result<String, MalformedRecordError> {
    match property(page, name)? {
        PageProperty::Title { title, .. } => match title.first() {
            Some(first) => Ok(span_plain_text(first)),
            None => Err(MalformedRecordError::shape(name, "title array is empty")),
        },
        _ => Err(MalformedRecordError::shape(name, "expected a title property")),
    }
}

/// リッチテキストプロパティをプレーンテキストとして取得
pub(crate) fn rich_text_value(page: &Page, name: &str) -> Result<String, MalformedRecordError> {
    match property(page, name)? {
        PageProperty::RichText { rich_text, .. } => Ok(plain_text(rich_text)),
        _ => Err(MalformedRecordError::shape(
            name,
            "expected a rich_text property",
        )),
    }
}

/// 単一セレクトプロパティの選択値名を取得（未選択はエラー）
pub(crate) fn select_name(page: &Page, name: &str) -> Result<String, MalformedRecordError> {
    match property(page, name)? {
        PageProperty::Select { select, .. } => select
            .as_ref()
            .and_then(|s| s.name.clone())
            .ok_or_else(|| MalformedRecordError::shape(name, "select value is not set")),
        _ => Err(MalformedRecordError::shape(name, "expected a select property")),
    }
}

/// ステータスプロパティの値名を取得（未設定はエラー）
pub(crate) fn status_name(page: &Page, name: &str) -> Result<String, MalformedRecordError> {
    match property(page, name)? {
        PageProperty::Status { status, .. } => status
            .as_ref()
            .and_then(|s| s.name.clone())
            .ok_or_else(|| MalformedRecordError::shape(name, "status value is not set")),
        _ => Err(MalformedRecordError::shape(name, "expected a status property")),
    }
}

/// チェックボックスプロパティを取得
pub(crate) fn checkbox(page: &Page, name: &str) -> Result<bool, MalformedRecordError> {
    match property(page, name)? {
        PageProperty::Checkbox { checkbox, .. } => Ok(*checkbox),
        _ => Err(MalformedRecordError::shape(
            name,
            "expected a checkbox property",
        )),
    }
}

/// 日付プロパティの開始日を取得（未設定はエラー）
pub(crate) fn date_value(page: &Page, name: &str) -> Result<NaiveDate, MalformedRecordError> {
    match property(page, name)? {
        PageProperty::Date { date, .. } => date
            .as_ref()
            .and_then(|d| d.start.as_ref())
            .map(resolve_date)
            .ok_or_else(|| MalformedRecordError::shape(name, "date value is not set")),
        _ => Err(MalformedRecordError::shape(name, "expected a date property")),
    }
}

/// 数値プロパティを整数として取得（未設定はエラー）
pub(crate) fn number_value(page: &Page, name: &str) -> Result<i64, MalformedRecordError> {
    match property(page, name)? {
        PageProperty::Number { number, .. } => number
            .as_ref()
            .and_then(|n| n.as_i64())
            .ok_or_else(|| MalformedRecordError::shape(name, "number value is not set")),
        _ => Err(MalformedRecordError::shape(name, "expected a number property")),
    }
}

/// マルチセレクトプロパティの選択値名リストを取得
pub(crate) fn multi_select_names(
    page: &Page,
    name: &str,
) -> Result<Vec<String>, MalformedRecordError> {
    match property(page, name)? {
        PageProperty::MultiSelect { multi_select, .. } => Ok(multi_select
            .iter()
            .filter_map(|s| s.name.clone())
            .collect()),
        _ => Err(MalformedRecordError::shape(
            name,
            "expected a multi_select property",
        )),
    }
}

/// ピープルプロパティの先頭ユーザーIDを取得
///
/// 担当者未設定は正当な状態のためNoneを返す（nullableフィールド）。
pub(crate) fn first_person_id(
    page: &Page,
    name: &str,
) -> Result<Option<String>, MalformedRecordError> {
    match property(page, name)? {
        PageProperty::People { people, .. } => Ok(people.first().map(|u| u.id.clone())),
        _ => Err(MalformedRecordError::shape(name, "expected a people property")),
    }
}

/// URLプロパティを取得（未設定はNone、nullableフィールド）
pub(crate) fn url_value(page: &Page, name: &str) -> Result<Option<String>, MalformedRecordError> {
    match property(page, name)? {
        PageProperty::Url { url, .. } => Ok(url.clone()),
        _ => Err(MalformedRecordError::shape(name, "expected a url property")),
    }
}

/// ファイルプロパティのURLリストを順序を保って取得
pub(crate) fn file_urls(page: &Page, name: &str) -> Result<Vec<String>, MalformedRecordError> {
    match property(page, name)? {
        PageProperty::Files { files, .. } => {
            Ok(files.iter().map(|f| file_url(&f.file)).collect())
        }
        _ => Err(MalformedRecordError::shape(name, "expected a files property")),
    }
}

/// ページカバー画像のURLを取得（カバー未設定はNone、nullableフィールド）
pub(crate) fn cover_url(page: &Page) -> Option<String> {
    page.cover.as_ref().map(file_url)
}

/// ファイルオブジェクトからURLを取り出す
fn file_url(file: &File) -> String {
    match file {
        File::External { external } => external.url.clone(),
        File::File { file } => file.url.clone(),
    }
}

/// 日付または日時を日付に解決
fn resolve_date(value: &DateOrDateTime) -> NaiveDate {
    match value {
        DateOrDateTime::Date(date) => *date,
        DateOrDateTime::DateTime(datetime) => datetime.date_naive(),
    }
}
