// 公開状態の可視性境界
//
// Draftレコードはリスト・直接参照のどちらでも呼び出し元に返却しない。
// "Published"以外のステータス名はすべて非公開として扱う（可視性の保護が
// 不変条件であり、未知のステータス値を公開側に倒してはならない）。

use notion_client::objects::page::Page;
use serde::Serialize;

use super::record::{MalformedRecordError, status_name};

/// ステータスプロパティ名（ブログ・ワーク共通）
pub(crate) const STATUS_PROPERTY: &str = "Status";

/// 公開ステータス名
const PUBLISHED_NAME: &str = "Published";

/// レコードの公開状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PublishStatus {
    /// 公開済み - APIから参照可能
    Published,
    /// 下書き - 存在しないものとして扱う
    Draft,
}

impl PublishStatus {
    /// ステータス値名から公開状態を判定
    pub fn from_name(name: &str) -> Self {
        if name == PUBLISHED_NAME {
            Self::Published
        } else {
            Self::Draft
        }
    }

    /// ページのStatusプロパティから公開状態を判定
    ///
    /// フォーマット前の可視性チェックに使用する。Statusプロパティの
    /// 欠落はスキーマドリフトとしてエラーになる。
    pub fn of_page(page: &Page) -> Result<Self, MalformedRecordError> {
        Ok(Self::from_name(&status_name(page, STATUS_PROPERTY)?))
    }

    /// 公開済みか
    pub fn is_published(self) -> bool {
        self == Self::Published
    }
}
