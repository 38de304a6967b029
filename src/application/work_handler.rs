// 制作実績ハンドラー
//
// リスト・詳細エンドポイントのユースケースを実装する。
// 構造はブログ記事ハンドラーと同型だが、タグ絞り込みとメタデータは持たない。

use std::sync::Arc;

use tracing::info;

use crate::application::response::ApiError;
use crate::domain::{PublishStatus, WorkItem, published_filter, render_markdown};
use crate::infrastructure::ContentStore;

/// 制作実績ハンドラー
pub struct WorkHandler<C: ContentStore> {
    /// コンテンツストア
    store: Arc<C>,
    /// 制作実績データベースID
    database_id: String,
}

impl<C: ContentStore> WorkHandler<C> {
    /// 新しいハンドラーを作成
    ///
    /// # Arguments
    /// * `store` - コンテンツストア実装
    /// * `database_id` - 制作実績データベースのID
    pub fn new(store: Arc<C>, database_id: String) -> Self {
        Self { store, database_id }
    }

    /// 公開済み制作実績のリストを取得
    ///
    /// # Arguments
    /// * `category` - カテゴリでの絞り込み（完全一致）
    pub async fn list(&self, category: Option<&str>) -> Result<Vec<WorkItem>, ApiError> {
        let filter = published_filter(category, None);
        let pages = self.store.query_database(&self.database_id, &filter).await?;

        let items = pages
            .iter()
            .map(WorkItem::from_page)
            .collect::<Result<Vec<_>, _>>()?;

        info!(count = items.len(), "制作実績リストを取得");
        Ok(items)
    }

    /// 制作実績を1件取得（Markdown本文付き）
    ///
    /// idの検証・下書きの404化・本文変換の流れはブログ記事詳細と同じ。
    pub async fn detail(&self, id: &str) -> Result<WorkItem, ApiError> {
        if id.is_empty() {
            return Err(ApiError::Validation("Record id is required".to_string()));
        }

        let page = self.store.retrieve_page(id).await?;

        // 下書きは存在しないものとして扱う（公開境界）
        if !PublishStatus::of_page(&page)?.is_published() {
            return Err(ApiError::NotFound);
        }

        let item = WorkItem::from_page(&page)?;
        let blocks = self.store.retrieve_block_tree(id).await?;

        info!(page_id = id, "制作実績を取得");
        Ok(item.with_content(render_markdown(&blocks)))
    }
}
