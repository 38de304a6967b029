// ブログ記事ハンドラー
//
// リスト・詳細・メタデータの各エンドポイントのユースケースを実装する。
// レコードの取得はContentStoreトレイト越しに行い、整形はドメイン層に委譲する。

use std::sync::Arc;

use tracing::info;

use crate::application::response::ApiError;
use crate::domain::{
    BlogPost, DatabaseOptions, PublishStatus, published_filter, render_markdown,
};
use crate::infrastructure::ContentStore;

/// ブログ記事ハンドラー
pub struct BlogHandler<C: ContentStore> {
    /// コンテンツストア
    store: Arc<C>,
    /// ブログデータベースID
    database_id: String,
}

impl<C: ContentStore> BlogHandler<C> {
    /// 新しいハンドラーを作成
    ///
    /// # Arguments
    /// * `store` - コンテンツストア実装
    /// * `database_id` - ブログデータベースのID
    pub fn new(store: Arc<C>, database_id: String) -> Self {
        Self { store, database_id }
    }

    /// 公開済みブログ記事のリストを取得
    ///
    /// ## 処理フロー
    /// 1. Status=Publishedを基本に、category/tagの絞り込み条件を合成
    /// 2. データベースクエリを実行
    /// 3. 各ページをBlogPostに整形（contentは含まない）
    ///
    /// # Arguments
    /// * `category` - カテゴリでの絞り込み（完全一致）
    /// * `tag` - タグでの絞り込み（contains）
    pub async fn list(
        &self,
        category: Option<&str>,
        tag: Option<&str>,
    ) -> Result<Vec<BlogPost>, ApiError> {
        let filter = published_filter(category, tag);
        let pages = self.store.query_database(&self.database_id, &filter).await?;

        let posts = pages
            .iter()
            .map(BlogPost::from_page)
            .collect::<Result<Vec<_>, _>>()?;

        info!(count = posts.len(), "ブログ記事リストを取得");
        Ok(posts)
    }

    /// ブログ記事を1件取得（Markdown本文付き）
    ///
    /// ## 処理フロー
    /// 1. idの存在を検証（空なら400）
    /// 2. ページを取得
    /// 3. 非公開（Draft）なら404（存在しないページと区別しない）
    /// 4. BlogPostに整形
    /// 5. 本文ブロックツリーを取得してMarkdownに変換
    /// 6. contentを付与して返す
    pub async fn detail(&self, id: &str) -> Result<BlogPost, ApiError> {
        if id.is_empty() {
            return Err(ApiError::Validation("Record id is required".to_string()));
        }

        let page = self.store.retrieve_page(id).await?;

        // 下書きは存在しないものとして扱う（公開境界）
        if !PublishStatus::of_page(&page)?.is_published() {
            return Err(ApiError::NotFound);
        }

        let post = BlogPost::from_page(&page)?;
        let blocks = self.store.retrieve_block_tree(id).await?;

        info!(page_id = id, "ブログ記事を取得");
        Ok(post.with_content(render_markdown(&blocks)))
    }

    /// フィルターUI向けのメタデータを取得
    ///
    /// ブログデータベースのスキーマからCategory/Tagsの選択肢リストを抽出する。
    pub async fn metadata(&self) -> Result<DatabaseOptions, ApiError> {
        let database = self.store.retrieve_database(&self.database_id).await?;
        Ok(DatabaseOptions::from_database(&database)?)
    }
}
