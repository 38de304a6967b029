// HTTPディスパッチャー
//
// API Gatewayからのリクエストを5つのルートに振り分ける。
// パスのマッチングはステージプレフィックスを許容するため、
// 先頭の"portfolio"セグメント以降で判定する。

use std::sync::Arc;

use lambda_http::http::Method;
use lambda_http::{Body, Request, RequestExt, Response};
use serde_json::json;
use tracing::{error, info, warn};

use crate::application::blog_handler::BlogHandler;
use crate::application::response::json_response;
use crate::application::work_handler::WorkHandler;
use crate::infrastructure::{ContentStore, NotionConfig};

/// ディスパッチ先ルート
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// GET /portfolio/blog
    BlogList,
    /// GET /portfolio/blog/metadata
    BlogMetadata,
    /// GET /portfolio/blog/:id
    BlogDetail { id: String },
    /// GET /portfolio/work
    WorkList,
    /// GET /portfolio/work/:id
    WorkDetail { id: String },
}

/// リクエストパスをルートに解決
///
/// 静的セグメント（metadata）はパラメータ（:id）より先にマッチさせる。
/// "metadata"という文字列がidと誤解釈されないためのマッチング順序。
///
/// # 戻り値
/// * `Some(Route)` - 対応するルート
/// * `None` - 未定義のパス
pub fn parse_path(path: &str) -> Option<Route> {
    // 末尾スラッシュは空のidセグメントとして残す（"/work/"はid欠落の400になる）
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    // ステージ名等のプレフィックスを許容する
    let start = segments.iter().position(|s| *s == "portfolio")?;

    match &segments[start + 1..] {
        ["blog"] => Some(Route::BlogList),
        // 静的セグメントをパラメータより先に判定
        ["blog", "metadata"] => Some(Route::BlogMetadata),
        ["blog", id] => Some(Route::BlogDetail {
            id: (*id).to_string(),
        }),
        ["work"] => Some(Route::WorkList),
        ["work", id] => Some(Route::WorkDetail {
            id: (*id).to_string(),
        }),
        _ => None,
    }
}

/// APIルーター
///
/// 各エンドポイントハンドラーを保持し、リクエストをディスパッチする。
pub struct Router<C: ContentStore> {
    blog: BlogHandler<C>,
    work: WorkHandler<C>,
}

impl<C: ContentStore> Router<C> {
    /// 新しいルーターを作成
    ///
    /// # Arguments
    /// * `store` - コンテンツストア実装
    /// * `config` - データベースIDを含むNotion設定
    pub fn new(store: Arc<C>, config: &NotionConfig) -> Self {
        Self {
            blog: BlogHandler::new(Arc::clone(&store), config.blog_database_id().to_string()),
            work: WorkHandler::new(store, config.work_database_id().to_string()),
        }
    }

    /// リクエストを処理してレスポンスを返す
    ///
    /// ## 処理フロー
    /// 1. GET以外のメソッドは405
    /// 2. パスをルートに解決（未定義は404）
    /// 3. 対応するハンドラーを呼び出し
    /// 4. エラーはログに記録してJSONエラーレスポンスに変換
    ///
    /// エラーはこの層で必ずレスポンスに変換する。呼び出し元（Lambdaランタイム）に
    /// 伝播させず、1リクエストの失敗をプロセス全体から隔離する。
    pub async fn handle(&self, request: Request) -> Response<Body> {
        let path = request.uri().path().to_string();

        if request.method() != Method::GET {
            warn!(method = %request.method(), path = %path, "サポートしないメソッド");
            return json_response(405, &json!({ "error": "Method not allowed" }));
        }

        let Some(route) = parse_path(&path) else {
            info!(path = %path, "未定義のパス");
            return json_response(404, &json!({ "error": "Not found" }));
        };

        let params = request.query_string_parameters();

        let result = match &route {
            Route::BlogList => self
                .blog
                .list(params.first("category"), params.first("tag"))
                .await
                .map(|posts| json_response(200, &posts)),
            Route::BlogMetadata => self
                .blog
                .metadata()
                .await
                .map(|options| json_response(200, &options)),
            Route::BlogDetail { id } => self
                .blog
                .detail(id)
                .await
                .map(|post| json_response(200, &post)),
            Route::WorkList => self
                .work
                .list(params.first("category"))
                .await
                .map(|items| json_response(200, &items)),
            Route::WorkDetail { id } => self
                .work
                .detail(id)
                .await
                .map(|item| json_response(200, &item)),
        };

        match result {
            Ok(response) => response,
            Err(err) => {
                error!(error = %err, path = %path, "リクエスト処理に失敗");
                err.into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::blog_handler::tests::{MockStore, blog_page, not_found_error};
    use crate::application::response::tests::body_json;
    use crate::infrastructure::ContentStoreError;
    use lambda_http::http::Request as HttpRequest;
    use std::collections::HashMap;

    // ===========================================
    // パス解決のテスト
    // ===========================================

    #[test]
    fn test_parse_path_blog_routes() {
        assert_eq!(parse_path("/portfolio/blog"), Some(Route::BlogList));
        assert_eq!(
            parse_path("/portfolio/blog/metadata"),
            Some(Route::BlogMetadata)
        );
        assert_eq!(
            parse_path("/portfolio/blog/abc-123"),
            Some(Route::BlogDetail {
                id: "abc-123".to_string()
            })
        );
    }

    #[test]
    fn test_parse_path_work_routes() {
        assert_eq!(parse_path("/portfolio/work"), Some(Route::WorkList));
        assert_eq!(
            parse_path("/portfolio/work/xyz-789"),
            Some(Route::WorkDetail {
                id: "xyz-789".to_string()
            })
        );
    }

    /// "metadata"は:idより先にマッチする
    #[test]
    fn test_parse_path_metadata_takes_precedence_over_id() {
        let route = parse_path("/portfolio/blog/metadata").unwrap();
        assert_eq!(route, Route::BlogMetadata);
        assert!(!matches!(route, Route::BlogDetail { .. }));
    }

    /// API Gatewayのステージプレフィックスを許容する
    #[test]
    fn test_parse_path_tolerates_stage_prefix() {
        assert_eq!(parse_path("/prod/portfolio/blog"), Some(Route::BlogList));
        assert_eq!(
            parse_path("/v1/portfolio/work"),
            Some(Route::WorkList)
        );
    }

    /// 末尾スラッシュは空のidとして解決される（ハンドラー側で400になる）
    #[test]
    fn test_parse_path_trailing_slash_is_empty_id() {
        assert_eq!(
            parse_path("/portfolio/work/"),
            Some(Route::WorkDetail { id: String::new() })
        );
        assert_eq!(
            parse_path("/portfolio/blog/"),
            Some(Route::BlogDetail { id: String::new() })
        );
    }

    #[test]
    fn test_parse_path_unknown_paths() {
        assert_eq!(parse_path("/"), None);
        assert_eq!(parse_path("/portfolio"), None);
        assert_eq!(parse_path("/portfolio/unknown"), None);
        assert_eq!(parse_path("/portfolio/blog/id/extra"), None);
        assert_eq!(parse_path("/other/blog"), None);
    }

    // ===========================================
    // ディスパッチのテスト
    // ===========================================

    fn get_request(path: &str) -> Request {
        HttpRequest::builder()
            .method("GET")
            .uri(path)
            .body(Body::Empty)
            .unwrap()
    }

    fn router(store: MockStore) -> Router<MockStore> {
        let config = NotionConfig::new(
            "secret_key".to_string(),
            "blog-db".to_string(),
            "work-db".to_string(),
        );
        Router::new(Arc::new(store), &config)
    }

    /// リスト取得が200とレコード配列を返す
    #[tokio::test]
    async fn test_handle_blog_list_returns_records() {
        let store = MockStore::default();
        *store.query_result.lock().unwrap() = Some(Ok(vec![blog_page("Published")]));

        let response = router(store).handle(get_request("/portfolio/blog")).await;

        assert_eq!(response.status(), 200);
        let body = body_json(&response);
        let records = body.as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["title"], "テスト記事");
        // リストのレコードにcontentフィールドは現れない
        assert!(records[0].get("content").is_none());
    }

    /// クエリパラメータがフィルターに渡る
    #[tokio::test]
    async fn test_handle_blog_list_passes_query_parameters() {
        let store = MockStore::default();
        *store.query_result.lock().unwrap() = Some(Ok(vec![]));
        let store = Arc::new(store);
        let config = NotionConfig::new(
            "secret_key".to_string(),
            "blog-db".to_string(),
            "work-db".to_string(),
        );
        let router = Router::new(Arc::clone(&store), &config);

        let query: HashMap<String, Vec<String>> = HashMap::from([
            ("category".to_string(), vec!["Engineering".to_string()]),
            ("tag".to_string(), vec!["rust".to_string()]),
        ]);
        let request = get_request("/portfolio/blog").with_query_string_parameters(query);

        let response = router.handle(request).await;

        assert_eq!(response.status(), 200);
        let filter = store.captured_filter.lock().unwrap().clone().unwrap();
        assert_eq!(filter["and"].as_array().unwrap().len(), 3);
    }

    /// metadataルートがスキーマの選択肢を返す
    #[tokio::test]
    async fn test_handle_blog_metadata() {
        let store = MockStore::default();
        *store.database_result.lock().unwrap() = Some(Ok(
            crate::domain::database_options::tests::database_with_properties(
                crate::domain::database_options::tests::blog_schema(),
            ),
        ));

        let response = router(store)
            .handle(get_request("/portfolio/blog/metadata"))
            .await;

        assert_eq!(response.status(), 200);
        let body = body_json(&response);
        assert!(body["categories"].is_array());
        assert!(body["tags"].is_array());
    }

    /// 下書き記事の詳細は404
    #[tokio::test]
    async fn test_handle_draft_detail_returns_404() {
        let store = MockStore::default();
        *store.page_result.lock().unwrap() = Some(Ok(blog_page("Draft")));

        let response = router(store)
            .handle(get_request("/portfolio/blog/some-id"))
            .await;

        assert_eq!(response.status(), 404);
        assert_eq!(body_json(&response)["error"], "Record not found");
    }

    /// 存在しないページの詳細も404（下書きと区別できない）
    #[tokio::test]
    async fn test_handle_missing_page_returns_404() {
        let store = MockStore::default();
        *store.page_result.lock().unwrap() = Some(Err(not_found_error()));

        let response = router(store)
            .handle(get_request("/portfolio/blog/missing-id"))
            .await;

        assert_eq!(response.status(), 404);
    }

    /// 上流エラーは500で詳細を漏らさない
    #[tokio::test]
    async fn test_handle_upstream_error_returns_500() {
        let store = MockStore::default();
        *store.query_result.lock().unwrap() = Some(Err(ContentStoreError::Api {
            status: 401,
            code: "unauthorized".to_string(),
            message: "API token is invalid: secret".to_string(),
        }));

        let response = router(store).handle(get_request("/portfolio/work")).await;

        assert_eq!(response.status(), 500);
        assert_eq!(body_json(&response)["error"], "Internal server error");
    }

    /// idが空の詳細リクエストは400
    #[tokio::test]
    async fn test_handle_empty_id_returns_400() {
        let store = MockStore::default();

        let response = router(store)
            .handle(get_request("/portfolio/work/"))
            .await;

        assert_eq!(response.status(), 400);
        assert_eq!(body_json(&response)["error"], "Record id is required");
    }

    /// 未定義パスは404
    #[tokio::test]
    async fn test_handle_unknown_path_returns_404() {
        let store = MockStore::default();

        let response = router(store)
            .handle(get_request("/portfolio/unknown"))
            .await;

        assert_eq!(response.status(), 404);
    }

    /// GET以外のメソッドは405
    #[tokio::test]
    async fn test_handle_non_get_method_returns_405() {
        let store = MockStore::default();
        let request = HttpRequest::builder()
            .method("POST")
            .uri("/portfolio/blog")
            .body(Body::Empty)
            .unwrap();

        let response = router(store).handle(request).await;

        assert_eq!(response.status(), 405);
    }

    /// レスポンスにCORSヘッダーが付く
    #[tokio::test]
    async fn test_handle_sets_cors_headers() {
        let store = MockStore::default();
        *store.query_result.lock().unwrap() = Some(Ok(vec![]));

        let response = router(store).handle(get_request("/portfolio/blog")).await;

        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );
    }
}
