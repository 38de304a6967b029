/// ポートフォリオAPI HTTP Lambdaエントリポイント
///
/// API Gateway経由のHTTPリクエストを処理し、
/// Notionをバックエンドとするブログ記事・制作実績のJSONを返却する。
use lambda_http::{Body, Error, Request, Response, run, service_fn};
use portfolio_api::application::Router;
use portfolio_api::infrastructure::{NotionApiClient, NotionConfig, init_logging};
use std::sync::Arc;
use tracing::info;

/// 設定とクライアントからルーターを構築
///
/// 環境変数の欠落は起動時エラーとして扱う（リクエスト毎の失敗にしない）。
fn build_router() -> Result<Router<NotionApiClient>, Error> {
    let config = NotionConfig::from_env()?;
    let client = NotionApiClient::new(&config)?;
    Ok(Router::new(Arc::new(client), &config))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    // ルーターはプロセスで一度だけ構築し、warm start間で
    // HTTPコネクションプールを再利用する
    let router = Arc::new(build_router()?);

    info!("ポートフォリオAPI Lambda関数を初期化");

    // Lambda関数を実行
    run(service_fn(move |request: Request| {
        let router = Arc::clone(&router);
        async move { Ok::<Response<Body>, Error>(router.handle(request).await) }
    }))
    .await
}
