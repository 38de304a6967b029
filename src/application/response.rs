// APIレスポンス構築
//
// アプリケーション層のエラー分類と、CORSヘッダー付きJSONレスポンスの
// 構築ヘルパー。ハンドラーはドメイン/インフラのエラーをApiErrorに
// 変換し、ルーターがHTTPレスポンスへ落とす。

use lambda_http::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE, HeaderMap, HeaderValue,
};
use lambda_http::{Body, Response};
use serde::Serialize;
use thiserror::Error;

use crate::domain::MalformedRecordError;
use crate::infrastructure::ContentStoreError;

/// APIエラー
///
/// HTTPステータスコードへの対応付けを持つアプリケーション層のエラー分類。
#[derive(Debug, Error)]
pub enum ApiError {
    /// リクエストの形式不正（400）
    #[error("{0}")]
    Validation(String),

    /// レコードが存在しないか非公開（404）
    #[error("Record not found")]
    NotFound,

    /// Notion API呼び出しまたはレコード整形の失敗（500）
    #[error("{0}")]
    Upstream(String),
}

impl ApiError {
    /// 対応するHTTPステータスコード
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Validation(_) => 400,
            ApiError::NotFound => 404,
            ApiError::Upstream(_) => 500,
        }
    }

    /// エラーをJSONレスポンスに変換
    ///
    /// ボディは`{"error": "<メッセージ>"}`形式。上流の詳細（APIキー等を
    /// 含みうるメッセージ）はログにのみ出力し、クライアントには返さない。
    pub fn into_response(self) -> Response<Body> {
        let message = match &self {
            ApiError::Validation(message) => message.clone(),
            ApiError::NotFound => "Record not found".to_string(),
            ApiError::Upstream(_) => "Internal server error".to_string(),
        };
        json_response(self.status(), &ErrorBody { error: message })
    }
}

impl From<ContentStoreError> for ApiError {
    fn from(err: ContentStoreError) -> Self {
        if err.is_not_found() {
            ApiError::NotFound
        } else {
            ApiError::Upstream(err.to_string())
        }
    }
}

impl From<MalformedRecordError> for ApiError {
    fn from(err: MalformedRecordError) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

/// エラーレスポンスボディ
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// シリアライズ可能な値をJSONレスポンスに変換
///
/// # Arguments
/// * `status` - HTTPステータスコード
/// * `body` - レスポンスボディとしてシリアライズする値
///
/// # Returns
/// CORSヘッダー付きのHTTPレスポンス
pub fn json_response<T: Serialize>(status: u16, body: &T) -> Response<Body> {
    let json = serde_json::to_string(body).expect("レスポンスボディのシリアライズに失敗");

    let mut response = Response::builder()
        .status(status)
        .body(Body::Text(json))
        .expect("レスポンスの構築に失敗");

    *response.headers_mut() = build_cors_headers();

    response
}

/// CORSヘッダーを生成
///
/// 全レスポンスに共通のヘッダー:
/// - Content-Type: application/json
/// - Access-Control-Allow-Origin: *
/// - Access-Control-Allow-Headers: Accept
/// - Access-Control-Allow-Methods: GET, OPTIONS
pub fn build_cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();

    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Accept"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, OPTIONS"),
    );

    headers
}
