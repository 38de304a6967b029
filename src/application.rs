// アプリケーション層モジュール
pub mod blog_handler;
pub mod response;
pub mod router;
pub mod work_handler;

// 再エクスポート
pub use blog_handler::BlogHandler;
pub use response::ApiError;
pub use router::{Route, Router, parse_path};
pub use work_handler::WorkHandler;
