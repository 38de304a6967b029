// ドメイン層モジュール
pub mod blog_post;
pub mod database_options;
pub mod markdown;
pub mod query_filter;
pub mod record;
pub mod status;
pub mod work_item;

// 再エクスポート
pub use blog_post::BlogPost;
pub use database_options::DatabaseOptions;
pub use markdown::{BlockNode, render_markdown};
pub use query_filter::published_filter;
pub use record::MalformedRecordError;
pub use status::PublishStatus;
pub use work_item::WorkItem;
