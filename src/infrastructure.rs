// インフラ層モジュール
pub mod config;
pub mod logging;
pub mod notion;

// 再エクスポート
pub use config::{NotionConfig, NotionConfigError};
pub use logging::init_logging;
pub use notion::{ContentStore, ContentStoreError, NotionApiClient};

#[cfg(test)]
pub use logging::init_test_logging;
