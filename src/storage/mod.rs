use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::errors::Result;

pub mod backend;

pub use backend::{GroupColumn, SeaOrmStorage, VisitQuery};

pub struct StorageFactory;

impl StorageFactory {
    /// 根据配置创建存储，数据库类型从 URL 推断
    pub async fn create(config: &DatabaseConfig) -> Result<Arc<SeaOrmStorage>> {
        let storage = SeaOrmStorage::connect(config).await?;
        Ok(Arc::new(storage))
    }
}
