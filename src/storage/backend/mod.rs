//! SeaORM 存储后端
//!
//! 支持 SQLite、MySQL/MariaDB 与 PostgreSQL。

mod analytics;
mod connection;
mod converters;
mod visit_sink;

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tracing::info;

use crate::analytics::VisitSink;
use crate::config::DatabaseConfig;
use crate::errors::{OvencraftError, Result};

pub use analytics::{CountRow, GroupColumn, GroupRow, VisitQuery};
pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use converters::model_to_visit_record;

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(OvencraftError::database_config(format!(
            "无法从 URL 推断数据库类型: {}. 支持的 URL 格式: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// SeaORM 存储
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
}

impl SeaOrmStorage {
    /// 按配置连接数据库并执行迁移
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let database_url = config.database_url.trim();
        if database_url.is_empty() {
            return Err(OvencraftError::database_config("database_url 未设置"));
        }

        let backend_name = infer_backend_from_url(database_url)?;

        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url, config).await?
        } else {
            // mariadb:// 交给 MySQL 驱动
            let url = match database_url.strip_prefix("mariadb://") {
                Some(rest) => format!("mysql://{}", rest),
                None => database_url.to_string(),
            };
            connect_generic(&url, &backend_name, config).await?
        };

        run_migrations(&db).await?;

        info!("{} storage initialized", backend_name.to_uppercase());
        Ok(Self { db, backend_name })
    }

    /// 使用已有连接（连接方负责迁移）
    pub fn from_connection(db: DatabaseConnection, backend_name: impl Into<String>) -> Self {
        Self {
            db,
            backend_name: backend_name.into(),
        }
    }

    pub fn as_visit_sink(&self) -> Arc<dyn VisitSink> {
        Arc::new(self.clone())
    }

    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn get_backend_name(&self) -> &str {
        &self.backend_name
    }
}
