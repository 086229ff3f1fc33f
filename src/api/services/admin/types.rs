//! Admin API 类型定义

use serde::{Deserialize, Serialize};

/// 统一响应包装 `{ code, message, data }`
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// `GET /trend` 查询参数
#[derive(Deserialize, Clone, Debug, Default)]
pub struct TrendQuery {
    pub days: Option<u32>,
}

/// `GET /visits` 查询参数
#[derive(Deserialize, Clone, Debug, Default)]
pub struct VisitsQuery {
    pub device: Option<String>,
    pub browser: Option<String>,
    pub search: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

/// 存储后端信息
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthStorageBackend {
    pub storage_type: String,
}

/// 存储健康检查状态
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthStorageCheck {
    pub status: String,
    pub visits_count: Option<u64>,
    pub backend: HealthStorageBackend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthChecks {
    pub storage: HealthStorageCheck,
}

/// 健康检查响应
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub uptime: u64,
    pub checks: HealthChecks,
    pub response_time_ms: u32,
}
