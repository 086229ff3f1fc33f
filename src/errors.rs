use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum OvencraftError {
    ConfigLoad(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Validation(String),
    Serialization(String),
    DateParse(String),
    AnalyticsQueryFailed(String),
    AnalyticsInvalidDateRange(String),
}

impl OvencraftError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            OvencraftError::ConfigLoad(_) => "E001",
            OvencraftError::DatabaseConfig(_) => "E002",
            OvencraftError::DatabaseConnection(_) => "E003",
            OvencraftError::DatabaseOperation(_) => "E004",
            OvencraftError::FileOperation(_) => "E005",
            OvencraftError::Validation(_) => "E006",
            OvencraftError::Serialization(_) => "E007",
            OvencraftError::DateParse(_) => "E008",
            OvencraftError::AnalyticsQueryFailed(_) => "E009",
            OvencraftError::AnalyticsInvalidDateRange(_) => "E010",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            OvencraftError::ConfigLoad(_) => "Configuration Load Error",
            OvencraftError::DatabaseConfig(_) => "Database Configuration Error",
            OvencraftError::DatabaseConnection(_) => "Database Connection Error",
            OvencraftError::DatabaseOperation(_) => "Database Operation Error",
            OvencraftError::FileOperation(_) => "File Operation Error",
            OvencraftError::Validation(_) => "Validation Error",
            OvencraftError::Serialization(_) => "Serialization Error",
            OvencraftError::DateParse(_) => "Date Parse Error",
            OvencraftError::AnalyticsQueryFailed(_) => "Analytics Query Failed",
            OvencraftError::AnalyticsInvalidDateRange(_) => "Invalid Date Range",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            OvencraftError::ConfigLoad(msg)
            | OvencraftError::DatabaseConfig(msg)
            | OvencraftError::DatabaseConnection(msg)
            | OvencraftError::DatabaseOperation(msg)
            | OvencraftError::FileOperation(msg)
            | OvencraftError::Validation(msg)
            | OvencraftError::Serialization(msg)
            | OvencraftError::DateParse(msg)
            | OvencraftError::AnalyticsQueryFailed(msg)
            | OvencraftError::AnalyticsInvalidDateRange(msg) => msg,
        }
    }

    /// 映射到 HTTP 状态码（Admin API 使用）
    pub fn http_status(&self) -> StatusCode {
        match self {
            OvencraftError::Validation(_)
            | OvencraftError::DateParse(_)
            | OvencraftError::AnalyticsInvalidDateRange(_) => StatusCode::BAD_REQUEST,
            OvencraftError::DatabaseConnection(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for OvencraftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for OvencraftError {}

// 便捷的构造函数
impl OvencraftError {
    pub fn config_load<T: Into<String>>(msg: T) -> Self {
        OvencraftError::ConfigLoad(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        OvencraftError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        OvencraftError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        OvencraftError::DatabaseOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        OvencraftError::Validation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        OvencraftError::Serialization(msg.into())
    }

    pub fn analytics_query_failed<T: Into<String>>(msg: T) -> Self {
        OvencraftError::AnalyticsQueryFailed(msg.into())
    }

    pub fn analytics_invalid_date_range<T: Into<String>>(msg: T) -> Self {
        OvencraftError::AnalyticsInvalidDateRange(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for OvencraftError {
    fn from(err: sea_orm::DbErr) -> Self {
        OvencraftError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for OvencraftError {
    fn from(err: std::io::Error) -> Self {
        OvencraftError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for OvencraftError {
    fn from(err: serde_json::Error) -> Self {
        OvencraftError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for OvencraftError {
    fn from(err: chrono::ParseError) -> Self {
        OvencraftError::DateParse(format!(
            "{}. Supported formats: RFC3339 or YYYY-MM-DD",
            err
        ))
    }
}

pub type Result<T> = std::result::Result<T, OvencraftError>;
