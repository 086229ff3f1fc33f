//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::OvencraftError;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字，按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 6000-6099: 统计查询错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    Unauthorized = 1001,
    InternalServerError = 1005,
    InvalidDateFormat = 1012,
    ServiceUnavailable = 1030,

    // Analytics 错误 6000-6099
    AnalyticsQueryFailed = 6000,
    AnalyticsInvalidDateRange = 6002,
}

impl From<&OvencraftError> for ErrorCode {
    fn from(err: &OvencraftError) -> Self {
        match err {
            OvencraftError::Validation(_) => ErrorCode::BadRequest,
            OvencraftError::DateParse(_) => ErrorCode::InvalidDateFormat,
            OvencraftError::DatabaseConnection(_) => ErrorCode::ServiceUnavailable,
            OvencraftError::AnalyticsQueryFailed(_) => ErrorCode::AnalyticsQueryFailed,
            OvencraftError::AnalyticsInvalidDateRange(_) => ErrorCode::AnalyticsInvalidDateRange,
            _ => ErrorCode::InternalServerError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_number() {
        assert_eq!(
            serde_json::to_string(&ErrorCode::AnalyticsQueryFailed).unwrap(),
            "6000"
        );
        assert_eq!(serde_json::to_string(&ErrorCode::Success).unwrap(), "0");
    }

    #[test]
    fn test_from_error() {
        let err = OvencraftError::analytics_invalid_date_range("start > end");
        assert_eq!(ErrorCode::from(&err), ErrorCode::AnalyticsInvalidDateRange);
        let err: OvencraftError = chrono::NaiveDate::parse_from_str("yesterday", "%Y-%m-%d")
            .expect_err("not a date")
            .into();
        assert_eq!(ErrorCode::from(&err), ErrorCode::InvalidDateFormat);
        let err = OvencraftError::database_operation("boom");
        assert_eq!(ErrorCode::from(&err), ErrorCode::InternalServerError);
    }
}
