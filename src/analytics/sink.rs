use super::{NewVisit, VisitFingerprint};

/// 访问记录写入端
///
/// 只提供存在性检查与插入，记录写入后不可修改。
#[async_trait::async_trait]
pub trait VisitSink: Send + Sync {
    /// 是否已存在相同 (ip, session, page) 的记录，session 为空时只匹配空 session
    async fn visit_exists(&self, fingerprint: &VisitFingerprint) -> anyhow::Result<bool>;

    /// 直接插入，返回新记录 id
    async fn insert_visit(&self, visit: NewVisit) -> anyhow::Result<i64>;

    /// 依赖 fingerprint 唯一索引插入，冲突时返回 `None`
    async fn insert_visit_unique(&self, visit: NewVisit) -> anyhow::Result<Option<i64>>;
}
