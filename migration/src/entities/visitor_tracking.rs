//! Visitor tracking entity, one row per recorded page view

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "visitor_tracking")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub ip_address: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub user_agent: Option<String>,
    pub page_visited: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub referrer: Option<String>,
    pub session_key: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    /// mobile / tablet / desktop
    pub device_type: String,
    /// Chrome / Firefox / Safari / Edge / Other
    pub browser: String,
    /// xxHash64 of (ip, session, path); only set in strict dedup mode
    #[sea_orm(unique)]
    pub fingerprint: Option<String>,
    pub visited_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
