//! VisitSink implementation for SeaOrmStorage

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DbErr, EntityTrait, QueryFilter, QuerySelect, SqlErr};
use tracing::debug;

use super::SeaOrmStorage;
use super::converters::new_visit_to_active_model;
use crate::analytics::{NewVisit, VisitFingerprint, VisitSink};

use migration::entities::visitor_tracking;

#[async_trait]
impl VisitSink for SeaOrmStorage {
    async fn visit_exists(&self, fingerprint: &VisitFingerprint) -> anyhow::Result<bool> {
        let mut query = visitor_tracking::Entity::find()
            .select_only()
            .column(visitor_tracking::Column::Id)
            .filter(visitor_tracking::Column::IpAddress.eq(fingerprint.ip_address.as_str()))
            .filter(visitor_tracking::Column::PageVisited.eq(fingerprint.page_visited.as_str()));

        query = match fingerprint.session_key.as_deref() {
            Some(session) => query.filter(visitor_tracking::Column::SessionKey.eq(session)),
            None => query.filter(visitor_tracking::Column::SessionKey.is_null()),
        };

        let found = query
            .limit(1)
            .into_tuple::<i64>()
            .one(&self.db)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to check existing visit: {}", e))?;

        Ok(found.is_some())
    }

    async fn insert_visit(&self, visit: NewVisit) -> anyhow::Result<i64> {
        let result = visitor_tracking::Entity::insert(new_visit_to_active_model(visit))
            .exec(&self.db)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to insert visit: {}", e))?;

        debug!(
            "Visit written to {} database (id={})",
            self.backend_name.to_uppercase(),
            result.last_insert_id
        );
        Ok(result.last_insert_id)
    }

    async fn insert_visit_unique(&self, visit: NewVisit) -> anyhow::Result<Option<i64>> {
        if visit.fingerprint.is_none() {
            return Err(anyhow::anyhow!("Unique insert requires a fingerprint"));
        }

        let result = visitor_tracking::Entity::insert(new_visit_to_active_model(visit))
            .on_conflict(
                OnConflict::column(visitor_tracking::Column::Fingerprint)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(&self.db)
            .await;

        match result {
            Ok(res) => Ok(Some(res.last_insert_id)),
            // do_nothing 命中冲突时没有插入任何行
            Err(DbErr::RecordNotInserted) => Ok(None),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(None)
            }
            Err(e) => Err(anyhow::anyhow!("Failed to insert visit: {}", e)),
        }
    }
}
