pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20261019_000001_visitor_tracking;
mod m20261019_000002_visit_fingerprint;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261019_000001_visitor_tracking::Migration),
            Box::new(m20261019_000002_visit_fingerprint::Migration),
        ]
    }
}
