pub use sea_orm_migration::prelude::*;

mod m20261001_000001_create_school_schema;
mod m20261001_000002_create_identity_triggers;
mod m20261001_000003_enable_row_level_security;
mod m20261001_000004_seed_reference_data;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_school_schema::Migration),
            Box::new(m20261001_000002_create_identity_triggers::Migration),
            Box::new(m20261001_000003_enable_row_level_security::Migration),
            Box::new(m20261001_000004_seed_reference_data::Migration),
        ]
    }
}
