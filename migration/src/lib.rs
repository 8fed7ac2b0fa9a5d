pub use sea_orm_migration::prelude::*;

mod m20220101_000001_create_table;
mod m20260201_000002_create_blog_tables;
mod m20260201_000003_create_post_relations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20220101_000001_create_table::Migration),
            Box::new(m20260201_000002_create_blog_tables::Migration),
            Box::new(m20260201_000003_create_post_relations::Migration),
        ]
    }
}
