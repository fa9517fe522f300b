use sea_orm_migration::prelude::*;

mod m2025_11_02_000001_create_users;
mod m2025_11_02_000002_create_products;
mod m2025_11_02_000003_create_courses;
mod m2025_11_02_000004_create_community;
mod m2025_11_02_000005_create_progress;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            // users first: every other table carries a users FK
            Box::new(m2025_11_02_000001_create_users::Migration),
            Box::new(m2025_11_02_000002_create_products::Migration),
            Box::new(m2025_11_02_000003_create_courses::Migration),
            Box::new(m2025_11_02_000004_create_community::Migration),
            Box::new(m2025_11_02_000005_create_progress::Migration),
        ]
    }
}
