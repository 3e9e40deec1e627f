use sea_orm_migration::prelude::*;

mod m20250905_create_articles;
mod m20250912_add_admin_auth;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250905_create_articles::Migration),
            Box::new(m20250912_add_admin_auth::Migration),
        ]
    }
}
