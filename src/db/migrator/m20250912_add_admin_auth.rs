use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(AdminUsers)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(AdminSessions)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Cleanup deletes by expiry; revocation deletes by user.
        manager
            .create_index(
                Index::create()
                    .name("idx_admin_sessions_expires_at")
                    .table(AdminSessionsIden::Table)
                    .col(AdminSessionsIden::ExpiresAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_admin_sessions_user_id")
                    .table(AdminSessionsIden::Table)
                    .col(AdminSessionsIden::UserId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AdminSessionsIden::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(AdminUsersIden::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AdminSessionsIden {
    #[iden = "admin_sessions"]
    Table,
    UserId,
    ExpiresAt,
}

#[derive(Iden)]
enum AdminUsersIden {
    #[iden = "admin_users"]
    Table,
}
