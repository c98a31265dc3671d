use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SettingsDocuments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SettingsDocuments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SettingsDocuments::Level)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SettingsDocuments::OwnerId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(SettingsDocuments::Document).json().not_null())
                    .col(
                        ColumnDef::new(SettingsDocuments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_settings_documents_level_owner")
                    .table(SettingsDocuments::Table)
                    .col(SettingsDocuments::Level)
                    .col(SettingsDocuments::OwnerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SettingsDocuments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SettingsDocuments {
    Table,
    Id,
    Level,
    OwnerId,
    Document,
    UpdatedAt,
}
