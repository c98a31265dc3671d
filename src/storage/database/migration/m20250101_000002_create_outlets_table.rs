use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Outlets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Outlets::Id)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Outlets::OrganizationId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Outlets::Company).string_len(64).null())
                    .col(ColumnDef::new(Outlets::BusinessUnit).string_len(64).null())
                    .col(ColumnDef::new(Outlets::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Outlets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_outlets_organization_id")
                            .from(Outlets::Table, Outlets::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_outlets_business_unit")
                    .table(Outlets::Table)
                    .col(Outlets::BusinessUnit)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Outlets::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Outlets {
    Table,
    Id,
    OrganizationId,
    Company,
    BusinessUnit,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Organizations {
    Table,
    Id,
}
