use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum PointsLedger {
    Table,
    Id,
    OwnerKey,
    EntryType,
    DeltaPoints,
    Reference,
    Note,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("points_entry_type"))
                    .values(vec![
                        Alias::new("referral_conversion"),
                        Alias::new("admin_adjust"),
                        Alias::new("redeem"),
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PointsLedger::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PointsLedger::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PointsLedger::OwnerKey)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PointsLedger::EntryType)
                            .custom(Alias::new("points_entry_type"))
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PointsLedger::DeltaPoints)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PointsLedger::Reference).string_len(128).null())
                    .col(ColumnDef::new(PointsLedger::Note).string_len(255).null())
                    .col(
                        ColumnDef::new(PointsLedger::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_points_ledger_owner")
                    .table(PointsLedger::Table)
                    .col(PointsLedger::OwnerKey)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(PointsLedger::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_type(Type::drop().name(Alias::new("points_entry_type")).to_owned())
            .await?;
        Ok(())
    }
}
