use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum ReferralClicks {
    Table,
    Id,
    ReferralCode,
    VisitorSession,
    Converted,
    ConvertedOwnerKey,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ReferralClicks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReferralClicks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ReferralClicks::ReferralCode)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReferralClicks::VisitorSession)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReferralClicks::Converted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ReferralClicks::ConvertedOwnerKey)
                            .string_len(64)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ReferralClicks::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一会话对同一推荐码只计一次点击
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_referral_clicks_code_session")
                    .table(ReferralClicks::Table)
                    .col(ReferralClicks::ReferralCode)
                    .col(ReferralClicks::VisitorSession)
                    .unique()
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
                    .table(ReferralClicks::Table)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
