use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Owners {
    Table,
    TelegramUserId,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Owners::Table)
                    .add_column_if_not_exists(
                        ColumnDef::new(Owners::TelegramUserId).big_integer().null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 一个 Telegram 账号只能绑一个钱包
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_owners_telegram_user_id")
                    .table(Owners::Table)
                    .col(Owners::TelegramUserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("uq_owners_telegram_user_id")
                    .table(Owners::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(Owners::Table)
                    .drop_column(Owners::TelegramUserId)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
