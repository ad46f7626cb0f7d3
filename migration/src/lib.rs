pub use sea_orm_migration::prelude::*;

mod m20260801_000001_initial;
mod m20260805_000001_add_points_ledger;
mod m20260810_000001_add_referral_clicks;
mod m20260815_000001_add_telegram_binding;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260801_000001_initial::Migration),
            Box::new(m20260805_000001_add_points_ledger::Migration),
            Box::new(m20260810_000001_add_referral_clicks::Migration),
            Box::new(m20260815_000001_add_telegram_binding::Migration),
        ]
    }
}
