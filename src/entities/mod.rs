pub mod owners;
pub mod points_ledger;
pub mod referral_clicks;
pub mod subscriptions;

pub use owners as owner_entity;
pub use points_ledger as points_ledger_entity;
pub use referral_clicks as referral_click_entity;
pub use subscriptions as subscription_entity;

pub use owners::OwnerGateStatus;
pub use points_ledger::PointsEntryType;
pub use subscriptions::{SubscriptionClass, SubscriptionStatus};
