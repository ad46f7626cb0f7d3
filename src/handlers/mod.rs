pub mod admin;
pub mod owner;
pub mod points;
pub mod referral;
pub mod subscription;

pub use admin::admin_config;
pub use owner::owner_config;
pub use points::points_config;
pub use referral::referral_config;
pub use subscription::subscription_config;
