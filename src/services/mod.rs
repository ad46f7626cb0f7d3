pub mod owner_service;
pub mod points_service;
pub mod referral_service;
pub mod subscription_service;
pub mod telegram_link_service;

pub use owner_service::*;
pub use points_service::*;
pub use referral_service::*;
pub use subscription_service::*;
pub use telegram_link_service::*;
