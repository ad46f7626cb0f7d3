pub mod common;
pub mod owner;
pub mod pagination;
pub mod points;
pub mod referral;
pub mod subscription;
pub mod telegram;

pub use common::*;
pub use owner::*;
pub use pagination::*;
pub use points::*;
pub use referral::*;
pub use subscription::*;
pub use telegram::*;
