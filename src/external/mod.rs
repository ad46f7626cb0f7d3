pub mod chain;
pub mod price_feed;

pub use chain::*;
pub use price_feed::*;
