pub mod auth;
pub mod cors;

pub use auth::AdminKeyMiddleware;
pub use cors::create_cors;
