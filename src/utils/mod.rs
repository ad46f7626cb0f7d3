pub mod referral_code;
pub mod validation;

pub use referral_code::{generate_unique_referral_code, random_referral_code};
pub use validation::{validate_owner_key, validate_payment_proof};
