//! Authentication and authorization module

pub mod bearer;
pub mod jwt;
pub mod password;
pub mod policy;

pub use bearer::{ensure_owner, extract_token, BearerToken};
pub use jwt::{Claims, TokenCodec, TokenStatus};
pub use password::PasswordHasher;
pub use policy::PasswordPolicy;
