pub mod account;
pub mod jwt;

pub use account::{NewAccount, change_password, create_account, verify_credentials};
pub use jwt::{JwtManager, TokenClaims};
