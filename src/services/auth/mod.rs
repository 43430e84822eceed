pub mod identity;
pub mod token;

pub use identity::Identity;
pub use token::{IssuedToken, TokenError, TokenService};
