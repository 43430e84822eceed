pub mod auth;
pub mod password;
pub mod policy;
pub mod users;
