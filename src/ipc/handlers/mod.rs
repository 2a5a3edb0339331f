pub mod auth;
pub mod core;
pub mod session;
pub mod users;
