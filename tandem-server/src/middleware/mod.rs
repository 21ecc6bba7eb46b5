//! Request middleware

mod auth;

pub use auth::api_auth;
