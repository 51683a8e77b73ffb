pub mod auth;
pub mod research;
