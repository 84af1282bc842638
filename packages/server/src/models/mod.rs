pub mod auth;
pub mod post;
pub mod role;
pub mod shared;
pub mod user;
