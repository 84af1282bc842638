pub mod post;
pub mod role;
pub mod user;
