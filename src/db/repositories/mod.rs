pub mod article;
pub mod session;
pub mod user;
